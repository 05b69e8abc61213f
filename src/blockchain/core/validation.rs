use crate::blockchain::core::chain::{digest, Block, GENESIS_PREVIOUS_HASH};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainViolation {
    /// The first block carries something other than the genesis sentinel.
    GenesisLinked { id: String, previous_hash: String },
    BrokenLink {
        position: usize,
        id: String,
        expected: String,
        found: String,
    },
    DuplicateId {
        position: usize,
        first_position: usize,
        id: String,
    },
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainViolation::GenesisLinked { id, previous_hash } => write!(
                f,
                "Genesis block {} has previous hash {:?}, expected empty",
                id, previous_hash
            ),
            ChainViolation::BrokenLink {
                position,
                id,
                expected,
                found,
            } => write!(
                f,
                "Block {} at position {} links to {}, expected {}",
                id, position, found, expected
            ),
            ChainViolation::DuplicateId {
                position,
                first_position,
                id,
            } => write!(
                f,
                "Block id {} at position {} already used at position {}",
                id, position, first_position
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub length: usize,
    pub tip_hash: Option<String>,
    pub violations: Vec<ChainViolation>,
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Walk the chain and collect every linkage and id-uniqueness violation.
pub fn verify_chain(blocks: &[Block]) -> ChainReport {
    let mut violations = Vec::new();
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();

    for (position, block) in blocks.iter().enumerate() {
        if position == 0 {
            if block.previous_hash != GENESIS_PREVIOUS_HASH {
                violations.push(ChainViolation::GenesisLinked {
                    id: block.id.clone(),
                    previous_hash: block.previous_hash.clone(),
                });
            }
        } else {
            let expected = digest(&blocks[position - 1]);
            if block.previous_hash != expected {
                violations.push(ChainViolation::BrokenLink {
                    position,
                    id: block.id.clone(),
                    expected,
                    found: block.previous_hash.clone(),
                });
            }
        }

        if let Some(first_position) = seen_ids.get(block.id.as_str()) {
            violations.push(ChainViolation::DuplicateId {
                position,
                first_position: *first_position,
                id: block.id.clone(),
            });
        } else {
            seen_ids.insert(block.id.as_str(), position);
        }
    }

    ChainReport {
        length: blocks.len(),
        tip_hash: blocks.last().map(digest),
        violations,
    }
}
