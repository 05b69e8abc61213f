//! Integration tests for the append protocol against a JSON chain document

use hashledger::blockchain::{digest, BlockDraft};
use hashledger::persistence::{JsonFileStore, LedgerStore};
use hashledger::{LedgerError, LedgerService};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

/// Ledger over a freshly initialized document inside a temp dir.
fn fresh_ledger() -> Result<(TempDir, LedgerService), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let ledger = LedgerService::open(dir.path().join("blockchain.json"))?;
    assert!(ledger.init()?);
    Ok((dir, ledger))
}

#[test]
fn test_empty_chain_terminal_state() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, ledger) = fresh_ledger()?;

    assert!(ledger.list_all()?.is_empty());
    assert!(ledger.last_block()?.is_none());
    assert!(ledger.verify()?.is_valid());

    Ok(())
}

#[test]
fn test_missing_document_is_a_storage_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let ledger = LedgerService::open(dir.path().join("never-created.json"))?;

    assert!(matches!(ledger.list_all(), Err(LedgerError::Storage { .. })));
    assert!(matches!(ledger.last_block(), Err(LedgerError::Storage { .. })));
    assert!(matches!(
        ledger.append(BlockDraft::new("alice", 10.0)),
        Err(LedgerError::Storage { .. })
    ));

    Ok(())
}

#[test]
fn test_alice_then_bob() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, ledger) = fresh_ledger()?;

    let chain = ledger.append(BlockDraft::new("alice", 10.0))?;
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].previous_hash, "");
    assert_eq!(chain[0].name, "alice");
    assert_eq!(chain[0].amount, 10.0);
    let genesis = chain[0].clone();

    let chain = ledger.append(BlockDraft::new("bob", 5.0))?;
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0], genesis);
    assert_eq!(chain[1].previous_hash, digest(&genesis));

    let found = ledger.find_by_id(&genesis.id)?;
    assert_eq!(found, genesis);

    Ok(())
}

#[test]
fn test_unknown_id_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, ledger) = fresh_ledger()?;
    ledger.append(BlockDraft::new("alice", 10.0))?;

    match ledger.find_by_id("00000000-0000-0000-0000-000000000000") {
        Err(LedgerError::NotFound { id }) => {
            assert_eq!(id, "00000000-0000-0000-0000-000000000000")
        }
        other => panic!("expected NotFound, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_repeated_appends_keep_history_fixed() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, ledger) = fresh_ledger()?;

    let mut seen = Vec::new();
    for i in 0..12 {
        let chain = ledger.append(BlockDraft::new(format!("donor-{}", i), i as f64 * 1.5))?;
        assert_eq!(chain.len(), i + 1);
        // Every previously returned block is still there, unchanged.
        assert_eq!(&chain[..seen.len()], &seen[..]);
        seen = chain;
    }

    let reloaded = ledger.list_all()?;
    assert_eq!(reloaded, seen);

    for i in 1..reloaded.len() {
        assert_eq!(reloaded[i].previous_hash, digest(&reloaded[i - 1]));
    }

    let ids: HashSet<_> = reloaded.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids.len(), reloaded.len());

    Ok(())
}

#[test]
fn test_concurrent_appends_are_serialized() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, ledger) = fresh_ledger()?;
    const WRITERS: usize = 8;
    const PER_WRITER: usize = 5;

    thread::scope(|scope| {
        for w in 0..WRITERS {
            let ledger = ledger.clone();
            scope.spawn(move || {
                for n in 0..PER_WRITER {
                    ledger
                        .append(BlockDraft::new(format!("w{}-{}", w, n), n as f64))
                        .expect("append");
                }
            });
        }
    });

    let chain = ledger.list_all()?;
    assert_eq!(chain.len(), WRITERS * PER_WRITER);
    assert_eq!(chain[0].previous_hash, "");
    for i in 1..chain.len() {
        assert_eq!(chain[i].previous_hash, digest(&chain[i - 1]));
    }
    assert!(ledger.verify()?.is_valid());

    Ok(())
}

#[test]
fn test_separate_handles_on_one_document_share_exclusion() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("blockchain.json");
    let first = LedgerService::open(&path)?;
    first.init()?;

    thread::scope(|scope| {
        for name in ["alice", "bob"] {
            let path = path.clone();
            scope.spawn(move || {
                let ledger = LedgerService::open(&path).expect("open");
                for _ in 0..10 {
                    ledger.append(BlockDraft::new(name, 1.0)).expect("append");
                }
            });
        }
    });

    let chain = first.list_all()?;
    assert_eq!(chain.len(), 20);
    assert!(first.verify()?.is_valid());

    Ok(())
}

#[test]
fn test_hand_edited_document_fails_verification() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("blockchain.json");
    let store = Arc::new(JsonFileStore::open(&path)?);
    let ledger = LedgerService::new(store.clone());
    ledger.init()?;

    ledger.append(BlockDraft::new("alice", 10.0))?;
    ledger.append(BlockDraft::new("bob", 5.0))?;

    let mut blocks = store.load()?;
    blocks[0].amount = 10_000.0;
    store.save(&blocks)?;

    let report = ledger.verify()?;
    assert!(!report.is_valid());
    assert_eq!(report.violations.len(), 1);

    std::fs::write(&path, "[{\"id\": \"x\"}]")?;
    assert!(matches!(ledger.list_all(), Err(LedgerError::Decode { .. })));

    Ok(())
}

#[test]
fn test_amounts_reload_bit_identical() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, ledger) = fresh_ledger()?;
    let amount = 1.0715660391465826e-75_f64;

    let returned = ledger.append(BlockDraft::new("alice", amount))?;
    let chain = ledger.append(BlockDraft::new("bob", 5.0))?;

    let reloaded = ledger.list_all()?;
    assert_eq!(reloaded[0], returned[0]);
    assert_eq!(reloaded[0].amount.to_bits(), amount.to_bits());
    assert_eq!(chain[1].previous_hash, digest(&returned[0]));
    assert!(ledger.verify()?.is_valid());

    Ok(())
}

#[test]
fn test_readers_never_see_partial_documents() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, ledger) = fresh_ledger()?;
    const WRITERS: usize = 4;
    const PER_WRITER: usize = 10;
    let done = std::sync::atomic::AtomicUsize::new(0);

    thread::scope(|scope| {
        for w in 0..WRITERS {
            let ledger = ledger.clone();
            let done = &done;
            scope.spawn(move || {
                for n in 0..PER_WRITER {
                    ledger
                        .append(BlockDraft::new(format!("w{}-{}", w, n), n as f64 + 0.1))
                        .expect("append");
                }
                done.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });
        }

        for _ in 0..2 {
            let ledger = ledger.clone();
            let done = &done;
            scope.spawn(move || {
                let mut last_len = 0;
                while done.load(std::sync::atomic::Ordering::SeqCst) < WRITERS {
                    let blocks = ledger.list_all().expect("every read decodes");
                    assert!(blocks.len() >= last_len);
                    last_len = blocks.len();
                    let report = ledger.verify().expect("every read decodes");
                    assert!(report.is_valid(), "{:?}", report.violations);
                }
            });
        }
    });

    assert_eq!(ledger.list_all()?.len(), WRITERS * PER_WRITER);
    Ok(())
}
