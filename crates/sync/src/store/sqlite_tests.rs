// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the SQLite and memory key-value stores.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::tempdir;

fn exercise_contract(store: &dyn KeyValueStore) {
    assert_eq!(store.get("missing").unwrap(), None);

    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

    store.set("a", "3").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));

    store.delete("a").unwrap();
    store.delete("a").unwrap();
    assert_eq!(store.get("a").unwrap(), None);

    store.clear().unwrap();
    assert_eq!(store.get("b").unwrap(), None);
}

#[test]
fn sqlite_store_honors_contract() {
    let store = SqliteStore::open_in_memory().unwrap();
    exercise_contract(&store);
}

#[test]
fn memory_store_honors_contract() {
    let store = MemoryStore::new();
    exercise_contract(&store);
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("quickaudit.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.set("@quickaudit/user", r#"{"id":"u-1"}"#).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(
        store.get("@quickaudit/user").unwrap().as_deref(),
        Some(r#"{"id":"u-1"}"#)
    );
    assert_eq!(store.keys().unwrap(), vec!["@quickaudit/user".to_string()]);
}

#[test]
fn unavailable_memory_store_fails_every_operation() {
    let store = MemoryStore::new();
    store.set("a", "1").unwrap();
    store.set_unavailable(true);

    assert!(matches!(store.get("a"), Err(StoreError::Unavailable(_))));
    assert!(matches!(store.set("a", "2"), Err(StoreError::Unavailable(_))));
    assert!(matches!(store.delete("a"), Err(StoreError::Unavailable(_))));
    assert!(matches!(store.clear(), Err(StoreError::Unavailable(_))));

    store.set_unavailable(false);
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
}
