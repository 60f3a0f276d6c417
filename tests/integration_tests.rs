//! Integration tests for redkv
//!
//! These tests require a running Redis instance on localhost:6379 and
//! skip themselves when none is reachable.

use std::collections::HashMap;
use std::time::Duration;

use redkv::{KvError, KvStore, RedisConfig};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    score: i64,
    tags: Vec<String>,
}

async fn setup_store() -> Option<KvStore> {
    let store = KvStore::new(RedisConfig::new("127.0.0.1", 6379));
    match store.test_con().await {
        Ok(()) => Some(store),
        Err(_) => {
            eprintln!("Redis not available, skipping test");
            None
        }
    }
}

fn unique_key(label: &str) -> String {
    format!("it:{}:{}", label, Uuid::new_v4().simple())
}

#[tokio::test]
async fn pool_is_built_lazily_and_shared() {
    // Pool construction does not connect, so this runs without a server
    let store = KvStore::new(RedisConfig::new("127.0.0.1", 6379));
    let first = store.pool().await.unwrap();
    let second = store.pool().await.unwrap();
    assert_eq!(first.status().max_size, second.status().max_size);

    // Force-new always hands back a usable pool
    let forced = store.create_pool().await.unwrap();
    assert_eq!(forced.status().max_size, first.status().max_size);
}

#[tokio::test]
async fn set_get_round_trip() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("round-trip");

    let profile = Profile {
        name: "ayaka".to_string(),
        score: 9001,
        tags: vec!["admin".to_string(), "beta".to_string()],
    };
    store.set(&key, &profile).await.unwrap();

    let loaded: Option<Profile> = store.get(&key).await.unwrap();
    assert_eq!(loaded, Some(profile));

    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn get_after_delete_returns_none() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("deleted");

    store.set(&key, "ephemeral").await.unwrap();
    store.delete(&key).await.unwrap();

    let loaded: Option<String> = store.get(&key).await.unwrap();
    assert_eq!(loaded, None);

    // Deleting an absent key is not an error
    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn set_multi_then_get_multi_covers_every_key() {
    let Some(store) = setup_store().await else {
        return;
    };
    let a = unique_key("multi-a");
    let b = unique_key("multi-b");
    let missing = unique_key("multi-missing");

    store
        .set_multi(&[(a.as_str(), 1_i64), (b.as_str(), 2_i64)])
        .await
        .unwrap();

    let values: HashMap<String, Option<i64>> = store
        .get_multi(&[a.as_str(), b.as_str(), missing.as_str()])
        .await
        .unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(values[&a], Some(1));
    assert_eq!(values[&b], Some(2));
    assert_eq!(values[&missing], None);

    store.delete_multi(&[a.as_str(), b.as_str()]).await.unwrap();
}

#[tokio::test]
async fn ttl_write_expires() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("ttl");

    store
        .set_with_ttl(&key, "short-lived", Duration::from_secs(1))
        .await
        .unwrap();
    let loaded: Option<String> = store.get(&key).await.unwrap();
    assert_eq!(loaded.as_deref(), Some("short-lived"));

    tokio::time::sleep(Duration::from_secs(2)).await;
    let loaded: Option<String> = store.get(&key).await.unwrap();
    assert_eq!(loaded, None);
}

#[tokio::test]
async fn ttl_batch_writes_each_pair() {
    let Some(store) = setup_store().await else {
        return;
    };
    let a = unique_key("ttl-multi-a");
    let b = unique_key("ttl-multi-b");

    store
        .set_multi_with_ttl(
            &[(a.as_str(), "x"), (b.as_str(), "y")],
            Duration::from_secs(30),
        )
        .await
        .unwrap();

    let values: HashMap<String, Option<String>> =
        store.get_multi(&[a.as_str(), b.as_str()]).await.unwrap();
    assert_eq!(values[&a].as_deref(), Some("x"));
    assert_eq!(values[&b].as_deref(), Some("y"));

    store.delete_multi(&[a.as_str(), b.as_str()]).await.unwrap();
}

#[tokio::test]
async fn counters_adjust_atomically() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("counter");

    assert_eq!(store.increment_by(&key, 5).await.unwrap(), 5);
    assert_eq!(store.decrement_by(&key, 2).await.unwrap(), 3);
    assert_eq!(store.increment(&key).await.unwrap(), 4);
    assert_eq!(store.decrement(&key).await.unwrap(), 3);

    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn counter_on_non_integer_value_propagates_driver_error() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("counter-type");

    store.set(&key, "definitely not a number").await.unwrap();
    let result = store.increment(&key).await;
    assert!(matches!(result, Err(KvError::Backend(_))));

    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn push_pop_and_length() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("queue");

    store.rpush(&key, "job-1").await.unwrap();
    let popped: Option<String> = store.lpop(&key).await.unwrap();
    assert_eq!(popped.as_deref(), Some("job-1"));
    assert_eq!(store.llen(&key).await.unwrap(), 0);

    // Popping an empty list yields None, not an error
    let popped: Option<String> = store.rpop(&key).await.unwrap();
    assert_eq!(popped, None);
}

#[tokio::test]
async fn lrange_preserves_insertion_order() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("ordered");

    for item in ["a", "b", "c"] {
        store.rpush(&key, item).await.unwrap();
    }

    let items: Vec<String> = store.lrange(&key, 0, -1).await.unwrap();
    assert_eq!(items, vec!["a", "b", "c"]);

    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn lindex_and_ltrim() {
    let Some(store) = setup_store().await else {
        return;
    };
    let key = unique_key("trimmed");

    for item in ["a", "b", "c", "d"] {
        store.rpush(&key, item).await.unwrap();
    }

    let second: Option<String> = store.lindex(&key, 1).await.unwrap();
    assert_eq!(second.as_deref(), Some("b"));
    let out_of_range: Option<String> = store.lindex(&key, 99).await.unwrap();
    assert_eq!(out_of_range, None);

    store.ltrim(&key, 1, 2).await.unwrap();
    let items: Vec<String> = store.lrange(&key, 0, -1).await.unwrap();
    assert_eq!(items, vec!["b", "c"]);

    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn admin_commands_return_server_state() {
    let Some(store) = setup_store().await else {
        return;
    };

    let info = store.db_info().await.unwrap();
    assert!(info.contains("redis_version"));

    assert!(store.db_size().await.unwrap() >= 0);
    assert!(store.last_save_time().await.unwrap() >= 0);
}

#[tokio::test]
async fn flush_db_empties_the_database() {
    // Runs against a dedicated database index so the flush cannot touch
    // keys used by the other tests.
    let store = KvStore::new(RedisConfig::new("127.0.0.1", 6379).with_db(15));
    if store.test_con().await.is_err() {
        eprintln!("Redis not available, skipping test");
        return;
    }

    store.set("doomed", "value").await.unwrap();
    store.flush_db().await.unwrap();
    assert_eq!(store.db_size().await.unwrap(), 0);
}

#[tokio::test]
async fn connectivity_probe_succeeds_on_healthy_server() {
    let Some(store) = setup_store().await else {
        return;
    };
    store.test_con().await.unwrap();
}
