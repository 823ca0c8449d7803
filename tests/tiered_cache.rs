//! Memory, network and disk tiers working together across "process restarts"

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use uexbot::cache::CacheManager;
use uexbot::data::{CachedList, ListSpec, Params, RowsRequest, UexError, Upstream};

/// Upstream serving a fixed commodities payload and counting calls
struct CountingUpstream {
    calls: AtomicUsize,
}

impl CountingUpstream {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for CountingUpstream {
    async fn get(&self, resource: &str, _params: &Params) -> Result<Value, UexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match resource {
            "commodities" => Ok(json!({
                "status": "ok",
                "data": [
                    {"id": 1, "name": "Gold", "code": "GOLD"},
                    {"id": 2, "name": "Laranite", "code": "LARA"}
                ]
            })),
            "commodities_prices" => Ok(json!({
                "status": "ok",
                "data": [{"id_terminal": 5, "price_sell": 31.0}]
            })),
            _ => Ok(json!({"status": "ok", "data": []})),
        }
    }
}

#[tokio::test]
async fn test_list_is_mirrored_and_reused() {
    let dir = TempDir::new().unwrap();
    let disk = CacheManager::new(dir.path().join("cache")).unwrap();
    let upstream = CountingUpstream::new();
    let list = CachedList::new(ListSpec::COMMODITIES);

    let rows = list.get(&upstream, &disk).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(upstream.calls(), 1);

    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(disk.slot_path("commodities")).unwrap())
            .unwrap();
    assert_eq!(on_disk["data"][1]["name"], "Laranite");

    let again = list.get(&upstream, &disk).await.unwrap();
    assert_eq!(again.len(), 2);
    assert_eq!(upstream.calls(), 1, "memory tier should answer the second call");
}

#[tokio::test]
async fn test_new_process_seeds_from_disk() {
    let dir = TempDir::new().unwrap();
    let disk = CacheManager::new(dir.path().join("cache")).unwrap();
    let upstream = CountingUpstream::new();

    CachedList::new(ListSpec::COMMODITIES)
        .get(&upstream, &disk)
        .await
        .unwrap();
    assert_eq!(upstream.calls(), 1);

    let restarted = CachedList::seeded(ListSpec::COMMODITIES, &disk);
    assert_eq!(restarted.snapshot().map(|rows| rows.len()), Some(2));

    let rows = restarted.get(&upstream, &disk).await.unwrap();
    assert_eq!(rows[0]["code"], "GOLD");
    assert_eq!(upstream.calls(), 1, "seeded list should not touch the network");
}

#[tokio::test]
async fn test_rows_request_survives_restart() {
    let dir = TempDir::new().unwrap();
    let upstream = CountingUpstream::new();
    let request = RowsRequest::new(
        "prices_2",
        "commodities_prices",
        std::time::Duration::from_secs(600),
    )
    .param("id_commodity", 2);

    let disk = CacheManager::new(dir.path()).unwrap();
    assert_eq!(request.load(&upstream, &disk).await.unwrap().len(), 1);

    let reopened = CacheManager::new(dir.path()).unwrap();
    let rows = request.load(&upstream, &reopened).await.unwrap();
    assert_eq!(rows[0]["id_terminal"], 5);
    assert_eq!(upstream.calls(), 1);
}
