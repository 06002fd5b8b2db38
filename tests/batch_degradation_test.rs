// ==========================================
// 分批写入降级集成测试（真实 SQLite）
// ==========================================
// 测试目标: 主批次因外键失败整体回滚 → 子批次重试 → 仅坏子批次计为错误
// ==========================================


use rust_decimal::Decimal;
use service_center_inventory::config::ImportSettings;
use service_center_inventory::domain::InventoryRow;
use service_center_inventory::importer::{BatchUpserter, ProgressTracker};
use service_center_inventory::repository::{InventoryRepository, InventoryRepositoryImpl};
use std::sync::Arc;
use test_helpers::{create_test_db, insert_test_facility};

fn rows(count: usize, bad_index: Option<usize>) -> Vec<InventoryRow> {
    (0..count)
        .map(|i| InventoryRow {
            facility_id: if Some(i) == bad_index {
                "missing-facility".to_string()
            } else {
                "fac-8".to_string()
            },
            item_code: format!("SKU-{:04}", i),
            description: Some(format!("Repuesto {}", i)),
            quantity: i as i64,
            location: String::new(),
            bin_code: "B008".to_string(),
            unit_cost: Decimal::new(1050, 2),
        })
        .collect()
}

#[tokio::test]
async fn test_foreign_key_failure_degrades_to_sub_batches() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_test_facility(&db_path, "fac-8", "B008", true).unwrap();
    let repo = Arc::new(InventoryRepositoryImpl::new(&db_path).unwrap());

    let upserter = BatchUpserter::new(repo.clone(), &ImportSettings::default());
    // 第 70 行（第二个子批次）引用不存在的仓库
    let data = rows(120, Some(70));
    let (mut progress, receiver) = ProgressTracker::standalone(data.len());

    let outcome = upserter.upsert_all(&data, &mut progress).await;

    assert_eq!(outcome.retried_batches, 1);
    assert_eq!(outcome.errors, 50);
    assert_eq!(outcome.imported, 70);
    assert_eq!(outcome.error_details.len(), 1);
    assert_eq!(repo.count_inventory_rows().await.unwrap(), 70);
    assert_eq!(receiver.borrow().processed, 120);

    // 坏子批次内的正常行同样未写入
    assert!(repo
        .find_inventory_row("fac-8", "SKU-0060", "")
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .find_inventory_row("fac-8", "SKU-0100", "")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_clean_data_spans_multiple_batches() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_test_facility(&db_path, "fac-8", "B008", true).unwrap();
    let repo = Arc::new(InventoryRepositoryImpl::new(&db_path).unwrap());

    let upserter = BatchUpserter::new(repo.clone(), &ImportSettings::default());
    let data = rows(1100, None);
    let (mut progress, _rx) = ProgressTracker::standalone(data.len());

    let outcome = upserter.upsert_all(&data, &mut progress).await;

    assert_eq!(outcome.batches, 3);
    assert_eq!(outcome.retried_batches, 0);
    assert_eq!(outcome.imported, 1100);
    assert_eq!(repo.count_inventory_rows().await.unwrap(), 1100);

    let stored = repo
        .find_inventory_row("fac-8", "SKU-0007", "")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.unit_cost, Decimal::new(1050, 2));
    assert_eq!(stored.description.as_deref(), Some("Repuesto 7"));
}
