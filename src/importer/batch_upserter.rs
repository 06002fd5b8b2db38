// ==========================================
// 服务中心库存导入 - 分批写入（失败降级）
// ==========================================
// 流程:
//   1. 按 batch_size（默认 500）切分，单次 upsert（冲突键 仓库+物料编码+库位）
//   2. 主批次失败 → 按 sub_batch_size（默认 50）重新切分，每个子批次只尝试一次
//   3. 子批次失败 → 其行全部计为错误，保留前 error_detail_limit 条消息
// 约束: 不做逐行回退、不退避；批次严格串行；每个主批次后更新进度
// 不变量: imported + errors == 输入行数
// ==========================================

use crate::config::ImportSettings;
use crate::domain::inventory::InventoryRow;
use crate::importer::progress::ProgressTracker;
use crate::repository::inventory_repo::{InventoryRepository, INVENTORY_CONFLICT_KEY};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub imported: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
    pub batches: usize,         // 主批次数
    pub retried_batches: usize, // 降级为子批次的主批次数
}

pub struct BatchUpserter<I>
where
    I: InventoryRepository + ?Sized,
{
    inventory_repo: Arc<I>,
    batch_size: usize,
    sub_batch_size: usize,
    error_detail_limit: usize,
}

impl<I> BatchUpserter<I>
where
    I: InventoryRepository + ?Sized,
{
    pub fn new(inventory_repo: Arc<I>, settings: &ImportSettings) -> Self {
        Self {
            inventory_repo,
            batch_size: settings.batch_size.max(1),
            sub_batch_size: settings.sub_batch_size.max(1),
            error_detail_limit: settings.error_detail_limit,
        }
    }

    /// 分批写入全部行
    pub async fn upsert_all(
        &self,
        rows: &[InventoryRow],
        progress: &mut ProgressTracker,
    ) -> UpsertOutcome {
        let mut outcome = UpsertOutcome::default();

        for (batch_index, batch) in rows.chunks(self.batch_size).enumerate() {
            outcome.batches += 1;

            match self
                .inventory_repo
                .upsert_inventory_rows(batch, INVENTORY_CONFLICT_KEY)
                .await
            {
                Ok(written) => {
                    outcome.imported += batch.len();
                    debug!(batch_index, rows = batch.len(), written, "主批次写入成功");
                }
                Err(e) => {
                    outcome.retried_batches += 1;
                    warn!(
                        batch_index,
                        rows = batch.len(),
                        error = %e,
                        "主批次写入失败，降级为子批次重试"
                    );
                    self.retry_in_sub_batches(batch_index, batch, &mut outcome)
                        .await;
                }
            }

            progress.advance(batch.len());
        }

        info!(
            imported = outcome.imported,
            errors = outcome.errors,
            batches = outcome.batches,
            retried_batches = outcome.retried_batches,
            "分批写入完成"
        );
        outcome
    }

    async fn retry_in_sub_batches(
        &self,
        batch_index: usize,
        batch: &[InventoryRow],
        outcome: &mut UpsertOutcome,
    ) {
        for (sub_index, sub_batch) in batch.chunks(self.sub_batch_size).enumerate() {
            match self
                .inventory_repo
                .upsert_inventory_rows(sub_batch, INVENTORY_CONFLICT_KEY)
                .await
            {
                Ok(_) => {
                    outcome.imported += sub_batch.len();
                }
                Err(e) => {
                    outcome.errors += sub_batch.len();
                    error!(
                        batch_index,
                        sub_index,
                        rows = sub_batch.len(),
                        error = %e,
                        "子批次写入失败"
                    );
                    if outcome.error_details.len() < self.error_detail_limit {
                        outcome.error_details.push(format!(
                            "批次 {} 子批次 {}（{} 行）写入失败: {}",
                            batch_index + 1,
                            sub_index + 1,
                            sub_batch.len(),
                            e
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// 超过 max_ok_rows 的调用失败；包含 poison 物料编码的调用失败
    struct FlakyInventoryRepo {
        max_ok_rows: usize,
        poison: Option<String>,
        calls: Mutex<Vec<usize>>,
    }

    impl FlakyInventoryRepo {
        fn new(max_ok_rows: usize, poison: Option<&str>) -> Self {
            Self {
                max_ok_rows,
                poison: poison.map(|s| s.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InventoryRepository for FlakyInventoryRepo {
        async fn upsert_inventory_rows(
            &self,
            rows: &[InventoryRow],
            _conflict_key: &[&str],
        ) -> RepositoryResult<usize> {
            self.calls.lock().unwrap().push(rows.len());
            if rows.len() > self.max_ok_rows {
                return Err(RepositoryError::DatabaseQueryError("payload too large".into()));
            }
            if let Some(poison) = &self.poison {
                if rows.iter().any(|r| &r.item_code == poison) {
                    return Err(RepositoryError::CheckConstraintViolation("bad row".into()));
                }
            }
            Ok(rows.len())
        }

        async fn count_inventory_rows(&self) -> RepositoryResult<usize> {
            Ok(0)
        }

        async fn find_inventory_row(
            &self,
            _facility_id: &str,
            _item_code: &str,
            _location: &str,
        ) -> RepositoryResult<Option<InventoryRow>> {
            Ok(None)
        }
    }

    fn rows(n: usize) -> Vec<InventoryRow> {
        (0..n)
            .map(|i| InventoryRow {
                facility_id: "fac-8".to_string(),
                item_code: format!("SKU-{:05}", i),
                description: None,
                quantity: 1,
                location: String::new(),
                bin_code: "B008".to_string(),
                unit_cost: Decimal::ZERO,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_all_batches_succeed() {
        let repo = Arc::new(FlakyInventoryRepo::new(usize::MAX, None));
        let upserter = BatchUpserter::new(repo.clone(), &ImportSettings::default());
        let data = rows(1200);
        let (mut progress, receiver) = ProgressTracker::standalone(data.len());

        let outcome = upserter.upsert_all(&data, &mut progress).await;

        assert_eq!(outcome.imported, 1200);
        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.batches, 3);
        assert_eq!(*repo.calls.lock().unwrap(), vec![500, 500, 200]);
        assert_eq!(receiver.borrow().processed, 1200);
    }

    #[tokio::test]
    async fn test_failed_batch_all_sub_batches_succeed() {
        let repo = Arc::new(FlakyInventoryRepo::new(50, None));
        let upserter = BatchUpserter::new(repo.clone(), &ImportSettings::default());
        let data = rows(500);
        let (mut progress, _rx) = ProgressTracker::standalone(data.len());

        let outcome = upserter.upsert_all(&data, &mut progress).await;

        assert_eq!(outcome.imported, 500);
        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.retried_batches, 1);
        // 1 次主批次 + 10 次子批次
        assert_eq!(repo.calls.lock().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_failed_batch_one_sub_batch_fails() {
        let repo = Arc::new(FlakyInventoryRepo::new(50, Some("SKU-00123")));
        let upserter = BatchUpserter::new(repo, &ImportSettings::default());
        let data = rows(500);
        let (mut progress, _rx) = ProgressTracker::standalone(data.len());

        let outcome = upserter.upsert_all(&data, &mut progress).await;

        assert_eq!(outcome.errors, 50);
        assert_eq!(outcome.imported, 450);
        assert_eq!(outcome.error_details.len(), 1);
        assert!(outcome.error_details[0].contains("50 行"));
        assert_eq!(progress.processed(), 500);
    }

    #[tokio::test]
    async fn test_error_details_bounded() {
        // 每个子批次都失败
        let repo = Arc::new(FlakyInventoryRepo::new(0, None));
        let settings = ImportSettings {
            error_detail_limit: 3,
            ..ImportSettings::default()
        };
        let upserter = BatchUpserter::new(repo, &settings);
        let data = rows(520);
        let (mut progress, _rx) = ProgressTracker::standalone(data.len());

        let outcome = upserter.upsert_all(&data, &mut progress).await;

        assert_eq!(outcome.imported, 0);
        assert_eq!(outcome.errors, 520);
        assert_eq!(outcome.error_details.len(), 3);
        assert_eq!(outcome.imported + outcome.errors, data.len());
    }
}
