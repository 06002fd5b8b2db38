// ==========================================
// 服务中心库存导入 - 库存 Repository Trait
// ==========================================
// 职责: 定义库存行写入/查询接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::inventory::InventoryRow;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

/// 库存行 upsert 冲突键
pub const INVENTORY_CONFLICT_KEY: &[&str] = &["facility_id", "item_code", "location"];

// ==========================================
// InventoryRepository Trait
// ==========================================
// 实现者: InventoryRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// 批量 upsert 库存行（单次调用为一个事务）
    ///
    /// # 参数
    /// - rows: 待写入行
    /// - conflict_key: 冲突键列（同键记录覆盖，新键插入）
    ///
    /// # 返回
    /// - Ok(usize): 写入行数
    /// - Err: 整批回滚
    async fn upsert_inventory_rows(
        &self,
        rows: &[InventoryRow],
        conflict_key: &[&str],
    ) -> RepositoryResult<usize>;

    /// 统计库存行数
    async fn count_inventory_rows(&self) -> RepositoryResult<usize>;

    /// 按唯一键查询库存行
    async fn find_inventory_row(
        &self,
        facility_id: &str,
        item_code: &str,
        location: &str,
    ) -> RepositoryResult<Option<InventoryRow>>;
}
