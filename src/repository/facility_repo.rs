// ==========================================
// 服务中心库存导入 - 仓库 Repository Trait
// ==========================================
// 职责: 定义仓库数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::facility::{Facility, NewFacility};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// FacilityRepository Trait
// ==========================================
// 实现者: FacilityRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait FacilityRepository: Send + Sync {
    /// 查询仓库列表
    ///
    /// # 参数
    /// - active_only: 仅返回启用的仓库
    async fn list_facilities(&self, active_only: bool) -> RepositoryResult<Vec<Facility>>;

    /// 批量创建仓库（整体成功或整体失败）
    ///
    /// # 返回
    /// - Ok(Vec<Facility>): 新建的仓库（含生成的 facility_id）
    /// - Err: 任一记录失败即整体回滚
    async fn create_facilities(&self, records: Vec<NewFacility>)
        -> RepositoryResult<Vec<Facility>>;
}
