// ==========================================
// 服务中心库存导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽存储细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod facility_repo;
pub mod facility_repo_impl;
pub mod inventory_repo;
pub mod inventory_repo_impl;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use facility_repo::FacilityRepository;
pub use facility_repo_impl::FacilityRepositoryImpl;
pub use inventory_repo::{InventoryRepository, INVENTORY_CONFLICT_KEY};
pub use inventory_repo_impl::InventoryRepositoryImpl;
