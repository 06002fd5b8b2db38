// ==========================================
// 服务中心库存导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod facility;
pub mod inventory;
pub mod types;

// 重导出核心类型
pub use facility::{Facility, NewFacility};
pub use inventory::{
    FacilityCodeSummaryEntry, ImportSummary, InventoryKey, InventoryRow, RawImportRow,
    UnresolvedFacility,
};
pub use types::{ImportPhase, ResolutionStatus};
