// ==========================================
// 服务中心库存导入 - API 层
// ==========================================
// 职责: 提供导入业务接口，供界面层调用
// ==========================================

pub mod error;
pub mod inventory_import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use inventory_import_api::{
    CreateFacilitiesResponse, ImportPreviewResponse, ImportStatusResponse, InventoryImportApi,
};
