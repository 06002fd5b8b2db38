// ==========================================
// 服务中心库存导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 批量库存对账与导入（仓库编码映射 / 去重 / 分批写入）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ImportPhase, ResolutionStatus};

// 领域实体
pub use domain::{
    Facility, FacilityCodeSummaryEntry, ImportSummary, InventoryRow, NewFacility, RawImportRow,
};

// 导入
pub use importer::{ImportError, ImportResult, InventoryImporter, InventoryImporterImpl};

// API
pub use api::{ApiError, InventoryImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "服务中心库存导入";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
