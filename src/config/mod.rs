// ==========================================
// 服务中心库存导入 - 配置层
// ==========================================
// 职责: 导入参数读取（批量大小 / 保活间隔 / 明细上限）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod import_config_trait;
pub mod import_settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use import_config_trait::ImportConfigReader;
pub use import_settings::ImportSettings;

use std::path::PathBuf;

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SERVICE_CENTER_DB_PATH（若设置）
/// - 否则: 用户数据目录/service-center-inventory/service_center.db
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var("SERVICE_CENTER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./service_center.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("service-center-inventory");
        // best-effort: 目录创建失败时回退到相对路径
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("service_center.db");
        }
    }

    path.to_string_lossy().to_string()
}
