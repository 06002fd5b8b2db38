// ==========================================
// 服务中心库存导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::import_settings::ImportSettings;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 主批次行数（默认 500）
    async fn get_batch_size(&self) -> ConfigResult<usize>;

    /// 子批次行数（默认 50）
    async fn get_sub_batch_size(&self) -> ConfigResult<usize>;

    /// 会话保活间隔秒数（默认 30）
    async fn get_keepalive_interval_secs(&self) -> ConfigResult<u64>;

    /// 重复键明细上限（默认 10）
    async fn get_duplicate_detail_limit(&self) -> ConfigResult<usize>;

    /// 写入错误明细上限（默认 20）
    async fn get_error_detail_limit(&self) -> ConfigResult<usize>;

    /// 一次读取全部导入参数
    async fn load_import_settings(&self) -> ConfigResult<ImportSettings> {
        Ok(ImportSettings {
            batch_size: self.get_batch_size().await?,
            sub_batch_size: self.get_sub_batch_size().await?,
            keepalive_interval_secs: self.get_keepalive_interval_secs().await?,
            duplicate_detail_limit: self.get_duplicate_detail_limit().await?,
            error_detail_limit: self.get_error_detail_limit().await?,
        })
    }
}
