// ==========================================
// 服务中心库存导入 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置读取失败: {0}")]
    ReadError(#[from] rusqlite::Error),

    #[error("配置锁获取失败: {0}")]
    LockError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
