// ==========================================
// 服务中心库存导入 - API层错误类型
// ==========================================
// 职责: 将导入层 / 仓储层 / 配置层错误转换为操作员可理解的错误消息
// ==========================================

use crate::config::ConfigError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 导入流程错误
    // ==========================================
    #[error("文件校验失败: {0}")]
    ValidationError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("仓库创建失败，可重试: {0}")]
    FacilityCreationFailed(String),

    #[error("当前阶段不允许该操作: phase={phase}, action={action}")]
    InvalidPhase { phase: String, action: String },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("检查约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件 {}", path)),
            ImportError::UnsupportedFormat(ext) => {
                ApiError::InvalidInput(format!("不支持的文件格式: {}", ext))
            }
            e @ (ImportError::EmptyFile | ImportError::MissingColumns(_)) => {
                ApiError::ValidationError(e.to_string())
            }
            e @ (ImportError::FileReadError(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_)) => ApiError::ImportError(e.to_string()),
            ImportError::FacilityCreationFailed(msg) => ApiError::FacilityCreationFailed(msg),
            ImportError::InvalidTransition { from, event } => ApiError::InvalidPhase {
                phase: from.to_string(),
                action: event,
            },
            ImportError::ConfigError(msg) => ApiError::ConfigError(msg),
            ImportError::Repository(e) => ApiError::from(e),
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(e) => ApiError::Other(e),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
