// ==========================================
// 服务中心库存导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: 阻断错误（空文件/缺列）在此定义；逐行问题只计数，不报错
// ==========================================

use crate::domain::types::ImportPhase;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 阻断校验错误 =====
    #[error("文件为空：没有任何数据行")]
    EmptyFile,

    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    // ===== 流程错误 =====
    #[error("仓库批量创建失败: {0}")]
    FacilityCreationFailed(String),

    #[error("无效的阶段转换: from={from} event={event}")]
    InvalidTransition { from: ImportPhase, event: String },

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ===== 数据访问错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 阻断错误：导入开始前即终止，运行状态回到 Idle
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ImportError::EmptyFile
                | ImportError::MissingColumns(_)
                | ImportError::FileNotFound(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<ConfigError>
impl From<crate::config::ConfigError> for ImportError {
    fn from(err: crate::config::ConfigError) -> Self {
        ImportError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
