// ==========================================
// 服务中心库存导入 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 导入阶段 (Import Phase)
// ==========================================
// 流转: Idle → Analyzing → Preview → (CreatingFacilities → Preview)* → Importing → Done
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportPhase {
    Idle,               // 未选择文件
    Analyzing,          // 文件分析中（瞬态）
    Preview,            // 汇总预览，等待操作员决策
    CreatingFacilities, // 批量创建缺失仓库
    Importing,          // 去重 + 分批写入
    Done,               // 导入完成，汇总报告可用
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportPhase::Idle => write!(f, "IDLE"),
            ImportPhase::Analyzing => write!(f, "ANALYZING"),
            ImportPhase::Preview => write!(f, "PREVIEW"),
            ImportPhase::CreatingFacilities => write!(f, "CREATING_FACILITIES"),
            ImportPhase::Importing => write!(f, "IMPORTING"),
            ImportPhase::Done => write!(f, "DONE"),
        }
    }
}

// ==========================================
// 仓库编码解析状态 (Resolution Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    Resolved,   // 已匹配到现有仓库
    Unresolved, // 无对应仓库
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStatus::Resolved => write!(f, "RESOLVED"),
            ResolutionStatus::Unresolved => write!(f, "UNRESOLVED"),
        }
    }
}
