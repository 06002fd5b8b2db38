// ==========================================
// 服务中心库存导入 - 导入参数
// ==========================================
// 职责: 批量大小 / 保活间隔 / 明细上限
// ==========================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_SUB_BATCH_SIZE: usize = 50;
pub const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_DUPLICATE_DETAIL_LIMIT: usize = 10;
pub const DEFAULT_ERROR_DETAIL_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub batch_size: usize,             // 主批次行数
    pub sub_batch_size: usize,         // 主批次失败后的重试子批次行数
    pub keepalive_interval_secs: u64,  // 会话保活间隔（秒）
    pub duplicate_detail_limit: usize, // 重复键明细上限
    pub error_detail_limit: usize,     // 写入错误明细上限
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            sub_batch_size: DEFAULT_SUB_BATCH_SIZE,
            keepalive_interval_secs: DEFAULT_KEEPALIVE_INTERVAL_SECS,
            duplicate_detail_limit: DEFAULT_DUPLICATE_DETAIL_LIMIT,
            error_detail_limit: DEFAULT_ERROR_DETAIL_LIMIT,
        }
    }
}

impl ImportSettings {
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }
}
