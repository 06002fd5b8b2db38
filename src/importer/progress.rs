// ==========================================
// 服务中心库存导入 - 进度 / 剩余时间估算
// ==========================================
// 状态: 起始时刻 + 已处理 + 总数
// 估算: 已处理为 0 → 计算中；否则 剩余 = (总数 - 已处理) / 速率
//       < 60 秒按秒向上取整，否则按分钟向上取整（仅供参考）
// 广播: 每次推进后经 watch 通道发布快照
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

// ==========================================
// EtaEstimate - 剩余时间
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EtaEstimate {
    #[default]
    Calculating,
    Seconds(u64),
    Minutes(u64),
}

impl fmt::Display for EtaEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtaEstimate::Calculating => write!(f, "计算中..."),
            EtaEstimate::Seconds(s) => write!(f, "约 {} 秒", s),
            EtaEstimate::Minutes(m) => write!(f, "约 {} 分钟", m),
        }
    }
}

/// 剩余时间估算（纯函数）
pub fn estimate_remaining(processed: usize, total: usize, elapsed: Duration) -> EtaEstimate {
    if processed == 0 {
        return EtaEstimate::Calculating;
    }

    let remaining_rows = total.saturating_sub(processed) as f64;
    let secs_per_row = elapsed.as_secs_f64() / processed as f64;
    let remaining_secs = remaining_rows * secs_per_row;

    if remaining_secs < 60.0 {
        EtaEstimate::Seconds(remaining_secs.ceil() as u64)
    } else {
        EtaEstimate::Minutes((remaining_secs / 60.0).ceil() as u64)
    }
}

// ==========================================
// ProgressSnapshot - 进度快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub percent: f64,
    pub eta: EtaEstimate,
}

// ==========================================
// ProgressTracker
// ==========================================
pub struct ProgressTracker {
    started: Instant,
    processed: usize,
    total: usize,
    sender: Arc<watch::Sender<ProgressSnapshot>>,
}

impl ProgressTracker {
    /// 创建进度跟踪器（沿用控制器持有的广播通道）
    pub fn new(total: usize, sender: Arc<watch::Sender<ProgressSnapshot>>) -> Self {
        let tracker = Self {
            started: Instant::now(),
            processed: 0,
            total,
            sender,
        };
        tracker.publish();
        tracker
    }

    /// 创建独立通道的跟踪器
    pub fn standalone(total: usize) -> (Self, watch::Receiver<ProgressSnapshot>) {
        let (sender, receiver) = watch::channel(ProgressSnapshot::default());
        (Self::new(total, Arc::new(sender)), receiver)
    }

    /// 推进已处理行数
    pub fn advance(&mut self, rows: usize) {
        self.processed = (self.processed + rows).min(self.total);
        self.publish();
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn estimate_remaining(&self) -> EtaEstimate {
        estimate_remaining(self.processed, self.total, self.started.elapsed())
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let percent = if self.total == 0 {
            100.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        };
        ProgressSnapshot {
            processed: self.processed,
            total: self.total,
            percent,
            eta: self.estimate_remaining(),
        }
    }

    fn publish(&self) {
        // 无订阅者时 send_replace 仍更新值
        self.sender.send_replace(self.snapshot());
    }
}
