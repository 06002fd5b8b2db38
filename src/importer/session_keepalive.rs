// ==========================================
// 服务中心库存导入 - 会话保活
// ==========================================
// 职责: 导入期间后台定时刷新操作员会话（默认 30 秒）
// 约束:
//   - 刷新失败只记录日志，不影响导入
//   - 进入 Importing 时启动；离开时（含错误路径）必定停止
//   - KeepaliveHandle 被 drop 时自动取消后台任务
//   - 不触碰任何导入计数
// ==========================================

use crate::importer::inventory_importer_trait::SessionRefresher;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 最小保活间隔
const MIN_INTERVAL: Duration = Duration::from_secs(1);

pub struct SessionKeepalive;

impl SessionKeepalive {
    /// 启动后台保活任务（首次刷新在一个周期之后）
    pub fn start<S>(refresher: Arc<S>, period: Duration) -> KeepaliveHandle
    where
        S: SessionRefresher + ?Sized + 'static,
    {
        let period = period.max(MIN_INTERVAL);
        let token = CancellationToken::new();
        let child = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = child.cancelled() => break,
                            result = refresher.refresh_session() => match result {
                                Ok(()) => debug!("会话保活刷新成功"),
                                Err(e) => warn!(error = %e, "会话保活刷新失败（忽略）"),
                            },
                        }
                    }
                }
            }
            debug!("会话保活任务退出");
        });

        info!(interval_secs = period.as_secs(), "会话保活已启动");
        KeepaliveHandle {
            token,
            task: Some(task),
        }
    }
}

// ==========================================
// KeepaliveHandle - 保活任务句柄（RAII）
// ==========================================
pub struct KeepaliveHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl KeepaliveHandle {
    /// 停止并等待后台任务退出
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "会话保活任务异常退出");
            }
        }
        info!("会话保活已停止");
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
            && self
                .task
                .as_ref()
                .map(|t| !t.is_finished())
                .unwrap_or(false)
    }
}

impl Drop for KeepaliveHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ==========================================
// NoopSessionRefresher - 本地部署无会话
// ==========================================
pub struct NoopSessionRefresher;

#[async_trait]
impl SessionRefresher for NoopSessionRefresher {
    async fn refresh_session(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
