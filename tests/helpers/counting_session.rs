// ==========================================
// 计数会话刷新器（测试用）
// ==========================================

use async_trait::async_trait;
use service_center_inventory::importer::SessionRefresher;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct CountingSession {
    calls: AtomicUsize,
}

impl CountingSession {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRefresher for CountingSession {
    async fn refresh_session(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
