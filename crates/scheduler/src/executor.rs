//! Bridges scheduled jobs to the core services.

use smartmess_core::AutoLoopService;

use crate::scheduler::JobExecutor;

/// Executes scheduled jobs against the core services.
pub struct CoreExecutor {
    auto_loop: AutoLoopService,
}

impl CoreExecutor {
    /// Create a new executor.
    #[must_use]
    pub const fn new(auto_loop: AutoLoopService) -> Self {
        Self { auto_loop }
    }
}

#[async_trait::async_trait]
impl JobExecutor for CoreExecutor {
    async fn run_auto_loop(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let summary = self.auto_loop.run_nightly().await?;
        Ok(summary.staged)
    }
}
