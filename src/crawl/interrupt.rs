// src/crawl/interrupt.rs
// =============================================================================
// ^C handling.
//
// The first ^C only raises a flag: the pool stops handing out new URLs and
// whatever is already running gets to finish (or hit its timeout). A second
// ^C gives up and exits right away.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Exit code used when the user insists with a second ^C.
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    triggered: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Spawns a background task that triggers this flag on ^C.
    /// Must be called from inside the tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let interrupt = self.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for ^C");
                return;
            }
            info!("interrupt received, finishing in-flight work (press ^C again to abort)");
            interrupt.trigger();

            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("second interrupt, aborting");
                std::process::exit(FORCED_EXIT_CODE);
            }
        });
    }
}
