use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::Registry;

pub struct HealthMonitor {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    /// Spawns the ticker on the current tokio runtime. The first check runs
    /// one full interval after start.
    pub fn start(registry: Registry, interval: Duration) -> Self {
        let (shutdown, mut stop_rx) = watch::channel(false);
        let period = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let checked = registry.health_check();
                        log::debug!("Health check touched {} loaded providers", checked);
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub async fn stop(self, grace: Duration) {
        let _ = self.shutdown.send(true);
        let mut handle = self.handle;

        if tokio::time::timeout(grace, &mut handle).await.is_err() {
            log::warn!("Health monitor did not stop within {:?}, aborting", grace);
            handle.abort();
        }
    }
}
