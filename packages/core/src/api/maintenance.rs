// Периодическая очистка просроченных shared secret
//
// Sweeper только вызывает `cleanup_expired_secrets`; корректность TTL от него
// не зависит, `get_or_create` сам не отдаёт просроченные записи.

use crate::api::service::E2eeService;
use crate::crypto::CryptoProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Хэндл фоновой задачи очистки
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Остановить задачу и дождаться её завершения
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Secret sweeper task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Запустить очистку кэша секретов раз в `interval`.
///
/// Должна вызываться внутри tokio runtime. Задача живёт, пока не вызван
/// [`SweeperHandle::shutdown`] или пока хэндл не уничтожен.
pub fn spawn_sweeper<P: CryptoProvider>(
    service: Arc<E2eeService<P>>,
    period: Duration,
) -> SweeperHandle {
    // tokio::time::interval паникует на нулевом периоде
    let period = period.max(Duration::from_millis(1));
    let (shutdown_tx, mut shutdown_rx) = watch::channel(());

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Первый тик срабатывает сразу
        ticker.tick().await;

        tracing::info!(period_ms = period.as_millis() as u64, "Secret sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = service.cleanup_expired_secrets();
                    if removed > 0 {
                        tracing::info!(removed, "Sweeper removed expired shared secrets");
                    }
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }

        tracing::info!("Secret sweeper stopped");
    });

    SweeperHandle { shutdown_tx, task }
}
