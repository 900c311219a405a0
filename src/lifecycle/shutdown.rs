//! Shutdown coordination.

use std::future::Future;

use tokio::sync::broadcast;

/// Broadcasts a single stop signal to every running server.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Future that resolves once [`trigger`](Self::trigger) is called, or
    /// when the coordinator is dropped.
    pub fn signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_resolves_every_signal() {
        let shutdown = Shutdown::new();
        let first = tokio::spawn(shutdown.signal());
        let second = tokio::spawn(shutdown.signal());

        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), async {
            first.await.unwrap();
            second.await.unwrap();
        })
        .await
        .unwrap();
    }
}
