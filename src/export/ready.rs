//! Readiness gate for the export capabilities.
//!
//! Charting and document capabilities may load asynchronously. The
//! capability loader resolves the gate exactly once and consumers
//! await it once. The wait is unbounded; it only gates the manual export
//! action, so nothing else is held up.

use tokio::sync::watch;

/// One-shot readiness signal for the charting/export capabilities.
#[derive(Debug)]
pub struct ReadinessGate {
    tx: watch::Sender<bool>,
}

impl ReadinessGate {
    /// A gate that is not yet ready.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Called by the capability loader once everything is available.
    /// Subsequent calls are harmless.
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    /// Non-blocking readiness check.
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the loader has marked the gate ready.
    pub async fn ready(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            // The sender lives in `self`, so `changed` cannot fail here.
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ready_resolves_after_mark() {
        let gate = Arc::new(ReadinessGate::new());
        assert!(!gate.is_ready());

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.ready().await })
        };

        gate.mark_ready();
        waiter.await.unwrap();
        assert!(gate.is_ready());
    }

    #[tokio::test]
    async fn test_ready_is_immediate_once_marked() {
        let gate = ReadinessGate::new();
        gate.mark_ready();
        gate.mark_ready();
        gate.ready().await;
        gate.ready().await;
    }
}
