//! Caller-driven cancellation of a checkout.

use tokio::sync::watch;

/// Handle the caller keeps to cancel an in-flight checkout.
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

impl Canceller {
    /// Signals cancellation to every [`CancelSignal`] cloned from this pair.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Cancellation signal passed into a checkout.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Creates a linked canceller and signal.
    pub fn pair() -> (Canceller, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Canceller { tx }, CancelSignal { rx })
    }

    /// Returns a signal that never fires.
    pub fn never() -> Self {
        let (_, signal) = Self::pair();
        signal
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is requested.
    ///
    /// Pends forever if the canceller is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_cancel_is_observed() {
        let (canceller, signal) = CancelSignal::pair();
        assert!(!signal.is_cancelled());

        canceller.cancel();
        assert!(signal.is_cancelled());
        signal.cancelled().await;
    }

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let (canceller, signal) = CancelSignal::pair();
        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { signal.cancelled().await }
        });

        canceller.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let signal = CancelSignal::never();
        assert!(!signal.is_cancelled());

        let result = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(result.is_err());
    }
}
