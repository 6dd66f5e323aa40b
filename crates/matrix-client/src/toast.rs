use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient notification raised by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Sending half of the global toast layer. Cheap to clone into each screen.
#[derive(Clone)]
pub struct Toaster {
    tx: mpsc::UnboundedSender<Toast>,
}

/// Receiving half, drained by whoever draws the screen.
pub struct ToastFeed {
    rx: mpsc::UnboundedReceiver<Toast>,
}

pub fn channel() -> (Toaster, ToastFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Toaster { tx }, ToastFeed { rx })
}

impl Toaster {
    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.push(ToastLevel::Error, message);
    }

    fn push(&self, level: ToastLevel, message: String) {
        // Nobody is drawing toasts any more; dropping them is fine.
        let _ = self.tx.send(Toast { level, message });
    }
}

impl ToastFeed {
    /// Everything raised since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<Toast> {
        let mut toasts = Vec::new();
        while let Ok(toast) = self.rx.try_recv() {
            toasts.push(toast);
        }
        toasts
    }
}
