//! One-shot "message carries a visualization" notification.

/// Two-state latch: `Unnotified` -> `Notified`, with no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationLatch {
    #[default]
    Unnotified,
    Notified,
}

impl NotificationLatch {
    /// Fire `callback` the first time this is called with
    /// `has_visualization == true`; later calls are no-ops.
    ///
    /// Returns `true` when the callback fired.
    pub fn notify_once(&mut self, has_visualization: bool, callback: impl FnOnce()) -> bool {
        match self {
            Self::Unnotified if has_visualization => {
                *self = Self::Notified;
                callback();
                true
            }
            _ => false,
        }
    }

    pub fn is_notified(&self) -> bool {
        matches!(self, Self::Notified)
    }
}
