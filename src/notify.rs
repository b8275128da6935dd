use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl std::fmt::Display for ToastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToastKind::Success => write!(f, "success"),
            ToastKind::Error => write!(f, "error"),
        }
    }
}

/// A transient on-screen message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub shown_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) < self.duration
    }
}

/// Notification queue. Nothing is displayed from here; front ends drain it.
#[derive(Debug, Clone)]
pub struct Toasts {
    duration: Duration,
    queue: Vec<Toast>,
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            queue: Vec::new(),
        }
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            ToastKind::Success => tracing::debug!(%message, "toast"),
            ToastKind::Error => tracing::debug!(%message, "error toast"),
        }
        self.queue.push(Toast {
            kind,
            message,
            shown_at: Instant::now(),
            duration: self.duration,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.queue.last()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter().filter(|t| t.kind == ToastKind::Error)
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.queue)
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_and_drain() {
        let mut toasts = Toasts::default();
        toasts.success("Saved");
        toasts.error("Broken");

        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts.errors().count(), 1);
        assert_eq!(toasts.latest().unwrap().message, "Broken");

        let drained = toasts.drain();
        assert_eq!(drained[0].kind, ToastKind::Success);
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_toast_expires() {
        let mut toasts = Toasts::new(Duration::from_millis(2000));
        toasts.success("Hi");
        let toast = toasts.latest().unwrap().clone();

        assert!(toast.is_visible_at(toast.shown_at));
        assert!(!toast.is_visible_at(toast.shown_at + Duration::from_secs(3)));
    }
}
