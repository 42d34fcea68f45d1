use crate::DetectError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cancellation handle passed to every detector.
///
/// Clones share the same cancellation flag, so a clone can be moved to another thread
/// and cancelled from there while a detection is running.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// let cx = nerdfont_detect::Context::with_timeout(Duration::from_secs(2));
/// let status = nerdfont_detect::detect(&cx)
///     .unwrap_or(nerdfont_detect::InstallStatus::NotInstalled);
/// println!("nerd fonts: {status}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that counts as cancelled once `timeout` has passed.
    ///
    /// A timeout too large to represent, such as [`Duration::MAX`], means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Cancels this context and all of its clones.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Returns [`DetectError::Cancelled`] if this context was cancelled.
    pub fn check(&self) -> Result<(), DetectError> {
        if self.is_cancelled() {
            Err(DetectError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use crate::Context;
    use std::time::{Duration, Instant};

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let cx = Context::new();
        let other = cx.clone();
        assert!(!cx.is_cancelled());

        other.cancel();
        assert!(cx.is_cancelled());
        assert!(cx.check().is_err());
    }

    #[test]
    fn test_deadline() {
        assert!(Context::with_deadline(Instant::now()).is_cancelled());
        assert!(!Context::with_timeout(Duration::from_secs(60)).is_cancelled());
    }

    #[test]
    fn test_unbounded_timeout() {
        let cx = Context::with_timeout(Duration::MAX);
        assert!(!cx.is_cancelled());

        cx.cancel();
        assert!(cx.is_cancelled());
    }
}
