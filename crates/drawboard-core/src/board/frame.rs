//! Redraw coalescing.

/// Collapses any number of redraw requests between frames into one.
///
/// The host asks [`RedrawScheduler::take`] once per animation frame and only
/// renders when it returns `true`. After [`RedrawScheduler::cancel`] no
/// further frames are handed out until the scheduler is resumed.
#[derive(Debug, Default, Clone)]
pub struct RedrawScheduler {
    pending: bool,
    suspended: bool,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a redraw. Returns `true` if this request scheduled a new frame.
    pub fn request(&mut self) -> bool {
        if self.suspended || self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Consume the pending frame, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drop the pending frame and ignore requests until [`RedrawScheduler::resume`].
    pub fn cancel(&mut self) {
        self.pending = false;
        self.suspended = true;
    }

    /// Accept requests again and schedule a frame for the new surface.
    pub fn resume(&mut self) {
        self.suspended = false;
        self.request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let mut scheduler = RedrawScheduler::new();
        assert!(scheduler.request());
        assert!(!scheduler.request());
        assert!(!scheduler.request());
        assert!(scheduler.take());
        assert!(!scheduler.take());
    }

    #[test]
    fn test_cancel_drops_pending_frame() {
        let mut scheduler = RedrawScheduler::new();
        scheduler.request();
        scheduler.cancel();
        assert!(!scheduler.is_pending());
        assert!(!scheduler.request());
        scheduler.resume();
        assert!(scheduler.take());
    }
}
