//! Redraw coalescing.
//!
//! Anything that changes what's on screen calls `request()`. The render loop
//! calls `take()` once per poll cycle and draws only if it returns true, so
//! a burst of inbound messages costs one frame, not one per message.
//!
//! Only the render loop touches the scheduler: background tasks report
//! through the action channel and their effects are applied on the loop.

use log::debug;

#[derive(Debug)]
pub struct UpdateScheduler {
    dirty: bool,
    /// Requests folded into the pending frame (for logging only).
    pending: u32,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateScheduler {
    /// Starts dirty so the first frame is always drawn.
    pub fn new() -> Self {
        Self {
            dirty: true,
            pending: 1,
        }
    }

    pub fn request(&mut self) {
        self.dirty = true;
        self.pending = self.pending.saturating_add(1);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the dirty flag. Returns true if a redraw is due.
    pub fn take(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        if self.pending > 1 {
            debug!("Coalesced {} redraw requests into one frame", self.pending);
        }
        self.dirty = false;
        self.pending = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_take_is_dirty() {
        let mut scheduler = UpdateScheduler::new();
        assert!(scheduler.take());
        assert!(!scheduler.take());
    }

    #[test]
    fn many_requests_one_frame() {
        let mut scheduler = UpdateScheduler::new();
        scheduler.take();
        for _ in 0..50 {
            scheduler.request();
        }
        assert!(scheduler.is_dirty());
        assert!(scheduler.take());
        assert!(!scheduler.is_dirty());
        assert!(!scheduler.take());
    }
}
