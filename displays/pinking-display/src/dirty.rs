//! Shared dirty flag
//!
//! Observers run on whichever thread made a change, so marking a widget
//! dirty is a single atomic store. The dispatch loop reads and clears it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable "needs redraw" marker
#[derive(Debug, Clone)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl Default for DirtyFlag {
    /// New flags start dirty so the first frame is always drawn
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a redraw
    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check without clearing
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear and return the previous value
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_dirty() {
        let flag = DirtyFlag::new();
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.is_set());
        assert!(!flag.take());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = DirtyFlag::new();
        flag.take();
        let other = flag.clone();
        other.mark();
        assert!(flag.is_set());
    }
}
