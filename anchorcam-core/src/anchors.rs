//! Bounded FIFO set of live anchors

use crate::session::{Anchor, AnchorId};
use std::collections::VecDeque;

/// Maximum number of live anchors
///
/// Bounds per-frame tracking and draw cost.
pub const MAX_ANCHORS: usize = 20;

/// Owns every live anchor, oldest first
///
/// When full, adding evicts the oldest anchor after detaching it. Dropping the
/// manager detaches whatever is left.
pub struct AnchorManager<A: Anchor> {
    anchors: VecDeque<A>,
}

impl<A: Anchor> AnchorManager<A> {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            anchors: VecDeque::with_capacity(MAX_ANCHORS),
        }
    }

    /// Add an anchor, evicting the oldest if the cap is reached
    ///
    /// Returns the id of the evicted anchor.
    pub fn add(&mut self, anchor: A) -> Option<AnchorId> {
        let evicted = if self.anchors.len() >= MAX_ANCHORS {
            self.evict_oldest()
        } else {
            None
        };

        tracing::debug!(anchor = %anchor.id(), count = self.anchors.len() + 1, "anchor added");
        self.anchors.push_back(anchor);
        evicted
    }

    fn evict_oldest(&mut self) -> Option<AnchorId> {
        let oldest = self.anchors.front_mut()?;
        oldest.detach();
        let id = oldest.id();
        self.anchors.pop_front();
        tracing::debug!(anchor = %id, "evicted oldest anchor");
        Some(id)
    }

    /// Iterate live anchors in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.anchors.iter()
    }

    /// The live sequence, oldest first
    pub fn all(&self) -> &VecDeque<A> {
        &self.anchors
    }

    /// The oldest live anchor
    pub fn oldest(&self) -> Option<&A> {
        self.anchors.front()
    }

    /// Number of live anchors
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether there are no live anchors
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Detach and drop every anchor
    pub fn clear(&mut self) {
        for anchor in self.anchors.iter_mut() {
            anchor.detach();
        }
        if !self.anchors.is_empty() {
            tracing::debug!(count = self.anchors.len(), "detached all anchors");
        }
        self.anchors.clear();
    }
}

impl<A: Anchor> Default for AnchorManager<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Anchor> Drop for AnchorManager<A> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Pose;
    use crate::tracking::TrackingState;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<AnchorId>>>;

    struct LoggedAnchor {
        id: AnchorId,
        detached: bool,
        log: Log,
    }

    impl Anchor for LoggedAnchor {
        fn id(&self) -> AnchorId {
            self.id
        }

        fn pose(&self) -> Pose {
            Pose::IDENTITY
        }

        fn tracking_state(&self) -> TrackingState {
            if self.detached {
                TrackingState::Stopped
            } else {
                TrackingState::Tracking
            }
        }

        fn detach(&mut self) {
            if !self.detached {
                self.detached = true;
                self.log.borrow_mut().push(self.id);
            }
        }
    }

    fn anchor(id: u64, log: &Log) -> LoggedAnchor {
        LoggedAnchor {
            id: AnchorId(id),
            detached: false,
            log: Rc::clone(log),
        }
    }

    #[test]
    fn fills_up_to_cap_without_eviction() {
        let log = Log::default();
        let mut manager = AnchorManager::new();
        for id in 0..MAX_ANCHORS as u64 {
            assert_eq!(manager.add(anchor(id, &log)), None);
        }
        assert_eq!(manager.len(), MAX_ANCHORS);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn evicts_oldest_after_detaching() {
        let log = Log::default();
        let mut manager = AnchorManager::new();
        for id in 0..=MAX_ANCHORS as u64 {
            manager.add(anchor(id, &log));
        }

        assert_eq!(manager.len(), MAX_ANCHORS);
        assert_eq!(*log.borrow(), vec![AnchorId(0)]);
        assert_eq!(manager.oldest().map(|a| a.id()), Some(AnchorId(1)));
        assert_eq!(manager.iter().last().map(|a| a.id()), Some(AnchorId(MAX_ANCHORS as u64)));
    }

    #[test]
    fn evicting_already_detached_anchor_is_safe() {
        let log = Log::default();
        let mut manager = AnchorManager::new();
        let mut first = anchor(0, &log);
        first.detach();
        manager.add(first);
        for id in 1..=MAX_ANCHORS as u64 {
            manager.add(anchor(id, &log));
        }
        assert_eq!(*log.borrow(), vec![AnchorId(0)]);
        assert_eq!(manager.oldest().map(|a| a.id()), Some(AnchorId(1)));
    }

    #[test]
    fn drop_detaches_everything() {
        let log = Log::default();
        {
            let mut manager = AnchorManager::new();
            manager.add(anchor(7, &log));
            manager.add(anchor(8, &log));
        }
        assert_eq!(*log.borrow(), vec![AnchorId(7), AnchorId(8)]);
    }
}
