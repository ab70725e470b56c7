//! Anchor cap and eviction order across arbitrary add sequences

use anchorcam_core::{Anchor, AnchorId, AnchorManager, Pose, TrackingState, MAX_ANCHORS};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

struct CountingAnchor {
    id: AnchorId,
    detached: Rc<RefCell<Vec<AnchorId>>>,
}

impl Anchor for CountingAnchor {
    fn id(&self) -> AnchorId {
        self.id
    }

    fn pose(&self) -> Pose {
        Pose::IDENTITY
    }

    fn tracking_state(&self) -> TrackingState {
        TrackingState::Tracking
    }

    fn detach(&mut self) {
        self.detached.borrow_mut().push(self.id);
    }
}

proptest! {
    #[test]
    fn count_never_exceeds_cap(adds in 0usize..120) {
        let detached = Rc::new(RefCell::new(Vec::new()));
        let mut manager = AnchorManager::new();
        for i in 0..adds {
            manager.add(CountingAnchor { id: AnchorId(i as u64), detached: Rc::clone(&detached) });
            prop_assert!(manager.len() <= MAX_ANCHORS);
        }
        prop_assert_eq!(manager.len(), adds.min(MAX_ANCHORS));
    }

    #[test]
    fn survivors_are_the_newest_in_order(adds in 1usize..120) {
        let detached = Rc::new(RefCell::new(Vec::new()));
        let mut manager = AnchorManager::new();
        let mut evicted = Vec::new();
        for i in 0..adds {
            if let Some(id) = manager.add(CountingAnchor { id: AnchorId(i as u64), detached: Rc::clone(&detached) }) {
                evicted.push(id);
            }
        }

        let first_kept = adds.saturating_sub(MAX_ANCHORS) as u64;
        let live: Vec<AnchorId> = manager.iter().map(|a| a.id()).collect();
        let expected: Vec<AnchorId> = (first_kept..adds as u64).map(AnchorId).collect();
        prop_assert_eq!(live, expected);

        let expected_evicted: Vec<AnchorId> = (0..first_kept).map(AnchorId).collect();
        prop_assert_eq!(&evicted, &expected_evicted);
        prop_assert_eq!(&*detached.borrow(), &expected_evicted);
    }
}
