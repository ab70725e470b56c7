//! Tap capture handoff between the input thread and the render loop

use crossbeam::atomic::AtomicCell;
use std::time::Instant;

/// A single tap in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    /// Horizontal position in pixels
    pub x: f32,
    /// Vertical position in pixels
    pub y: f32,
    /// When the tap was captured
    pub captured_at: Instant,
}

impl TapEvent {
    /// Create a tap captured now
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            captured_at: Instant::now(),
        }
    }
}

/// Single-slot tap buffer
///
/// Share it between threads with `Arc`. A push replaces any tap the render
/// loop has not consumed yet; bursts collapse to the latest tap.
#[derive(Debug, Default)]
pub struct TapQueue {
    slot: AtomicCell<Option<TapEvent>>,
}

impl TapQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tap, replacing any unconsumed one
    pub fn push(&self, tap: TapEvent) {
        if self.slot.swap(Some(tap)).is_some() {
            tracing::trace!("superseded unconsumed tap");
        }
    }

    /// Remove and return the stored tap
    pub fn poll(&self) -> Option<TapEvent> {
        self.slot.take()
    }

    /// Whether a tap is waiting
    pub fn is_empty(&self) -> bool {
        self.slot.load().is_none()
    }
}
