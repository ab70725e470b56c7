//! Simulated perception session and headless renderers

pub mod renderers;
pub mod session;

pub use renderers::{
    DrawCounters, LoggingBackground, LoggingObjects, LoggingPlanes, LoggingSurface, SharedCounters,
};
pub use session::SimulatedSession;
