//! Error types for the anchoring core

use thiserror::Error;

/// Result type for anchoring and rendering operations
pub type Result<T> = std::result::Result<T, ArError>;

/// Errors that can occur while driving an AR session
#[derive(Debug, Error)]
pub enum ArError {
    /// The perception session has not been started
    #[error("AR session unavailable: {0}")]
    SessionUnavailable(String),

    /// The device camera is held by another consumer
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// A renderer could not load its assets during setup
    #[error("asset load failed for {asset}: {message}")]
    AssetIo {
        /// Asset that failed to load
        asset: String,
        /// Underlying failure description
        message: String,
    },

    /// A draw stage failed during a tick
    #[error("render error: {0}")]
    Render(String),

    /// The session refused to create an anchor
    #[error("anchor creation failed: {0}")]
    AnchorCreation(String),

    /// A collaborator panicked during a tick
    #[error("panic during tick: {0}")]
    Panicked(String),

    /// Generic error from a collaborator
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ArError {
    /// Create a session unavailable error
    pub fn session_unavailable(msg: impl Into<String>) -> Self {
        Self::SessionUnavailable(msg.into())
    }

    /// Create a camera unavailable error
    pub fn camera_unavailable(msg: impl Into<String>) -> Self {
        Self::CameraUnavailable(msg.into())
    }

    /// Create an asset IO error
    pub fn asset_io(asset: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::AssetIo {
            asset: asset.into(),
            message: msg.into(),
        }
    }

    /// Create a render error
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create an anchor creation error
    pub fn anchor_creation(msg: impl Into<String>) -> Self {
        Self::AnchorCreation(msg.into())
    }

    /// Whether this error belongs to the session lifecycle class
    ///
    /// Lifecycle errors are eligible for retry on the next resume, never
    /// within a tick.
    pub fn is_session_lifecycle(&self) -> bool {
        matches!(self, Self::SessionUnavailable(_) | Self::CameraUnavailable(_))
    }
}
