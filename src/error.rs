//! Error types for configuration and frame loading.

use thiserror::Error;

/// Failure of the frame store.
///
/// Any single failed frame is fatal to the viewer instance: the store moves
/// to [`LoadState::Failed`](crate::LoadState::Failed) and never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameLoadError {
    /// One frame resource could not be resolved
    #[error("failed to load frame {index} from {path}: {reason}")]
    Frame {
        index: usize,
        path: String,
        reason: String,
    },
    /// `begin` was called on a store that already started loading
    #[error("frame loading was already started for this viewer")]
    AlreadyStarted,
    /// The provider resolved zero frames
    #[error("frame set is empty")]
    Empty,
}

/// Invalid viewer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("total_frames must be at least 1")]
    NoFrames,
    #[error("initial frame {initial} is outside 0..{total}")]
    InitialFrameOutOfRange { initial: usize, total: usize },
    #[error("frame path template {0:?} has no `{{index}}` placeholder")]
    MissingPlaceholder(String),
    #[error("damping factor {0} must be in (0, 1]")]
    InvalidDamping(f64),
    #[error("snap threshold {0} must be positive")]
    InvalidSnapThreshold(f64),
    #[cfg(feature = "toml")]
    #[error("invalid scrubber config: {0}")]
    Toml(#[from] toml::de::Error),
}
