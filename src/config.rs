//! Viewer configuration.

use crate::ConfigError;

/// Placeholder replaced by the 1-based, zero-padded frame number.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Configuration for one scrubber instance.
///
/// All fields have defaults, so a TOML file only needs the values it
/// overrides:
///
/// ```toml
/// total_frames = 375
/// frame_path_template = "/avatar/frame-{index}.png"
/// initial_frame_index = 0
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrubberConfig {
    /// Number of frames in the full 360° rotation
    pub total_frames: usize,
    /// Path of each frame, with an `{index}` placeholder
    pub frame_path_template: String,
    /// Frame shown right after loading (the forward-facing pose)
    pub initial_frame_index: usize,
    /// Minimum number of digits in the frame number
    pub index_width: usize,
    /// Fraction of the remaining distance covered per tick
    pub damping: f64,
    /// Distance below which the current frame snaps onto the target
    pub snap_threshold: f64,
    /// Side length of the square output surface, in logical pixels
    pub surface_size: u32,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        Self {
            total_frames: 168,
            frame_path_template: "/memoji-frames/frame-{index}.webp".to_string(),
            initial_frame_index: 130,
            index_width: 3,
            damping: 0.1,
            snap_threshold: 0.01,
            surface_size: 220,
        }
    }
}

impl ScrubberConfig {
    /// Create a config from the three host-facing props, keeping the
    /// default tuning.
    pub fn new(total_frames: usize, frame_path_template: impl Into<String>, initial_frame_index: usize) -> Self {
        Self {
            total_frames,
            frame_path_template: frame_path_template.into(),
            initial_frame_index,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML config.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_frames == 0 {
            return Err(ConfigError::NoFrames);
        }
        if self.initial_frame_index >= self.total_frames {
            return Err(ConfigError::InitialFrameOutOfRange {
                initial: self.initial_frame_index,
                total: self.total_frames,
            });
        }
        if !self.frame_path_template.contains(INDEX_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(self.frame_path_template.clone()));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::InvalidDamping(self.damping));
        }
        if !(self.snap_threshold > 0.0) {
            return Err(ConfigError::InvalidSnapThreshold(self.snap_threshold));
        }
        Ok(())
    }

    /// Resolve the path of a zero-based frame index.
    ///
    /// Files are numbered from 1, so index 0 becomes `001` with the default
    /// width.
    pub fn frame_path(&self, index: usize) -> String {
        let number = format!("{:0width$}", index + 1, width = self.index_width);
        self.frame_path_template.replace(INDEX_PLACEHOLDER, &number)
    }
}
