//! # sprite-scrubber
//!
//! Pointer-driven sprite scrubbing: a subject photographed through a full
//! 360° turn is shown as one of `N` frames, and the displayed frame eases
//! toward whichever frame "faces" the mouse or touch point.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Preloading a frame set with all-or-nothing completion
//! - Mapping pointer positions to target frames by polar angle
//! - Interpolating the displayed frame along the shorter arc
//! - Rendering frames to a surface (with optional web support)
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for data structures
//! - `toml` - Load [`ScrubberConfig`] from TOML
//! - `web` - Enable web/WASM canvas rendering support
//!
//! ## Example
//!
//! ```rust,ignore
//! use sprite_scrubber::{Scrubber, ScrubberConfig, PointerInput, Viewport};
//!
//! let mut scrubber = Scrubber::new(ScrubberConfig::default())?;
//! scrubber.set_on_loaded(|| log::info!("ready"));
//! scrubber.load(&provider).await?;
//! scrubber.set_display_active(true);
//!
//! // From the host's event handlers:
//! scrubber.handle_pointer(&PointerInput::Mouse(pos), Viewport::new(w, h));
//!
//! // From the host's display refresh callback:
//! scrubber.tick_and_paint(dt, &mut surface)?;
//! ```

mod animation;
mod config;
mod data;
mod entrance;
mod error;
pub mod loader;
mod mapper;
pub mod render;
mod viewer;

pub use animation::{shortest_delta, wrap_frame, AnimationState, ScrubAnimator, TickOutcome, DEFAULT_DAMPING, DEFAULT_SNAP_THRESHOLD};
pub use config::{ScrubberConfig, INDEX_PLACEHOLDER};
pub use data::{FrameSet, FrameSource};
pub use entrance::{Entrance, EntranceTransform, SpringConfig};
pub use error::{ConfigError, FrameLoadError};
pub use loader::{load_frame_set, FrameImageProvider, FrameStore, LoadState, LoadingProgress};
pub use mapper::{frame_for_degrees, frame_for_pointer, frame_for_turns, pointer_angle, PointerInput, PointerMapper, PointerPosition, Viewport, ORIENTATION_OFFSET};
pub use render::{DrawCommand, FrameSurface, Paint, RenderConfig};
pub use viewer::{Scrubber, ViewMode};

#[cfg(feature = "web")]
pub use render::web::{mount, MountedScrubber};
