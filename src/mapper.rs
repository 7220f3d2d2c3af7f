//! Mapping pointer positions to target frames.
//!
//! The pointer's polar angle around the viewport center is bucketed into
//! one of `N` frames. Frame 0 faces a pointer directly left of center, and
//! frame indices grow clockwise on screen (y points down).

use std::f64::consts::{PI, TAU};

/// Rotation subtracted from the raw `atan2` angle so that frame 0 lies
/// directly left of center.
pub const ORIENTATION_OFFSET: f64 = PI;

/// Viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// A viewport-relative pointer position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A pointer event as delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerInput {
    Mouse(PointerPosition),
    /// Active touch points, in the order the host reports them
    Touch(Vec<PointerPosition>),
}

impl PointerInput {
    /// The position that drives the viewer. Only the first touch counts.
    pub fn primary(&self) -> Option<PointerPosition> {
        match self {
            PointerInput::Mouse(pos) => Some(*pos),
            PointerInput::Touch(points) => points.first().copied(),
        }
    }
}

/// Angle of the pointer around the viewport center, in `[0, 2π)` radians,
/// with [`ORIENTATION_OFFSET`] applied.
///
/// A pointer exactly at the center gives `atan2(0, 0) = 0`, hence `π`.
#[inline]
pub fn pointer_angle(pointer: PointerPosition, viewport: Viewport) -> f64 {
    let (cx, cy) = viewport.center();
    let dx = pointer.x - cx;
    let dy = pointer.y - cy;
    let angle = (dy.atan2(dx) - ORIENTATION_OFFSET).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// Bucket a fraction of a full turn into a frame of a `total_frames` rotation.
///
/// Turns are taken modulo 1, so 0 and 1 land on the same frame.
#[inline]
pub fn frame_for_turns(turns: f64, total_frames: usize) -> usize {
    if total_frames == 0 {
        return 0;
    }
    let frame = (turns.rem_euclid(1.0) * total_frames as f64).floor() as usize;
    frame.min(total_frames - 1)
}

/// Bucket an angle in degrees: `floor(degrees * N / 360)`, clamped to `N - 1`.
///
/// Degrees are taken modulo 360, so 0° and 360° land on the same frame.
#[inline]
pub fn frame_for_degrees(degrees: f64, total_frames: usize) -> usize {
    frame_for_turns(degrees / 360.0, total_frames)
}

/// Target frame for a pointer position.
#[inline]
pub fn frame_for_pointer(pointer: PointerPosition, viewport: Viewport, total_frames: usize) -> usize {
    // Dividing by TAU keeps the center case (π) at exactly half a turn.
    frame_for_turns(pointer_angle(pointer, viewport) / TAU, total_frames)
}

/// Stateless mapper bound to a frame count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerMapper {
    total_frames: usize,
}

impl PointerMapper {
    pub fn new(total_frames: usize) -> Self {
        Self { total_frames }
    }

    #[inline]
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Map an event to a target frame.
    ///
    /// Returns `None` only for a touch event without touch points.
    pub fn map(&self, input: &PointerInput, viewport: Viewport) -> Option<usize> {
        input
            .primary()
            .map(|pos| frame_for_pointer(pos, viewport, self.total_frames))
    }
}
