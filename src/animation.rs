//! Interpolation of the displayed frame toward the pointer's target.
//!
//! Each tick covers a fixed fraction of the remaining distance (exponential
//! easing) along the shorter arc of the circular frame space, and snaps once
//! the remaining distance drops below a threshold.

use crate::ScrubberConfig;

/// Fraction of the remaining distance covered per tick.
pub const DEFAULT_DAMPING: f64 = 0.1;

/// Remaining distance below which the current frame snaps to the target.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.01;

/// Signed distance from `current` to `target` along the shorter arc of a
/// `total_frames` circle.
///
/// Positive values move toward higher indices. At exactly half a turn the
/// raw difference is kept.
#[inline]
pub fn shortest_delta(current: f64, target: f64, total_frames: usize) -> f64 {
    let n = total_frames as f64;
    let mut diff = target - current;
    if diff > n / 2.0 {
        diff -= n;
    } else if diff < -n / 2.0 {
        diff += n;
    }
    diff
}

/// Wrap a continuous frame position into `[0, total_frames)`.
#[inline]
pub fn wrap_frame(value: f64, total_frames: usize) -> f64 {
    let n = total_frames as f64;
    let wrapped = ((value % n) + n) % n;
    // (-tiny % n) + n rounds to n
    if wrapped >= n {
        0.0
    } else {
        wrapped
    }
}

/// Interpolation state shared by the pointer handler and the render loop.
///
/// `current_frame` is only written by [`ScrubAnimator::tick`];
/// `target_frame` is only written by [`ScrubAnimator::set_target`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    /// Continuous displayed position in `[0, N)`
    pub current_frame: f64,
    /// Frame the pointer points at, in `[0, N - 1]`
    pub target_frame: usize,
}

/// Outcome of one animation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Frame to paint this tick
    pub frame: usize,
    /// The current frame snapped onto the target this tick
    pub snapped: bool,
}

/// Per-tick interpolator over a circular frame space.
///
/// The caller drives `tick()` from its display refresh callback; the
/// animator itself has no notion of time.
///
/// ## Example
///
/// ```rust
/// use sprite_scrubber::ScrubAnimator;
///
/// let mut animator = ScrubAnimator::new(168, 2);
/// animator.set_target(165);
///
/// // The short way from 2 to 165 goes down through 0.
/// let first = animator.tick();
/// assert_eq!(first.frame, 2);
/// assert!(animator.current_frame() < 2.0);
///
/// while !animator.is_settled() {
///     animator.tick();
/// }
/// assert_eq!(animator.displayed_frame(), 165);
/// ```
#[derive(Clone, Debug)]
pub struct ScrubAnimator {
    state: AnimationState,
    total_frames: usize,
    damping: f64,
    snap_threshold: f64,
}

impl ScrubAnimator {
    /// Create an animator resting on `initial_frame`.
    pub fn new(total_frames: usize, initial_frame: usize) -> Self {
        let total_frames = total_frames.max(1);
        let initial_frame = initial_frame.min(total_frames - 1);
        Self {
            state: AnimationState {
                current_frame: initial_frame as f64,
                target_frame: initial_frame,
            },
            total_frames,
            damping: DEFAULT_DAMPING,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }

    pub fn from_config(config: &ScrubberConfig) -> Self {
        Self::new(config.total_frames, config.initial_frame_index)
            .with_damping(config.damping)
            .with_snap_threshold(config.snap_threshold)
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold;
        self
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    #[inline]
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    #[inline]
    pub fn current_frame(&self) -> f64 {
        self.state.current_frame
    }

    #[inline]
    pub fn target_frame(&self) -> usize {
        self.state.target_frame
    }

    /// Point the animation at a new target.
    ///
    /// Targets come from the pointer mapper, which clamps to `N - 1`; an
    /// out-of-range target is a caller bug.
    pub fn set_target(&mut self, frame: usize) {
        debug_assert!(frame < self.total_frames, "target frame {frame} out of range");
        self.state.target_frame = frame.min(self.total_frames - 1);
    }

    /// Frame that should currently be on screen.
    ///
    /// Rounding can reach `N` just below the wrap point, which is frame 0.
    #[inline]
    pub fn displayed_frame(&self) -> usize {
        (self.state.current_frame.round() as usize) % self.total_frames
    }

    /// Whether the current frame rests exactly on the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.state.current_frame == self.state.target_frame as f64
    }

    /// Advance one step toward the target.
    pub fn tick(&mut self) -> TickOutcome {
        let target = self.state.target_frame as f64;
        let diff = shortest_delta(self.state.current_frame, target, self.total_frames);

        let snapped = diff.abs() < self.snap_threshold;
        if snapped {
            self.state.current_frame = target;
        } else {
            let next = self.state.current_frame + diff * self.damping;
            self.state.current_frame = wrap_frame(next, self.total_frames);
        }

        TickOutcome {
            frame: self.displayed_frame(),
            snapped,
        }
    }
}
