//! The scrubber component: frame store, pointer mapper and animator under
//! one owner.

use crate::loader::load_frame_set;
use crate::render::{render_frame, FrameSurface, Paint, RenderConfig};
use crate::{AnimationState, ConfigError, Entrance, FrameImageProvider, FrameLoadError, FrameSet, FrameSource, FrameStore, LoadState, LoadingProgress, PointerInput, PointerMapper, ScrubAnimator, ScrubberConfig, Viewport};

/// What the host should show in the viewer's reserved slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// Display gate is closed: keep the space, draw nothing
    Placeholder,
    /// Frames are still loading: show a loading indicator
    Loading,
    /// Loading failed: show the failure indicator, permanently
    Failed,
    /// Frames are painted on the surface
    Canvas,
}

/// A pointer-driven sprite scrubbing viewer.
///
/// Owns its frames, load state and animation state for its whole lifetime.
/// The host feeds it pointer events and display refresh ticks.
///
/// ## Example
///
/// ```rust
/// use sprite_scrubber::{PointerInput, PointerPosition, Scrubber, ScrubberConfig, Viewport};
///
/// let mut scrubber: Scrubber<String> = Scrubber::new(ScrubberConfig::new(8, "f{index}.png", 0)).unwrap();
/// let sources = scrubber.begin_loading().unwrap();
/// let frames = sources.iter().map(|s| s.path.clone()).collect();
/// scrubber.finish_loading(sprite_scrubber::FrameSet::new(frames));
/// scrubber.set_display_active(true);
///
/// // Pointer straight below the center of an 800x600 viewport.
/// let input = PointerInput::Mouse(PointerPosition::new(399.0, 590.0));
/// assert_eq!(scrubber.handle_pointer(&input, Viewport::new(800.0, 600.0)), Some(6));
///
/// // The short way from 0 to 6 runs backward through 7.
/// scrubber.tick(1.0 / 60.0);
/// assert!(scrubber.animation_state().current_frame > 7.0);
///
/// for _ in 0..200 {
///     scrubber.tick(1.0 / 60.0);
/// }
/// let paint = scrubber.tick(1.0 / 60.0).unwrap();
/// assert_eq!(paint.image, "f007.png");
/// ```
pub struct Scrubber<I> {
    config: ScrubberConfig,
    render_config: RenderConfig,
    store: FrameStore<I>,
    animator: ScrubAnimator,
    mapper: PointerMapper,
    entrance: Entrance,
    display_active: bool,
}

impl<I> Scrubber<I> {
    pub fn new(config: ScrubberConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            render_config: RenderConfig::from_config(&config),
            store: FrameStore::new(),
            animator: ScrubAnimator::from_config(&config),
            mapper: PointerMapper::new(config.total_frames),
            entrance: Entrance::default(),
            display_active: false,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &ScrubberConfig {
        &self.config
    }

    /// Register the callback fired once, when every frame has loaded.
    pub fn set_on_loaded(&mut self, callback: impl FnOnce() + 'static) {
        self.store.set_on_loaded(callback);
    }

    /// Open or close the host's display gate.
    ///
    /// Closing it rewinds the entrance animation so it replays on the next
    /// show.
    pub fn set_display_active(&mut self, active: bool) {
        if !active {
            self.entrance.reset();
        }
        self.display_active = active;
    }

    #[inline]
    pub fn display_active(&self) -> bool {
        self.display_active
    }

    #[inline]
    pub fn load_state(&self) -> LoadState {
        self.store.state()
    }

    pub fn progress(&self) -> &LoadingProgress {
        self.store.progress()
    }

    pub fn load_error(&self) -> Option<&FrameLoadError> {
        self.store.error()
    }

    pub fn view_mode(&self) -> ViewMode {
        if !self.display_active {
            return ViewMode::Placeholder;
        }
        match self.store.state() {
            LoadState::Loading => ViewMode::Loading,
            LoadState::Failed => ViewMode::Failed,
            LoadState::Loaded => ViewMode::Canvas,
        }
    }

    #[inline]
    pub fn animation_state(&self) -> AnimationState {
        self.animator.state()
    }

    /// Start loading. Returns the frames to fetch.
    pub fn begin_loading(&mut self) -> Result<Vec<FrameSource>, FrameLoadError> {
        let sources = FrameSource::all(&self.config);
        self.store.begin(&sources)?;
        Ok(sources)
    }

    pub fn record_progress(&mut self, loaded: usize) {
        self.store.record_progress(loaded);
    }

    /// Apply the aggregate load result.
    ///
    /// A set whose size differs from the configured frame count is treated
    /// as a failure.
    pub fn finish_loading(&mut self, result: Result<FrameSet<I>, FrameLoadError>) -> LoadState {
        let total = self.config.total_frames;
        let result = result.and_then(|frames| {
            if frames.len() == total {
                Ok(frames)
            } else {
                Err(FrameLoadError::Frame {
                    index: frames.len().min(total),
                    path: String::new(),
                    reason: format!("expected {total} frames, got {}", frames.len()),
                })
            }
        });
        self.store.finish(result)
    }

    /// Load every frame from `provider`.
    pub async fn load<P>(&mut self, provider: &P) -> Result<(), FrameLoadError>
    where
        P: FrameImageProvider<Image = I>,
    {
        let sources = self.begin_loading()?;
        let result = load_frame_set(provider, &sources, |_, _| {}).await;
        match self.finish_loading(result) {
            LoadState::Loaded => Ok(()),
            _ => Err(self.store.error().cloned().unwrap_or(FrameLoadError::Empty)),
        }
    }

    /// Map a pointer event onto a new target frame.
    ///
    /// Accepted at any time, including while frames are still loading.
    pub fn handle_pointer(&mut self, input: &PointerInput, viewport: Viewport) -> Option<usize> {
        let frame = self.mapper.map(input, viewport)?;
        self.animator.set_target(frame);
        Some(frame)
    }

    /// The initial frame, as painted right after loading.
    pub fn initial_paint(&self) -> Option<Paint<'_, I>> {
        if self.view_mode() != ViewMode::Canvas {
            return None;
        }
        let index = self.config.initial_frame_index;
        let image = self.store.frames()?.get(index)?;
        Some(Paint {
            image,
            command: render_frame(index, &self.render_config, self.entrance.transform()),
        })
    }

    /// Advance one display refresh, `dt` seconds after the previous one.
    ///
    /// Does nothing until frames are loaded. Once loaded, the animation
    /// always advances; a paint is produced only while the canvas is shown.
    pub fn tick(&mut self, dt: f64) -> Option<Paint<'_, I>> {
        if self.store.state() != LoadState::Loaded {
            return None;
        }
        let outcome = self.animator.tick();
        if self.view_mode() != ViewMode::Canvas {
            return None;
        }
        let transform = self.entrance.step(dt);
        let image = self.store.frames()?.get(outcome.frame)?;
        Some(Paint {
            image,
            command: render_frame(outcome.frame, &self.render_config, transform),
        })
    }

    /// [`tick`](Self::tick) and paint the result, blanking the surface when
    /// there is nothing to show. Returns whether a frame was painted.
    pub fn tick_and_paint<S>(&mut self, dt: f64, surface: &mut S) -> Result<bool, S::Error>
    where
        S: FrameSurface<Image = I>,
    {
        match self.tick(dt) {
            Some(paint) => {
                surface.paint(&paint)?;
                Ok(true)
            }
            None => {
                surface.clear()?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointerPosition;

    fn loaded(total: usize, initial: usize) -> Scrubber<usize> {
        let mut scrubber = Scrubber::new(ScrubberConfig::new(total, "f{index}", initial)).unwrap();
        scrubber.begin_loading().unwrap();
        scrubber.finish_loading(FrameSet::new((0..total).collect()));
        scrubber
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(Scrubber::<usize>::new(ScrubberConfig::new(0, "f{index}", 0)).is_err());
    }

    #[test]
    fn view_modes() {
        let mut scrubber: Scrubber<usize> = Scrubber::new(ScrubberConfig::new(4, "f{index}", 0)).unwrap();
        assert_eq!(scrubber.view_mode(), ViewMode::Placeholder);
        scrubber.set_display_active(true);
        assert_eq!(scrubber.view_mode(), ViewMode::Loading);

        scrubber.begin_loading().unwrap();
        scrubber.finish_loading(Err(FrameLoadError::Empty));
        assert_eq!(scrubber.view_mode(), ViewMode::Failed);
        scrubber.set_display_active(false);
        assert_eq!(scrubber.view_mode(), ViewMode::Placeholder);
    }

    #[test]
    fn no_ticks_before_loaded() {
        let mut scrubber: Scrubber<usize> = Scrubber::new(ScrubberConfig::new(4, "f{index}", 0)).unwrap();
        scrubber.set_display_active(true);
        let input = PointerInput::Mouse(PointerPosition::new(0.0, 1.0));
        assert_eq!(scrubber.handle_pointer(&input, Viewport::new(10.0, 10.0)), Some(0));
        assert!(scrubber.tick(0.016).is_none());
        assert_eq!(scrubber.animation_state().current_frame, 0.0);
    }

    #[test]
    fn short_set_counts_as_failure() {
        let mut scrubber: Scrubber<usize> = Scrubber::new(ScrubberConfig::new(4, "f{index}", 0)).unwrap();
        scrubber.begin_loading().unwrap();
        assert_eq!(scrubber.finish_loading(FrameSet::new(vec![0, 1])), LoadState::Failed);
        assert!(scrubber.load_error().is_some());
    }

    #[test]
    fn initial_paint_shows_initial_frame() {
        let mut scrubber = loaded(168, 130);
        assert!(scrubber.initial_paint().is_none());
        scrubber.set_display_active(true);
        let paint = scrubber.initial_paint().unwrap();
        assert_eq!(*paint.image, 130);
        assert_eq!(paint.command.frame_index, 130);
    }

    #[test]
    fn hidden_viewer_keeps_animating() {
        let mut scrubber = loaded(168, 130);
        scrubber.animator.set_target(140);
        assert!(scrubber.tick(0.016).is_none());
        assert!((scrubber.animation_state().current_frame - 131.0).abs() < 1e-9);
    }

    #[test]
    fn entrance_replays_after_hide() {
        let mut scrubber = loaded(8, 0);
        scrubber.set_display_active(true);
        for _ in 0..200 {
            scrubber.tick(1.0 / 60.0);
        }
        assert!(scrubber.tick(1.0 / 60.0).unwrap().command.is_identity());

        scrubber.set_display_active(false);
        scrubber.set_display_active(true);
        let first = scrubber.tick(1.0 / 60.0).unwrap();
        assert!(first.command.scale < 1.0);
    }
}
