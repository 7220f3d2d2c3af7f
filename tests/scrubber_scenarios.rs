// End-to-end scenarios driving a scrubber with a fake provider and a
// recording surface.

use std::cell::Cell;
use std::collections::HashSet;
use std::f64::consts::{PI, TAU};
use std::future::Future;
use std::rc::Rc;

use sprite_scrubber::loader::LoadResult;
use sprite_scrubber::{FrameImageProvider, FrameLoadError, FrameSource, FrameSurface, LoadState, Paint, PointerInput, PointerPosition, Scrubber, ScrubberConfig, ViewMode, Viewport};

const VIEWPORT: Viewport = Viewport {
    width: 1200.0,
    height: 800.0,
};

/// Serves each frame as its own index, failing the listed frames.
struct FakeProvider {
    failing: HashSet<usize>,
    requests: Cell<usize>,
}

impl FakeProvider {
    fn healthy() -> Self {
        Self::failing(&[])
    }

    fn failing(frames: &[usize]) -> Self {
        Self {
            failing: frames.iter().copied().collect(),
            requests: Cell::new(0),
        }
    }
}

impl FrameImageProvider for FakeProvider {
    type Image = usize;

    fn load_image(&self, source: &FrameSource) -> impl Future<Output = LoadResult<usize>> {
        self.requests.set(self.requests.get() + 1);
        let result = if self.failing.contains(&source.index) {
            Err(format!("Failed to load {}", source.path))
        } else {
            Ok(source.index)
        };
        std::future::ready(result)
    }
}

#[derive(Default)]
struct RecordingSurface {
    painted: Vec<usize>,
    clears: usize,
}

impl FrameSurface for RecordingSurface {
    type Image = usize;
    type Error = String;

    fn paint(&mut self, paint: &Paint<'_, usize>) -> Result<(), String> {
        assert_eq!(*paint.image, paint.command.frame_index);
        self.painted.push(*paint.image);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), String> {
        self.clears += 1;
        Ok(())
    }
}

/// A pointer position whose angle lands in the middle of `frame`'s bucket.
fn pointer_for_frame(frame: usize, total: usize) -> PointerInput {
    let angle = (frame as f64 + 0.5) / total as f64 * TAU + PI;
    let (cx, cy) = VIEWPORT.center();
    PointerInput::Mouse(PointerPosition::new(cx + angle.cos() * 200.0, cy + angle.sin() * 200.0))
}

fn loaded_scrubber(total: usize, initial: usize) -> Scrubber<usize> {
    let mut scrubber = Scrubber::new(ScrubberConfig::new(total, "/frames/frame-{index}.webp", initial)).unwrap();
    pollster::block_on(scrubber.load(&FakeProvider::healthy())).unwrap();
    scrubber.set_display_active(true);
    scrubber
}

#[test]
fn pointer_helper_hits_requested_frame() {
    let mut scrubber = loaded_scrubber(168, 0);
    for frame in [0, 1, 42, 84, 140, 167] {
        assert_eq!(scrubber.handle_pointer(&pointer_for_frame(frame, 168), VIEWPORT), Some(frame));
    }
}

#[test]
fn all_frames_loaded_fires_once_and_paints_initial() {
    let calls = Rc::new(Cell::new(0));
    let mut scrubber = Scrubber::new(ScrubberConfig::default()).unwrap();
    let counter = calls.clone();
    scrubber.set_on_loaded(move || counter.set(counter.get() + 1));
    scrubber.set_display_active(true);

    let provider = FakeProvider::healthy();
    pollster::block_on(scrubber.load(&provider)).unwrap();

    assert_eq!(provider.requests.get(), 168);
    assert_eq!(calls.get(), 1);
    assert_eq!(scrubber.load_state(), LoadState::Loaded);
    assert_eq!(scrubber.view_mode(), ViewMode::Canvas);
    assert_eq!(scrubber.initial_paint().map(|p| *p.image), Some(130));

    // A second load attempt for the same mount is refused.
    let again = pollster::block_on(scrubber.load(&provider));
    assert_eq!(again, Err(FrameLoadError::AlreadyStarted));
    assert_eq!(calls.get(), 1);
}

#[test]
fn one_failed_frame_fails_everything() {
    let calls = Rc::new(Cell::new(0));
    let mut scrubber = Scrubber::new(ScrubberConfig::default()).unwrap();
    let counter = calls.clone();
    scrubber.set_on_loaded(move || counter.set(counter.get() + 1));
    scrubber.set_display_active(true);

    let err = pollster::block_on(scrubber.load(&FakeProvider::failing(&[57]))).unwrap_err();

    assert_eq!(
        err,
        FrameLoadError::Frame {
            index: 57,
            path: "/memoji-frames/frame-058.webp".into(),
            reason: "Failed to load /memoji-frames/frame-058.webp".into(),
        }
    );
    assert_eq!(calls.get(), 0);
    assert_eq!(scrubber.view_mode(), ViewMode::Failed);
    assert!(scrubber.initial_paint().is_none());

    let mut surface = RecordingSurface::default();
    for _ in 0..10 {
        assert!(!scrubber.tick_and_paint(1.0 / 60.0, &mut surface).unwrap());
    }
    assert!(surface.painted.is_empty());
}

#[test]
fn rotates_the_short_way_up() {
    let mut scrubber = loaded_scrubber(168, 130);
    scrubber.handle_pointer(&pointer_for_frame(140, 168), VIEWPORT);

    let mut surface = RecordingSurface::default();
    for _ in 0..200 {
        scrubber.tick_and_paint(1.0 / 60.0, &mut surface).unwrap();
    }

    assert!(surface.painted.windows(2).all(|w| w[0] <= w[1]));
    assert!(surface.painted.iter().all(|f| (130..=140).contains(f)));
    assert_eq!(surface.painted.last(), Some(&140));
    assert_eq!(scrubber.animation_state().current_frame, 140.0);
}

#[test]
fn rotates_the_short_way_through_zero() {
    let mut scrubber = loaded_scrubber(168, 2);
    scrubber.handle_pointer(&pointer_for_frame(165, 168), VIEWPORT);

    let mut surface = RecordingSurface::default();
    for _ in 0..200 {
        scrubber.tick_and_paint(1.0 / 60.0, &mut surface).unwrap();
    }

    // Every painted frame lies on the 7-frame arc 165..=167, 0..=2.
    assert!(surface.painted.iter().all(|f| *f <= 2 || *f >= 165));
    assert_eq!(surface.painted.last(), Some(&165));
}

#[test]
fn retargeting_mid_flight_follows_latest_pointer() {
    let mut scrubber = loaded_scrubber(168, 0);
    let mut surface = RecordingSurface::default();

    scrubber.handle_pointer(&pointer_for_frame(40, 168), VIEWPORT);
    for _ in 0..5 {
        scrubber.tick_and_paint(1.0 / 60.0, &mut surface).unwrap();
    }
    scrubber.handle_pointer(&pointer_for_frame(150, 168), VIEWPORT);
    for _ in 0..200 {
        scrubber.tick_and_paint(1.0 / 60.0, &mut surface).unwrap();
    }

    assert_eq!(scrubber.animation_state().target_frame, 150);
    assert_eq!(surface.painted.last(), Some(&150));
}

#[test]
fn steady_state_still_repaints_every_tick() {
    let mut scrubber = loaded_scrubber(16, 3);
    let mut surface = RecordingSurface::default();
    for _ in 0..30 {
        assert!(scrubber.tick_and_paint(1.0 / 60.0, &mut surface).unwrap());
    }
    assert_eq!(surface.painted, vec![3; 30]);
}

#[test]
fn hidden_viewer_clears_instead_of_painting() {
    let mut scrubber = loaded_scrubber(16, 3);
    scrubber.set_display_active(false);
    let mut surface = RecordingSurface::default();
    for _ in 0..4 {
        scrubber.tick_and_paint(1.0 / 60.0, &mut surface).unwrap();
    }
    assert!(surface.painted.is_empty());
    assert_eq!(surface.clears, 4);
}

#[test]
fn pointer_before_load_is_remembered() {
    let mut scrubber = Scrubber::new(ScrubberConfig::new(168, "/f/{index}.webp", 130)).unwrap();
    scrubber.handle_pointer(&pointer_for_frame(10, 168), VIEWPORT);
    assert_eq!(scrubber.animation_state().current_frame, 130.0);

    pollster::block_on(scrubber.load(&FakeProvider::healthy())).unwrap();
    scrubber.set_display_active(true);

    let mut painted = Vec::new();
    for _ in 0..200 {
        if let Some(paint) = scrubber.tick(1.0 / 60.0) {
            painted.push(*paint.image);
        }
    }
    assert_eq!(painted.last(), Some(&10));
}

#[test]
fn center_pointer_targets_half_turn() {
    let mut scrubber = loaded_scrubber(168, 0);
    let (cx, cy) = VIEWPORT.center();
    let input = PointerInput::Mouse(PointerPosition::new(cx, cy));
    assert_eq!(scrubber.handle_pointer(&input, VIEWPORT), Some(84));
}
