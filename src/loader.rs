//! Frame preloading and load state management.
//!
//! All frames are fetched concurrently before the viewer becomes usable.
//! The aggregate is all-or-nothing: one failed frame fails the whole set,
//! and no partially loaded set is ever exposed.

use std::cell::Cell;
use std::future::Future;

use futures::future::try_join_all;

use crate::{FrameLoadError, FrameSet, FrameSource};

/// Load state of a frame store.
///
/// Moves exactly once, from `Loading` to either `Loaded` or `Failed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Frames are being fetched (or have not been requested yet)
    #[default]
    Loading,
    /// Every frame resolved
    Loaded,
    /// At least one frame failed
    Failed,
}

/// Progress information for frame loading
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadingProgress {
    /// Number of frames resolved so far
    pub loaded: usize,
    /// Total number of frames to load
    pub total: usize,
}

impl LoadingProgress {
    pub fn new(total: usize) -> Self {
        Self { loaded: 0, total }
    }

    /// Get loading percentage (0-100)
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            0
        } else {
            ((self.loaded as f32 / self.total as f32) * 100.0) as u8
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded >= self.total
    }

    /// Format a loading message for a host indicator
    pub fn message(&self) -> String {
        if self.total > 0 {
            format!(
                "Loading frames... {} / {} ({}%)",
                self.loaded,
                self.total,
                self.percent()
            )
        } else {
            "Loading frames...".to_string()
        }
    }
}

/// Result type for provider operations. The error is a human-readable reason.
pub type LoadResult<T> = Result<T, String>;

/// Trait for async frame image providers.
///
/// Implement this trait to fetch frames from your I/O mechanism (browser
/// image elements, fetch API, filesystem, etc.).
///
/// No `Send` bounds: works in both native and WASM (single-threaded) contexts.
pub trait FrameImageProvider {
    /// Decoded image handle stored in the frame set
    type Image;

    /// Load one frame.
    fn load_image(&self, source: &FrameSource) -> impl Future<Output = LoadResult<Self::Image>>;
}

/// Load every frame concurrently and join them into a [`FrameSet`].
///
/// `on_frame(loaded, total)` is called each time one more frame resolves.
/// The first failure completes the aggregate with that error; the remaining
/// loads are dropped and their results ignored.
pub async fn load_frame_set<P, F>(provider: &P, sources: &[FrameSource], on_frame: F) -> Result<FrameSet<P::Image>, FrameLoadError>
where
    P: FrameImageProvider,
    F: Fn(usize, usize),
{
    let total = sources.len();
    let loaded = Cell::new(0usize);
    let on_frame = &on_frame;
    let loaded = &loaded;

    // Requests are issued here, before the join polls anything.
    let pending: Vec<_> = sources
        .iter()
        .map(|source| (source, provider.load_image(source)))
        .collect();

    let loads = pending.into_iter().map(|(source, request)| async move {
        let image = request
            .await
            .map_err(|reason| FrameLoadError::Frame {
                index: source.index,
                path: source.path.clone(),
                reason,
            })?;
        loaded.set(loaded.get() + 1);
        on_frame(loaded.get(), total);
        Ok::<_, FrameLoadError>(image)
    });

    let frames = try_join_all(loads).await?;
    FrameSet::new(frames)
}

/// Owner of the frames for one viewer instance.
///
/// The lifecycle is split into [`begin`](Self::begin) and
/// [`finish`](Self::finish) so hosts sharing the store behind a `RefCell`
/// never hold a borrow across the await in between.
pub struct FrameStore<I> {
    state: LoadState,
    started: bool,
    progress: LoadingProgress,
    frames: Option<FrameSet<I>>,
    error: Option<FrameLoadError>,
    on_loaded: Option<Box<dyn FnOnce()>>,
}

impl<I> Default for FrameStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> FrameStore<I> {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            started: false,
            progress: LoadingProgress::default(),
            frames: None,
            error: None,
            on_loaded: None,
        }
    }

    /// Register the callback fired once, when every frame has loaded.
    pub fn set_on_loaded(&mut self, callback: impl FnOnce() + 'static) {
        self.on_loaded = Some(Box::new(callback));
    }

    /// Mark loading as started for `sources`.
    ///
    /// Fails with [`FrameLoadError::AlreadyStarted`] on any second call: a
    /// store loads once per mount.
    pub fn begin(&mut self, sources: &[FrameSource]) -> Result<(), FrameLoadError> {
        if self.started {
            return Err(FrameLoadError::AlreadyStarted);
        }
        self.started = true;
        self.progress = LoadingProgress::new(sources.len());
        log::debug!("loading {} frames", sources.len());
        Ok(())
    }

    /// Record that `loaded` frames have resolved so far.
    pub fn record_progress(&mut self, loaded: usize) {
        if self.state == LoadState::Loading {
            self.progress.loaded = loaded.min(self.progress.total);
        }
    }

    /// Apply the aggregate result. Returns the resulting state.
    ///
    /// Only the first call after [`begin`](Self::begin) has any effect.
    pub fn finish(&mut self, result: Result<FrameSet<I>, FrameLoadError>) -> LoadState {
        if !self.started || self.state != LoadState::Loading {
            return self.state;
        }
        match result {
            Ok(frames) => {
                log::info!("all {} frames loaded", frames.len());
                self.progress.loaded = self.progress.total;
                self.frames = Some(frames);
                self.state = LoadState::Loaded;
                if let Some(callback) = self.on_loaded.take() {
                    callback();
                }
            }
            Err(err) => {
                log::warn!("frame loading failed: {err}");
                self.error = Some(err);
                self.state = LoadState::Failed;
                self.on_loaded = None;
            }
        }
        self.state
    }

    /// Run the full lifecycle against a provider.
    pub async fn load<P>(&mut self, provider: &P, sources: &[FrameSource]) -> Result<(), FrameLoadError>
    where
        P: FrameImageProvider<Image = I>,
    {
        self.begin(sources)?;
        let result = load_frame_set(provider, sources, |_, _| {}).await;
        let err = result.as_ref().err().cloned();
        match self.finish(result) {
            LoadState::Loaded => Ok(()),
            _ => Err(err.unwrap_or(FrameLoadError::Empty)),
        }
    }

    #[inline]
    pub fn state(&self) -> LoadState {
        self.state
    }

    #[inline]
    pub fn progress(&self) -> &LoadingProgress {
        &self.progress
    }

    pub fn error(&self) -> Option<&FrameLoadError> {
        self.error.as_ref()
    }

    /// The loaded frames; `None` until the store is `Loaded`.
    pub fn frames(&self) -> Option<&FrameSet<I>> {
        self.frames.as_ref()
    }
}
