//! Core data structures for frame sets.

use crate::{FrameLoadError, ScrubberConfig};

/// One frame resource to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameSource {
    /// Zero-based position in the rotation
    pub index: usize,
    /// Resolved path (e.g., "/memoji-frames/frame-001.webp")
    pub path: String,
}

impl FrameSource {
    pub fn new(index: usize, path: String) -> Self {
        Self { index, path }
    }

    /// Build the full ordered source list for a config.
    pub fn all(config: &ScrubberConfig) -> Vec<FrameSource> {
        (0..config.total_frames)
            .map(|index| FrameSource::new(index, config.frame_path(index)))
            .collect()
    }
}

/// Ordered frames of a full 360° rotation.
///
/// The index space is circular: the last frame is adjacent to frame 0.
#[derive(Clone, Debug)]
pub struct FrameSet<I> {
    frames: Vec<I>,
}

impl<I> FrameSet<I> {
    pub fn new(frames: Vec<I>) -> Result<Self, FrameLoadError> {
        if frames.is_empty() {
            return Err(FrameLoadError::Empty);
        }
        Ok(Self { frames })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get the frame at a zero-based index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&I> {
        self.frames.get(index)
    }

    /// Get a frame, wrapping the index around the rotation.
    pub fn get_wrapped(&self, index: isize) -> &I {
        let len = self.frames.len() as isize;
        &self.frames[index.rem_euclid(len) as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_follow_config() {
        let config = ScrubberConfig::new(3, "/f/{index}.webp", 0);
        let sources = FrameSource::all(&config);
        assert_eq!(
            sources,
            vec![
                FrameSource::new(0, "/f/001.webp".into()),
                FrameSource::new(1, "/f/002.webp".into()),
                FrameSource::new(2, "/f/003.webp".into()),
            ]
        );
    }

    #[test]
    fn empty_set_is_rejected() {
        assert_eq!(FrameSet::<u8>::new(Vec::new()).unwrap_err(), FrameLoadError::Empty);
    }

    #[test]
    fn wrapped_lookup_is_circular() {
        let set = FrameSet::new(vec!['a', 'b', 'c']).unwrap();
        assert_eq!(*set.get_wrapped(3), 'a');
        assert_eq!(*set.get_wrapped(-1), 'c');
        assert_eq!(set.get(3), None);
    }
}
