use std::sync::Arc;

use crate::anim::model::{AnimationMetadata, RawFrame};
use crate::foundation::core::Canvas;
use crate::foundation::error::{WeaveError, WeaveResult};

/// Container decoder contract: whole-animation metadata plus random access to raw frames.
pub trait ImageCodec {
    /// Metadata decoded once at load time.
    fn metadata(&self) -> AnimationMetadata;

    /// Number of raw frames the source declares.
    fn frame_count(&self) -> usize;

    /// Decode raw frame `index`. Fails with [`WeaveError::Decode`] for out-of-range indices or
    /// corrupt data.
    fn frame(&mut self, index: usize) -> WeaveResult<RawFrame>;
}

/// Indexable supply of raw frames as the compositor consumes them.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    fn frame(&mut self, index: usize) -> WeaveResult<Arc<RawFrame>>;
}

/// Options for [`FrameStore`].
#[derive(Clone, Copy, Debug)]
pub struct FrameStoreOpts {
    /// Keep decoded frames for later loops instead of decoding them again.
    pub cache_frames: bool,
}

impl Default for FrameStoreOpts {
    fn default() -> Self {
        Self { cache_frames: true }
    }
}

/// Lazily materialized frame sequence backed by an [`ImageCodec`].
///
/// Frames are validated against the canvas when first produced, so everything handed to the
/// compositor is in bounds.
pub struct FrameStore<C> {
    codec: C,
    canvas: Canvas,
    opts: FrameStoreOpts,
    cache: Vec<Option<Arc<RawFrame>>>,
    decode_counts: Vec<u32>,
}

impl<C: ImageCodec> FrameStore<C> {
    pub fn new(codec: C) -> Self {
        Self::with_opts(codec, FrameStoreOpts::default())
    }

    pub fn with_opts(codec: C, opts: FrameStoreOpts) -> Self {
        let canvas = codec.metadata().canvas;
        let n = codec.frame_count();
        Self {
            codec,
            canvas,
            opts,
            cache: vec![None; n],
            decode_counts: vec![0; n],
        }
    }

    pub fn metadata(&self) -> AnimationMetadata {
        self.codec.metadata()
    }

    /// How many times frame `index` went through the codec.
    pub fn decode_count(&self, index: usize) -> u32 {
        self.decode_counts.get(index).copied().unwrap_or(0)
    }

    /// Drop every cached frame.
    pub fn clear_cache(&mut self) {
        self.cache.iter_mut().for_each(|slot| *slot = None);
    }
}

impl<C: ImageCodec> FrameSource for FrameStore<C> {
    fn frame_count(&self) -> usize {
        self.cache.len()
    }

    fn frame(&mut self, index: usize) -> WeaveResult<Arc<RawFrame>> {
        let Some(slot) = self.cache.get(index) else {
            return Err(WeaveError::decode(format!(
                "frame index {index} out of range (frame_count {})",
                self.cache.len()
            )));
        };
        if let Some(frame) = slot {
            return Ok(Arc::clone(frame));
        }

        self.decode_counts[index] = self.decode_counts[index].saturating_add(1);
        let frame = self.codec.frame(index)?;
        frame
            .validate(self.canvas)
            .map_err(|e| WeaveError::decode(format!("frame {index}: {e}")))?;
        tracing::trace!(index, bounds = ?frame.bounds, delay_ms = frame.delay_ms, "decoded raw frame");

        let frame = Arc::new(frame);
        if self.opts.cache_frames {
            self.cache[index] = Some(Arc::clone(&frame));
        }
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/anim/store.rs"]
mod tests;
