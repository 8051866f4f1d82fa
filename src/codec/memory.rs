use crate::anim::model::{AnimationMetadata, RawFrame};
use crate::anim::store::ImageCodec;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{WeaveError, WeaveResult};

/// Codec over frames that are already decoded, for programmatic animations and tests.
#[derive(Clone, Debug)]
pub struct MemoryCodec {
    metadata: AnimationMetadata,
    frames: Vec<RawFrame>,
}

impl MemoryCodec {
    pub fn new(canvas: Canvas, background: Rgba8Premul, loop_count: Option<u32>) -> Self {
        Self {
            metadata: AnimationMetadata::new(canvas, background, loop_count, 0),
            frames: Vec::new(),
        }
    }

    /// Append a frame, builder style.
    pub fn with_frame(mut self, frame: RawFrame) -> Self {
        self.push_frame(frame);
        self
    }

    pub fn push_frame(&mut self, frame: RawFrame) {
        self.frames.push(frame);
        self.metadata.frame_count = self.frames.len();
    }

    /// Override the presentation size.
    pub fn with_display(mut self, display: Canvas) -> Self {
        self.metadata.display = display;
        self
    }
}

impl ImageCodec for MemoryCodec {
    fn metadata(&self) -> AnimationMetadata {
        self.metadata.clone()
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&mut self, index: usize) -> WeaveResult<RawFrame> {
        self.frames
            .get(index)
            .cloned()
            .ok_or_else(|| WeaveError::decode(format!("no frame at index {index}")))
    }
}
