use std::sync::Arc;

use crate::foundation::core::{Canvas, FrameRect, Rgba8Premul};
use crate::foundation::error::{WeaveError, WeaveResult};

/// How a displayed frame's contribution is undone before the next frame is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Disposal {
    /// Leave the canvas exactly as drawn.
    #[default]
    None,
    /// Clear the frame's rectangle to the background color.
    RestoreBackground,
    /// Restore the canvas to its content from before the frame was drawn.
    RestorePrevious,
}

impl Disposal {
    /// Map a GIF graphic-control disposal code.
    ///
    /// `0` (unspecified) and `1` (keep) both mean [`Disposal::None`]. Codes above `3` are rejected:
    /// they only appear in corrupt or unsupported streams.
    pub fn from_code(code: u8) -> WeaveResult<Self> {
        match code {
            0 | 1 => Ok(Self::None),
            2 => Ok(Self::RestoreBackground),
            3 => Ok(Self::RestorePrevious),
            other => Err(WeaveError::InvalidDisposal(other)),
        }
    }
}

/// Immutable description of a loaded animation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnimationMetadata {
    /// Logical composition surface size.
    pub canvas: Canvas,
    /// Presentation size after pixel-aspect correction. Never larger than `canvas`.
    pub display: Canvas,
    /// Color used on loop restart and for [`Disposal::RestoreBackground`].
    pub background: Rgba8Premul,
    /// Total loops to play; `None` loops forever.
    pub loop_count: Option<u32>,
    /// Number of raw frames. Zero means a static image with nothing to compose.
    pub frame_count: usize,
}

impl AnimationMetadata {
    /// Build metadata with `display == canvas`, normalizing `Some(0)` loop counts to infinite.
    pub fn new(
        canvas: Canvas,
        background: Rgba8Premul,
        loop_count: Option<u32>,
        frame_count: usize,
    ) -> Self {
        Self {
            canvas,
            display: canvas,
            background,
            loop_count: normalize_loop_count(loop_count),
            frame_count,
        }
    }

    /// Replace the presentation size.
    pub fn with_display(mut self, display: Canvas) -> Self {
        self.display = display;
        self
    }

    /// Loop budget with the `Some(0)` case folded into "infinite".
    pub fn effective_loop_count(&self) -> Option<u32> {
        normalize_loop_count(self.loop_count)
    }
}

fn normalize_loop_count(loop_count: Option<u32>) -> Option<u32> {
    loop_count.filter(|&n| n > 0)
}

/// One positioned image fragment as stored in the source, before composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Placement on the canvas.
    pub bounds: FrameRect,
    pub disposal: Disposal,
    /// Display time in milliseconds; `0` marks an invisible intermediate frame.
    pub delay_ms: u32,
    /// Premultiplied RGBA8 sized to `bounds`.
    pub pixels: Arc<Vec<u8>>,
}

impl RawFrame {
    /// Frame filled with a single color; handy for synthetic animations.
    pub fn filled(bounds: FrameRect, color: Rgba8Premul, disposal: Disposal, delay_ms: u32) -> Self {
        let n = (bounds.width() as usize) * (bounds.height() as usize);
        Self {
            bounds,
            disposal,
            delay_ms,
            pixels: Arc::new(color.to_array().repeat(n)),
        }
    }

    /// Check geometry and buffer length against the animation canvas.
    pub fn validate(&self, canvas: Canvas) -> WeaveResult<()> {
        self.bounds.validate_within(canvas)?;
        let expected = (self.bounds.width() as usize)
            .saturating_mul(self.bounds.height() as usize)
            .saturating_mul(4);
        if self.pixels.len() != expected {
            return Err(WeaveError::validation(format!(
                "frame pixels have {} bytes, bounds {:?} need {expected}",
                self.pixels.len(),
                self.bounds
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/anim/model.rs"]
mod tests;
