use crate::anim::model::{AnimationMetadata, Disposal};
use crate::anim::store::FrameSource;
use crate::foundation::core::FrameRect;
use crate::foundation::error::WeaveResult;
use crate::surface::{CpuSurface, PixelSurface};

/// Lifecycle of a [`Compositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// More composed frames can be produced.
    Ready,
    /// The loop budget is spent; the canvas stays on the last frame.
    Finished,
}

/// Outcome of one [`Compositor::step`].
#[derive(Debug)]
pub struct StepResult<'a, S> {
    /// The composed canvas to present.
    pub surface: &'a S,
    /// How long the composed frame stays visible.
    pub delay_ms: u32,
    /// No further step will change the canvas.
    pub finished: bool,
}

/// Frame composition state machine.
///
/// Owns the canvas and the snapshot used for [`Disposal::RestorePrevious`]. Each call to
/// [`Compositor::step`] undoes the visible frame's disposal, overlays the next raw frame(s) and
/// reports how long to show the result. Runs of zero-delay frames are folded into a single step;
/// the last frame of a loop is always shown.
///
/// There is no partial reset. Rebuild the compositor to restart from frame 0.
pub struct Compositor<S = CpuSurface> {
    metadata: AnimationMetadata,
    canvas: S,
    saved: Option<S>,

    next_index: usize,
    loop_number: u32,
    pending_disposal: Disposal,
    visible_bounds: FrameRect,
    last_delay_ms: u32,
    status: EngineStatus,
}

impl<S: PixelSurface> Compositor<S> {
    /// Create the engine for a freshly loaded animation, canvas cleared to background.
    pub fn new(metadata: &AnimationMetadata) -> Self {
        let mut canvas = S::with_size(metadata.canvas);
        canvas.clear(metadata.background);
        Self {
            metadata: metadata.clone(),
            canvas,
            saved: None,
            next_index: 0,
            loop_number: 0,
            pending_disposal: Disposal::None,
            visible_bounds: FrameRect::default(),
            last_delay_ms: 0,
            status: EngineStatus::Ready,
        }
    }

    pub fn metadata(&self) -> &AnimationMetadata {
        &self.metadata
    }

    /// The composed canvas as of the last step.
    pub fn canvas(&self) -> &S {
        &self.canvas
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == EngineStatus::Finished
    }

    /// Raw frame index the next overlay will draw.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Loop restarts observed so far (1 while the first loop plays).
    pub fn loop_number(&self) -> u32 {
        self.loop_number
    }

    /// Disposal to apply before the next overlay.
    pub fn pending_disposal(&self) -> Disposal {
        self.pending_disposal
    }

    /// Whether the restore-previous snapshot has been allocated.
    pub fn has_saved_snapshot(&self) -> bool {
        self.saved.is_some()
    }

    /// Advance by exactly one displayed composed frame.
    ///
    /// Codec failures propagate unchanged; the engine does not retry. After the loop budget is
    /// spent every call returns the frozen canvas with `finished = true` and mutates nothing.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn step<F: FrameSource + ?Sized>(
        &mut self,
        frames: &mut F,
    ) -> WeaveResult<StepResult<'_, S>> {
        let frame_count = self.metadata.frame_count;
        if self.is_finished() || frame_count == 0 {
            self.status = EngineStatus::Finished;
            return Ok(self.result());
        }

        self.dispose_current();
        self.overlay_next(frames)?;
        while self.last_delay_ms == 0 && !self.is_last_frame() {
            self.dispose_current();
            self.overlay_next(frames)?;
        }

        if self.end_of_animation() {
            tracing::debug!(loop_number = self.loop_number, "animation finished");
            self.status = EngineStatus::Finished;
        }
        Ok(self.result())
    }

    /// Pass over the raw frame the next overlay would draw, after it failed to decode.
    ///
    /// The disposal of the visible frame has already been applied by the failed step. Skipping
    /// frame 0 still starts a new loop, so the canvas is cleared and the loop budget is charged.
    /// Returns whether the animation is finished afterwards.
    pub fn skip_frame(&mut self) -> bool {
        let frame_count = self.metadata.frame_count;
        if self.is_finished() || frame_count == 0 {
            return self.is_finished();
        }

        let index = self.next_index;
        if index == 0 {
            self.canvas.clear(self.metadata.background);
            self.loop_number = self.loop_number.saturating_add(1);
        }
        self.pending_disposal = Disposal::None;
        self.next_index = (index + 1) % frame_count;
        tracing::debug!(index, loop_number = self.loop_number, "skipped raw frame");

        if self.end_of_animation() {
            self.status = EngineStatus::Finished;
        }
        self.is_finished()
    }

    fn result(&self) -> StepResult<'_, S> {
        StepResult {
            surface: &self.canvas,
            delay_ms: self.last_delay_ms,
            finished: self.is_finished(),
        }
    }

    fn is_last_frame(&self) -> bool {
        self.next_index == 0
    }

    // A single frame has nothing further to schedule, whatever the loop budget says.
    fn end_of_animation(&self) -> bool {
        if self.metadata.frame_count == 1 {
            return true;
        }
        match self.metadata.effective_loop_count() {
            Some(total) => self.is_last_frame() && self.loop_number == total,
            None => false,
        }
    }

    fn dispose_current(&mut self) {
        match self.pending_disposal {
            Disposal::None => {}
            Disposal::RestoreBackground => {
                self.canvas
                    .clear_rect(self.visible_bounds, self.metadata.background);
            }
            // The snapshot is taken before any restore-previous frame is drawn.
            Disposal::RestorePrevious => {
                if let Some(saved) = self.saved.as_ref() {
                    self.canvas.restore_from(saved);
                }
            }
        }
    }

    fn overlay_next<F: FrameSource + ?Sized>(&mut self, frames: &mut F) -> WeaveResult<()> {
        let index = self.next_index;
        let frame = frames.frame(index)?;

        if frame.disposal == Disposal::RestorePrevious {
            self.canvas.snapshot_into(&mut self.saved);
        }

        if index == 0 {
            self.canvas.clear(self.metadata.background);
            self.loop_number = self.loop_number.saturating_add(1);
        }

        self.canvas.blit_over(&frame.pixels, frame.bounds);

        self.pending_disposal = frame.disposal;
        self.visible_bounds = frame.bounds;
        self.last_delay_ms = frame.delay_ms;
        self.next_index = (index + 1) % self.metadata.frame_count;

        tracing::trace!(
            index,
            delay_ms = frame.delay_ms,
            disposal = ?frame.disposal,
            "overlaid raw frame"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/engine.rs"]
mod tests;
