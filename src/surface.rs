//! Pixel surfaces the compositor draws into.
//!
//! [`PixelSurface`] is the only thing the composition engine knows about pixels. The crate ships a
//! CPU implementation ([`CpuSurface`]); a GPU-texture wrapper can implement the same contract.

pub(crate) mod composite;
pub(crate) mod cpu;

use crate::foundation::core::{Canvas, FrameRect, Rgba8Premul};

/// Fixed-size premultiplied RGBA8 buffer with the primitives needed for frame disposal.
///
/// Coordinates handed to [`PixelSurface::blit_over`] are validated upstream against the animation
/// canvas, so out-of-range blits are bugs and implementations panic on them.
pub trait PixelSurface: Sized {
    /// Allocate a surface of `size`, cleared to transparent.
    fn with_size(size: Canvas) -> Self;

    /// Surface dimensions. Never changes after construction.
    fn size(&self) -> Canvas;

    /// Fill the whole surface with `color`.
    fn clear(&mut self, color: Rgba8Premul);

    /// Fill `rect` (clipped to the surface) with `color`, leaving every other pixel untouched.
    fn clear_rect(&mut self, rect: FrameRect, color: Rgba8Premul);

    /// Source-over composite premultiplied RGBA8 `src` (sized to `dest`) at `dest`.
    fn blit_over(&mut self, src: &[u8], dest: FrameRect);

    /// Copy the full content of `other`, which must have the same size.
    fn copy_from(&mut self, other: &Self);

    /// Copy this surface into `other`, allocating it only if it is absent or differently sized.
    fn snapshot_into(&self, other: &mut Option<Self>) {
        if let Some(saved) = other.as_mut()
            && saved.size() == self.size()
        {
            saved.copy_from(self);
            return;
        }
        let mut saved = Self::with_size(self.size());
        saved.copy_from(self);
        *other = Some(saved);
    }

    /// Copy the full content of `other` back into this surface.
    fn restore_from(&mut self, other: &Self) {
        self.copy_from(other);
    }
}

pub use cpu::CpuSurface;
