use crate::foundation::core::Canvas;
use crate::foundation::error::WeaveResult;
use crate::surface::CpuSurface;

/// A presented output frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Draws composed canvases to an output.
///
/// The playback driver calls [`Presenter::present`] after every step. A presenter that loses its
/// device reports [`WeaveError::RenderBackendLost`](crate::WeaveError::RenderBackendLost); the
/// driver then calls [`Presenter::recreate`] and restarts the animation.
pub trait Presenter {
    /// Draw `surface`, whose intended on-screen size is `display`.
    fn present(&mut self, surface: &CpuSurface, display: Canvas) -> WeaveResult<()>;

    /// Discard and rebuild device resources.
    fn recreate(&mut self) -> WeaveResult<()>;
}

/// Compute where an image of size `display` lands inside `output`.
///
/// The image is centered at its natural size when it fits. When the output is smaller along an
/// axis the image is scaled down to that axis, preserving aspect ratio. It is never enlarged.
pub fn fit_rect(display: Canvas, output: Canvas) -> kurbo::Rect {
    let (dw, dh) = (f64::from(display.width), f64::from(display.height));
    let (ow, oh) = (f64::from(output.width), f64::from(output.height));
    if dw <= 0.0 || dh <= 0.0 {
        return kurbo::Rect::ZERO;
    }

    let mut rect = kurbo::Rect::from_origin_size(((ow - dw) / 2.0, (oh - dh) / 2.0), (dw, dh));
    let aspect = dw / dh;

    if rect.x0 < 0.0 {
        let w = ow;
        let h = w / aspect;
        rect = kurbo::Rect::from_origin_size((0.0, (oh - h) / 2.0), (w, h));
    }
    if rect.y0 < 0.0 {
        let h = oh;
        let w = h * aspect;
        rect = kurbo::Rect::from_origin_size(((ow - w) / 2.0, 0.0), (w, h));
    }
    rect
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
