use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{WeaveError, WeaveResult};
use crate::render::backend::{FrameRGBA, Presenter, fit_rect};
use crate::surface::{CpuSurface, PixelSurface};

/// Options for [`CpuPresenter`].
#[derive(Clone, Copy, Debug)]
pub struct CpuPresenterOpts {
    /// Output area in pixels.
    pub output: Canvas,
    /// Straight RGBA8 color painted around the letterboxed image.
    pub backdrop_rgba: [u8; 4],
}

impl Default for CpuPresenterOpts {
    fn default() -> Self {
        Self {
            output: Canvas {
                width: 640,
                height: 480,
            },
            backdrop_rgba: [0, 0, 0, 255],
        }
    }
}

/// Software presenter: letterboxes the canvas into an output pixmap with `vello_cpu`.
///
/// The render context and target pixmap are the "device resources"; [`Presenter::recreate`]
/// drops them and they are rebuilt on the next present.
pub struct CpuPresenter {
    opts: CpuPresenterOpts,
    ctx: Option<vello_cpu::RenderContext>,
    target: Option<vello_cpu::Pixmap>,
    last: Option<FrameRGBA>,
    presented: u64,
}

impl CpuPresenter {
    pub fn new(opts: CpuPresenterOpts) -> WeaveResult<Self> {
        output_dims(opts.output)?;
        Ok(Self {
            opts,
            ctx: None,
            target: None,
            last: None,
            presented: 0,
        })
    }

    /// The most recently presented output frame.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last.as_ref()
    }

    /// Number of successful presents since construction.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Presenter for CpuPresenter {
    fn present(&mut self, surface: &CpuSurface, display: Canvas) -> WeaveResult<()> {
        let (width, height) = output_dims(self.opts.output)?;
        let mut ctx = self
            .ctx
            .take()
            .unwrap_or_else(|| vello_cpu::RenderContext::new(width, height));
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = self.opts.backdrop_rgba;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        let size = surface.size();
        let dest = fit_rect(display, self.opts.output);
        if !size.is_empty() && dest.area() > 0.0 {
            let pixmap = pixmap_from_surface(surface)?;
            let paint = vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            };
            let transform = kurbo::Affine::translate((dest.x0, dest.y0))
                * kurbo::Affine::scale_non_uniform(
                    dest.width() / f64::from(size.width),
                    dest.height() / f64::from(size.height),
                );
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(size.width),
                f64::from(size.height),
            ));
        }

        let mut target = self
            .target
            .take()
            .unwrap_or_else(|| vello_cpu::Pixmap::new(width, height));
        ctx.flush();
        ctx.render_to_pixmap(&mut target);

        self.last = Some(FrameRGBA {
            width: u32::from(width),
            height: u32::from(height),
            data: target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        });
        self.ctx = Some(ctx);
        self.target = Some(target);
        self.presented = self.presented.saturating_add(1);
        Ok(())
    }

    fn recreate(&mut self) -> WeaveResult<()> {
        tracing::debug!("dropping cpu presenter resources");
        self.ctx = None;
        self.target = None;
        Ok(())
    }
}

fn output_dims(output: Canvas) -> WeaveResult<(u16, u16)> {
    let w: u16 = output
        .width
        .try_into()
        .map_err(|_| WeaveError::validation("output width exceeds u16"))?;
    let h: u16 = output
        .height
        .try_into()
        .map_err(|_| WeaveError::validation("output height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(WeaveError::validation("output size must be non-zero"));
    }
    Ok((w, h))
}

fn pixmap_from_surface(surface: &CpuSurface) -> WeaveResult<vello_cpu::Pixmap> {
    let w: u16 = surface
        .width()
        .try_into()
        .map_err(|_| WeaveError::validation("canvas width exceeds u16"))?;
    let h: u16 = surface
        .height()
        .try_into()
        .map_err(|_| WeaveError::validation("canvas height exceeds u16"))?;
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(usize::from(w) * usize::from(h));
    for px in surface.data().chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
