use crate::foundation::core::{Canvas, FrameRect, Rgba8Premul};
use crate::foundation::error::{WeaveError, WeaveResult};
use crate::foundation::math::unpremul_channel;
use crate::surface::PixelSurface;
use crate::surface::composite::over_row_in_place;

/// Row-major premultiplied RGBA8 surface in system memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuSurface {
    size: Canvas,
    data: Vec<u8>,
}

impl CpuSurface {
    /// Wrap existing premultiplied bytes; the length must match `size`.
    pub fn from_premul_bytes(size: Canvas, data: Vec<u8>) -> WeaveResult<Self> {
        if data.len() != size.byte_len() {
            return Err(WeaveError::validation(format!(
                "surface byte len {} does not match {}x{}",
                data.len(),
                size.width,
                size.height
            )));
        }
        Ok(Self { size, data })
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read one pixel. Panics when `(x, y)` is outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8Premul {
        assert!(
            x < self.size.width && y < self.size.height,
            "pixel ({x}, {y}) outside {}x{} surface",
            self.size.width,
            self.size.height
        );
        let i = self.offset(x, y);
        Rgba8Premul::from_array([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            if a == 255 {
                continue;
            }
            px[0] = unpremul_channel(px[0], a);
            px[1] = unpremul_channel(px[1], a);
            px[2] = unpremul_channel(px[2], a);
        }
        out
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.size.width as usize) + (x as usize)) * 4
    }

    fn row_range(&self, y: u32, left: u32, right: u32) -> std::ops::Range<usize> {
        self.offset(left, y)..self.offset(right, y)
    }
}

impl PixelSurface for CpuSurface {
    fn with_size(size: Canvas) -> Self {
        Self {
            size,
            data: vec![0u8; size.byte_len()],
        }
    }

    fn size(&self) -> Canvas {
        self.size
    }

    fn clear(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    fn clear_rect(&mut self, rect: FrameRect, color: Rgba8Premul) {
        let rect = rect.clip_to(self.size);
        if rect.is_empty() {
            return;
        }
        let px = color.to_array();
        for y in rect.top..rect.bottom {
            let range = self.row_range(y, rect.left, rect.right);
            for d in self.data[range].chunks_exact_mut(4) {
                d.copy_from_slice(&px);
            }
        }
    }

    fn blit_over(&mut self, src: &[u8], dest: FrameRect) {
        assert!(
            dest.right <= self.size.width && dest.bottom <= self.size.height,
            "blit rect {dest:?} outside {}x{} surface",
            self.size.width,
            self.size.height
        );
        let row_bytes = (dest.width() as usize) * 4;
        assert_eq!(
            src.len(),
            row_bytes * (dest.height() as usize),
            "blit source does not match rect {dest:?}"
        );
        if row_bytes == 0 {
            return;
        }
        for (row, y) in src.chunks_exact(row_bytes).zip(dest.top..dest.bottom) {
            let range = self.row_range(y, dest.left, dest.right);
            over_row_in_place(&mut self.data[range], row);
        }
    }

    fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            self.size, other.size,
            "copy_from between differently sized surfaces"
        );
        self.data.copy_from_slice(&other.data);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/cpu.rs"]
mod tests;
