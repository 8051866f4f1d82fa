use crate::foundation::error::{WeaveError, WeaveResult};
use crate::foundation::math::mul_div255_u8;

/// Pixel dimensions of a surface or presentation area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Number of bytes a tightly packed RGBA8 buffer of this size occupies.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned pixel rectangle, half-open: `[left, right) x [top, bottom)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl FrameRect {
    /// Build a rectangle from an origin and a size.
    pub fn from_origin_size(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
        }
    }

    /// Rectangle covering the whole canvas.
    pub fn full(canvas: Canvas) -> Self {
        Self::from_origin_size(0, 0, canvas.width, canvas.height)
    }

    pub fn width(self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Return `true` when `(x, y)` lies inside the rectangle.
    pub fn contains(self, x: u32, y: u32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }

    /// Intersect with the canvas bounds.
    pub fn clip_to(self, canvas: Canvas) -> Self {
        let right = self.right.min(canvas.width);
        let bottom = self.bottom.min(canvas.height);
        Self {
            left: self.left.min(right),
            top: self.top.min(bottom),
            right,
            bottom,
        }
    }

    /// Check `0 <= left < right <= width` (and the vertical analogue).
    pub fn validate_within(self, canvas: Canvas) -> WeaveResult<()> {
        if self.left >= self.right || self.top >= self.bottom {
            return Err(WeaveError::validation(format!(
                "frame rect {self:?} is empty or inverted"
            )));
        }
        if self.right > canvas.width || self.bottom > canvas.height {
            return Err(WeaveError::validation(format!(
                "frame rect {self:?} exceeds canvas {}x{}",
                canvas.width, canvas.height
            )));
        }
        Ok(())
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Opaque color from straight RGB.
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let alpha = u16::from(a);
        Self {
            r: mul_div255_u8(u16::from(r), alpha),
            g: mul_div255_u8(u16::from(g), alpha),
            b: mul_div255_u8(u16::from(b), alpha),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(px: [u8; 4]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }
}

/// Premultiply a straight-alpha RGBA8 buffer in place.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let [r, g, b, a] = [px[0], px[1], px[2], px[3]];
        px.copy_from_slice(&Rgba8Premul::from_straight_rgba(r, g, b, a).to_array());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
