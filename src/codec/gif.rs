use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::anim::model::{AnimationMetadata, Disposal, RawFrame};
use crate::anim::store::ImageCodec;
use crate::foundation::core::{Canvas, FrameRect, Rgba8Premul};
use crate::foundation::error::{WeaveError, WeaveResult};

/// Offset of the pixel-aspect-ratio byte: 6-byte signature, then the logical screen descriptor.
const ASPECT_RATIO_OFFSET: usize = 12;

/// Options for [`GifCodec`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GifCodecOpts {
    /// Raise every frame delay below this value to it.
    ///
    /// Browsers clamp tiny delays (90 ms is the usual figure). Enabling this makes zero-delay
    /// intermediate frames visible instead of coalesced.
    pub min_delay_ms: Option<u32>,
}

impl GifCodecOpts {
    /// Read `GIFWEAVE_MIN_DELAY_MS`; unset, unparsable or zero leaves delays untouched.
    pub fn from_env() -> Self {
        let min_delay_ms = std::env::var("GIFWEAVE_MIN_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| n > 0);
        Self { min_delay_ms }
    }
}

/// GIF container decoder producing premultiplied raw frames.
///
/// The LZW stream is decoded once on open and frames are kept as palette indices. Expansion to
/// premultiplied RGBA, disposal mapping and delay scaling happen when a frame is requested.
pub struct GifCodec {
    metadata: AnimationMetadata,
    global_palette: Option<Vec<u8>>,
    frames: Vec<IndexedFrame>,
    opts: GifCodecOpts,
}

/// One decoded frame before color expansion.
struct IndexedFrame {
    bounds: FrameRect,
    delay_cs: u16,
    /// Raw 3-bit field from the graphic control extension.
    disposal_code: u8,
    transparent: Option<u8>,
    palette: Option<Vec<u8>>,
    indices: Vec<u8>,
}

impl GifCodec {
    /// Read and decode a GIF file.
    pub fn open(path: impl AsRef<Path>, opts: GifCodecOpts) -> WeaveResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read gif '{}'", path.display()))?;
        Self::from_bytes(&bytes, opts)
    }

    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8], opts: GifCodecOpts) -> WeaveResult<Self> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        let mut decoder = options
            .read_info(Cursor::new(bytes))
            .map_err(|e| WeaveError::decode(format!("read gif header: {e}")))?;

        // `gif` folds unknown disposal codes into "unspecified"; keep the raw ones.
        let disposal_codes = disposal_codes(bytes);

        let mut frames = Vec::new();
        while let Some(frame) = decoder
            .read_next_frame()
            .map_err(|e| WeaveError::decode(format!("gif frame {}: {e}", frames.len())))?
        {
            let disposal_code = disposal_codes
                .get(frames.len())
                .copied()
                .unwrap_or(frame.dispose as u8);
            frames.push(IndexedFrame {
                bounds: FrameRect::from_origin_size(
                    u32::from(frame.left),
                    u32::from(frame.top),
                    u32::from(frame.width),
                    u32::from(frame.height),
                ),
                delay_cs: frame.delay,
                disposal_code,
                transparent: frame.transparent,
                palette: frame.palette.clone(),
                indices: frame.buffer.to_vec(),
            });
        }

        let canvas = Canvas {
            width: u32::from(decoder.width()),
            height: u32::from(decoder.height()),
        };
        let global_palette = decoder.global_palette().map(<[u8]>::to_vec);
        let background = background_color(global_palette.as_deref(), decoder.bg_color());
        let loop_count = loop_count(decoder.repeat());
        let display = display_size(canvas, bytes.get(ASPECT_RATIO_OFFSET).copied());

        let metadata = AnimationMetadata::new(canvas, background, loop_count, frames.len())
            .with_display(display);
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            frames = frames.len(),
            ?loop_count,
            "loaded gif"
        );

        Ok(Self {
            metadata,
            global_palette,
            frames,
            opts,
        })
    }
}

impl ImageCodec for GifCodec {
    fn metadata(&self) -> AnimationMetadata {
        self.metadata.clone()
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&mut self, index: usize) -> WeaveResult<RawFrame> {
        let frame = self.frames.get(index).ok_or_else(|| {
            WeaveError::decode(format!(
                "gif frame index {index} out of range (frame_count {})",
                self.frames.len()
            ))
        })?;

        let disposal = Disposal::from_code(frame.disposal_code)?;

        let mut delay_ms = u32::from(frame.delay_cs) * 10;
        if let Some(min) = self.opts.min_delay_ms {
            delay_ms = delay_ms.max(min);
        }

        let palette = frame
            .palette
            .as_deref()
            .or(self.global_palette.as_deref())
            .ok_or_else(|| WeaveError::decode(format!("gif frame {index}: no color table")))?;
        let pixels = expand_indexed(&frame.indices, palette, frame.transparent)
            .map_err(|e| WeaveError::decode(format!("gif frame {index}: {e}")))?;

        Ok(RawFrame {
            bounds: frame.bounds,
            disposal,
            delay_ms,
            pixels: Arc::new(pixels),
        })
    }
}

/// Expand palette indices to premultiplied RGBA8. Palette colors are opaque, so only the
/// transparent index needs premultiplying.
fn expand_indexed(
    indices: &[u8],
    palette: &[u8],
    transparent: Option<u8>,
) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(indices.len() * 4);
    for &index in indices {
        if transparent == Some(index) {
            out.extend_from_slice(&Rgba8Premul::transparent().to_array());
            continue;
        }
        let at = usize::from(index) * 3;
        match palette.get(at..at + 3) {
            Some(&[r, g, b]) => out.extend_from_slice(&[r, g, b, 255]),
            _ => {
                return Err(format!(
                    "color index {index} outside {}-entry table",
                    palette.len() / 3
                ));
            }
        }
    }
    Ok(out)
}

const EXTENSION_INTRODUCER: u8 = 0x21;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const IMAGE_SEPARATOR: u8 = 0x2C;
/// Signature plus logical screen descriptor.
const HEADER_LEN: usize = 13;
const SCREEN_FLAGS_OFFSET: usize = 10;

/// Walk the block stream and collect each image's raw disposal code (0 when it has no graphic
/// control extension). Stops quietly at the trailer or at anything malformed; the decoder has
/// already reported real stream errors.
pub(crate) fn disposal_codes(bytes: &[u8]) -> Vec<u8> {
    let mut codes = Vec::new();
    let Some(&flags) = bytes.get(SCREEN_FLAGS_OFFSET) else {
        return codes;
    };
    let mut pos = HEADER_LEN + color_table_len(flags);
    let mut pending = 0u8;

    while let Some(&block) = bytes.get(pos) {
        match block {
            EXTENSION_INTRODUCER => {
                let Some(&label) = bytes.get(pos + 1) else {
                    break;
                };
                if label == GRAPHIC_CONTROL_LABEL
                    && let Some(&packed) = bytes.get(pos + 3)
                {
                    pending = (packed >> 2) & 0b111;
                }
                let Some(next) = skip_sub_blocks(bytes, pos + 2) else {
                    break;
                };
                pos = next;
            }
            IMAGE_SEPARATOR => {
                // 10-byte descriptor, optional local table, LZW minimum code size.
                let Some(&packed) = bytes.get(pos + 9) else {
                    break;
                };
                codes.push(std::mem::take(&mut pending));
                let data = pos + 10 + color_table_len(packed) + 1;
                let Some(next) = skip_sub_blocks(bytes, data) else {
                    break;
                };
                pos = next;
            }
            _ => break,
        }
    }
    codes
}

fn color_table_len(flags: u8) -> usize {
    if flags & 0x80 == 0 {
        0
    } else {
        3 << ((flags & 0x07) + 1)
    }
}

/// Return the offset just past a run of data sub-blocks and its terminator.
fn skip_sub_blocks(bytes: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = usize::from(*bytes.get(pos)?);
        pos += 1;
        if len == 0 {
            return Some(pos);
        }
        pos += len;
    }
}

/// Look up the declared background index in the global color table.
///
/// Any missing piece yields transparent: a bad background entry should not fail the load.
pub(crate) fn background_color(
    global_palette: Option<&[u8]>,
    bg_index: Option<usize>,
) -> Rgba8Premul {
    let Some(palette) = global_palette else {
        tracing::debug!("no global color table; background is transparent");
        return Rgba8Premul::transparent();
    };
    let Some(index) = bg_index else {
        tracing::debug!("no background index; background is transparent");
        return Rgba8Premul::transparent();
    };
    match palette.get(index * 3..index * 3 + 3) {
        Some(&[r, g, b]) => Rgba8Premul::opaque(r, g, b),
        _ => {
            tracing::debug!(
                index,
                entries = palette.len() / 3,
                "background index outside global color table; background is transparent"
            );
            Rgba8Premul::transparent()
        }
    }
}

/// Convert the looping extension into a total loop budget.
///
/// The extension stores *repeats* after the first pass, with `0` meaning forever. `gif` reports
/// a missing extension as `Finite(0)`, which also plays forever here.
pub(crate) fn loop_count(repeat: gif::Repeat) -> Option<u32> {
    match repeat {
        gif::Repeat::Infinite | gif::Repeat::Finite(0) => None,
        gif::Repeat::Finite(n) => Some(u32::from(n) + 1),
    }
}

/// Apply the descriptor's pixel aspect ratio, shrinking only.
///
/// A non-zero byte `b` encodes `(b + 15) / 64`, from 4:1 wide down to 1:4 tall.
pub(crate) fn display_size(canvas: Canvas, aspect_byte: Option<u8>) -> Canvas {
    let b = match aspect_byte {
        None | Some(0) => return canvas,
        Some(b) => b,
    };
    let ratio = (f32::from(b) + 15.0) / 64.0;
    if ratio > 1.0 {
        Canvas {
            width: canvas.width,
            height: (canvas.height as f32 / ratio) as u32,
        }
    } else {
        Canvas {
            width: (canvas.width as f32 * ratio) as u32,
            height: canvas.height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/gif.rs"]
mod tests;
