use std::borrow::Cow;

use super::*;

const PALETTE: [u8; 12] = [0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255];

struct FrameSpec {
    rect: (u16, u16, u16, u16),
    index: u8,
    delay_cs: u16,
    dispose: gif::DisposalMethod,
}

fn encode(w: u16, h: u16, repeat: Option<gif::Repeat>, frames: &[FrameSpec]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut buf, w, h, &PALETTE).unwrap();
        if let Some(r) = repeat {
            enc.set_repeat(r).unwrap();
        }
        for f in frames {
            let (left, top, fw, fh) = f.rect;
            let frame = gif::Frame {
                left,
                top,
                width: fw,
                height: fh,
                delay: f.delay_cs,
                dispose: f.dispose,
                buffer: Cow::Owned(vec![f.index; usize::from(fw) * usize::from(fh)]),
                ..gif::Frame::default()
            };
            enc.write_frame(&frame).unwrap();
        }
    }
    buf
}

fn two_frames() -> Vec<FrameSpec> {
    vec![
        FrameSpec {
            rect: (0, 0, 4, 4),
            index: 1,
            delay_cs: 10,
            dispose: gif::DisposalMethod::Keep,
        },
        FrameSpec {
            rect: (1, 2, 2, 1),
            index: 3,
            delay_cs: 0,
            dispose: gif::DisposalMethod::Background,
        },
    ]
}

#[test]
fn decodes_geometry_delay_and_disposal() {
    let bytes = encode(4, 4, Some(gif::Repeat::Infinite), &two_frames());
    let mut codec = GifCodec::from_bytes(&bytes, GifCodecOpts::default()).unwrap();

    let meta = codec.metadata();
    assert_eq!(
        meta.canvas,
        Canvas {
            width: 4,
            height: 4
        }
    );
    assert_eq!(meta.display, meta.canvas);
    assert_eq!(meta.frame_count, 2);
    assert_eq!(meta.loop_count, None);
    assert_eq!(meta.background, Rgba8Premul::opaque(0, 0, 0));

    let f0 = codec.frame(0).unwrap();
    assert_eq!(f0.bounds, FrameRect::from_origin_size(0, 0, 4, 4));
    assert_eq!(f0.delay_ms, 100);
    assert_eq!(f0.disposal, Disposal::None);
    assert_eq!(&f0.pixels[0..4], &[255, 0, 0, 255]);

    let f1 = codec.frame(1).unwrap();
    assert_eq!(f1.bounds, FrameRect::from_origin_size(1, 2, 2, 1));
    assert_eq!(f1.delay_ms, 0);
    assert_eq!(f1.disposal, Disposal::RestoreBackground);
    assert_eq!(f1.pixels.len(), 2 * 4);
    assert_eq!(&f1.pixels[4..8], &[0, 0, 255, 255]);

    assert!(codec.frame(2).unwrap_err().is_decode());
}

#[test]
fn finite_repeat_becomes_total_loops() {
    let bytes = encode(4, 4, Some(gif::Repeat::Finite(2)), &two_frames());
    let codec = GifCodec::from_bytes(&bytes, GifCodecOpts::default()).unwrap();
    assert_eq!(codec.metadata().loop_count, Some(3));
}

#[test]
fn missing_loop_extension_loops_forever() {
    let bytes = encode(4, 4, None, &two_frames());
    let codec = GifCodec::from_bytes(&bytes, GifCodecOpts::default()).unwrap();
    assert_eq!(codec.metadata().loop_count, None);
}

#[test]
fn min_delay_clamps_zero_delay_frames() {
    let bytes = encode(4, 4, None, &two_frames());
    let mut codec = GifCodec::from_bytes(
        &bytes,
        GifCodecOpts {
            min_delay_ms: Some(90),
        },
    )
    .unwrap();
    assert_eq!(codec.frame(0).unwrap().delay_ms, 100);
    assert_eq!(codec.frame(1).unwrap().delay_ms, 90);
}

#[test]
fn background_index_is_looked_up_in_global_table() {
    let mut bytes = encode(4, 4, None, &two_frames());
    bytes[11] = 2;
    let codec = GifCodec::from_bytes(&bytes, GifCodecOpts::default()).unwrap();
    assert_eq!(codec.metadata().background, Rgba8Premul::opaque(0, 255, 0));
}

#[test]
fn background_falls_back_to_transparent() {
    assert_eq!(
        background_color(None, Some(1)),
        Rgba8Premul::transparent()
    );
    assert_eq!(
        background_color(Some(&PALETTE), None),
        Rgba8Premul::transparent()
    );
    assert_eq!(
        background_color(Some(&PALETTE), Some(4)),
        Rgba8Premul::transparent()
    );
    assert_eq!(
        background_color(Some(&PALETTE), Some(3)),
        Rgba8Premul::opaque(0, 0, 255)
    );
}

#[test]
fn loop_count_mapping() {
    assert_eq!(loop_count(gif::Repeat::Infinite), None);
    assert_eq!(loop_count(gif::Repeat::Finite(0)), None);
    assert_eq!(loop_count(gif::Repeat::Finite(1)), Some(2));
}

#[test]
fn aspect_ratio_only_shrinks() {
    let canvas = Canvas {
        width: 128,
        height: 128,
    };
    assert_eq!(display_size(canvas, None), canvas);
    assert_eq!(display_size(canvas, Some(0)), canvas);
    // (49 + 15) / 64 == 1.0
    assert_eq!(display_size(canvas, Some(49)), canvas);
    // ratio 2.0: wide pixels, height shrinks
    assert_eq!(
        display_size(canvas, Some(113)),
        Canvas {
            width: 128,
            height: 64
        }
    );
    // ratio 0.5: tall pixels, width shrinks
    assert_eq!(
        display_size(canvas, Some(17)),
        Canvas {
            width: 64,
            height: 128
        }
    );
}

#[test]
fn aspect_byte_is_read_from_screen_descriptor() {
    let mut bytes = encode(4, 4, None, &two_frames());
    bytes[ASPECT_RATIO_OFFSET] = 113;
    let codec = GifCodec::from_bytes(&bytes, GifCodecOpts::default()).unwrap();
    assert_eq!(
        codec.metadata().display,
        Canvas {
            width: 4,
            height: 2
        }
    );
}

#[test]
fn garbage_is_a_decode_error() {
    let err = GifCodec::from_bytes(b"not a gif", GifCodecOpts::default())
        .err()
        .unwrap();
    assert!(err.is_decode());
}

/// Offsets of the packed byte of every graphic control extension.
fn gce_packed_offsets(bytes: &[u8]) -> Vec<usize> {
    bytes
        .windows(3)
        .enumerate()
        .filter(|(_, w)| *w == [0x21, 0xF9, 0x04])
        .map(|(i, _)| i + 3)
        .collect()
}

#[test]
fn raw_disposal_codes_are_read_per_image() {
    let bytes = encode(4, 4, Some(gif::Repeat::Infinite), &two_frames());
    assert_eq!(disposal_codes(&bytes), vec![1, 2]);
}

#[test]
fn unknown_disposal_code_is_rejected() {
    let mut bytes = encode(4, 4, None, &two_frames());
    let offsets = gce_packed_offsets(&bytes);
    assert_eq!(offsets.len(), 2);
    let at = offsets[1];
    bytes[at] = (bytes[at] & !0b0001_1100) | (5 << 2);

    let mut codec = GifCodec::from_bytes(&bytes, GifCodecOpts::default()).unwrap();
    assert_eq!(codec.frame(0).unwrap().disposal, Disposal::None);
    assert!(matches!(
        codec.frame(1),
        Err(WeaveError::InvalidDisposal(5))
    ));
}

#[test]
fn local_palette_and_transparent_index_are_expanded() {
    let mut buf = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut buf, 3, 1, &PALETTE).unwrap();
        let frame = gif::Frame {
            width: 3,
            height: 1,
            delay: 2,
            transparent: Some(0),
            palette: Some(vec![9, 9, 9, 10, 20, 30, 40, 50, 60, 0, 0, 0]),
            buffer: Cow::Owned(vec![1, 0, 2]),
            ..gif::Frame::default()
        };
        enc.write_frame(&frame).unwrap();
    }

    let mut codec = GifCodec::from_bytes(&buf, GifCodecOpts::default()).unwrap();
    let f = codec.frame(0).unwrap();
    assert_eq!(
        f.pixels.as_slice(),
        &[10, 20, 30, 255, 0, 0, 0, 0, 40, 50, 60, 255]
    );
}

#[test]
fn palette_index_outside_table_is_a_decode_error() {
    assert_eq!(
        expand_indexed(&[0, 3], &PALETTE, None).unwrap(),
        vec![0, 0, 0, 255, 0, 0, 255, 255]
    );
    assert!(expand_indexed(&[4], &PALETTE, None).is_err());
    assert_eq!(expand_indexed(&[4], &PALETTE, Some(4)).unwrap(), vec![0; 4]);
}
