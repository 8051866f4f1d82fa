use super::*;
use crate::anim::model::Disposal;
use crate::codec::memory::MemoryCodec;
use crate::foundation::core::{FrameRect, Rgba8Premul};

fn codec() -> MemoryCodec {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    MemoryCodec::new(canvas, Rgba8Premul::transparent(), None)
        .with_frame(RawFrame::filled(
            FrameRect::full(canvas),
            Rgba8Premul::opaque(1, 2, 3),
            Disposal::None,
            50,
        ))
        .with_frame(RawFrame::filled(
            FrameRect::from_origin_size(1, 1, 2, 2),
            Rgba8Premul::opaque(4, 5, 6),
            Disposal::RestoreBackground,
            0,
        ))
}

#[test]
fn caches_frames_by_default() {
    let mut store = FrameStore::new(codec());
    assert_eq!(store.frame_count(), 2);

    let a = store.frame(1).unwrap();
    let b = store.frame(1).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(store.decode_count(1), 1);
    assert_eq!(store.decode_count(0), 0);
}

#[test]
fn uncached_store_decodes_every_time() {
    let mut store = FrameStore::with_opts(
        codec(),
        FrameStoreOpts {
            cache_frames: false,
        },
    );
    store.frame(0).unwrap();
    store.frame(0).unwrap();
    assert_eq!(store.decode_count(0), 2);
}

#[test]
fn clear_cache_forces_redecode() {
    let mut store = FrameStore::new(codec());
    store.frame(0).unwrap();
    store.clear_cache();
    store.frame(0).unwrap();
    assert_eq!(store.decode_count(0), 2);
}

#[test]
fn out_of_range_is_decode_error() {
    let mut store = FrameStore::new(codec());
    let err = store.frame(2).unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn frames_outside_canvas_are_rejected() {
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    let bad = MemoryCodec::new(canvas, Rgba8Premul::transparent(), None).with_frame(
        RawFrame::filled(
            FrameRect::from_origin_size(1, 1, 2, 2),
            Rgba8Premul::opaque(9, 9, 9),
            Disposal::None,
            10,
        ),
    );
    let mut store = FrameStore::new(bad);
    let err = store.frame(0).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("exceeds canvas"));
}
