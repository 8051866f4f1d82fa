use super::*;
use crate::foundation::core::Rgba8Premul;

fn size(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn red_surface(w: u32, h: u32) -> CpuSurface {
    let mut s = CpuSurface::with_size(size(w, h));
    s.clear(Rgba8Premul::opaque(255, 0, 0));
    s
}

#[test]
fn letterboxes_small_canvas_in_the_center() {
    let mut p = CpuPresenter::new(CpuPresenterOpts {
        output: size(6, 6),
        backdrop_rgba: [0, 0, 0, 255],
    })
    .unwrap();
    p.present(&red_surface(2, 2), size(2, 2)).unwrap();

    let f = p.last_frame().unwrap();
    assert_eq!((f.width, f.height), (6, 6));
    assert!(f.premultiplied);
    assert_eq!(px(f, 0, 0), [0, 0, 0, 255]);
    assert_eq!(px(f, 5, 5), [0, 0, 0, 255]);

    let center = px(f, 2, 2);
    assert_eq!(center[3], 255);
    assert!(center[0] > 200, "center pixel {center:?}");
    assert!(center[2] < 50, "center pixel {center:?}");
}

#[test]
fn recreate_drops_resources_and_presenting_still_works() {
    let mut p = CpuPresenter::new(CpuPresenterOpts {
        output: size(4, 4),
        ..CpuPresenterOpts::default()
    })
    .unwrap();
    p.present(&red_surface(4, 4), size(4, 4)).unwrap();
    p.recreate().unwrap();
    assert!(p.ctx.is_none());
    assert!(p.target.is_none());

    p.present(&red_surface(4, 4), size(4, 4)).unwrap();
    assert_eq!(p.presented(), 2);
}

#[test]
fn rejects_unrepresentable_output_sizes() {
    assert!(
        CpuPresenter::new(CpuPresenterOpts {
            output: size(0, 10),
            ..CpuPresenterOpts::default()
        })
        .is_err()
    );
    assert!(
        CpuPresenter::new(CpuPresenterOpts {
            output: size(70_000, 10),
            ..CpuPresenterOpts::default()
        })
        .is_err()
    );
}
