use super::*;

fn size(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

#[test]
fn centers_when_output_is_larger() {
    let r = fit_rect(size(4, 2), size(10, 10));
    assert_eq!(r, kurbo::Rect::new(3.0, 4.0, 7.0, 6.0));
}

#[test]
fn shrinks_to_narrow_output_preserving_aspect() {
    let r = fit_rect(size(200, 100), size(100, 100));
    assert_eq!(r, kurbo::Rect::new(0.0, 25.0, 100.0, 75.0));
}

#[test]
fn shrinks_to_short_output_preserving_aspect() {
    let r = fit_rect(size(100, 200), size(100, 100));
    assert_eq!(r, kurbo::Rect::new(25.0, 0.0, 75.0, 100.0));
}

#[test]
fn shrinks_along_both_axes_when_needed() {
    // Width pass gives 50x100, still too tall for 50 rows.
    let r = fit_rect(size(100, 200), size(50, 50));
    assert_eq!(r, kurbo::Rect::new(12.5, 0.0, 37.5, 50.0));
}

#[test]
fn empty_display_draws_nothing() {
    assert_eq!(fit_rect(size(0, 5), size(10, 10)), kurbo::Rect::ZERO);
}
