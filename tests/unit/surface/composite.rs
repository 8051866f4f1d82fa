use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [0, 0, 0, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_blends_premultiplied() {
    let dst = [0, 0, 200, 255];
    let src = [64, 0, 0, 128];
    // dst * (255 - 128) / 255 = 200 * 127 / 255 ~= 100
    assert_eq!(over(dst, src), [64, 0, 100, 255]);
}

#[test]
fn over_row_applies_per_pixel() {
    let mut dst = vec![1, 2, 3, 255, 9, 9, 9, 255];
    let src = vec![0, 0, 0, 0, 50, 60, 70, 255];
    over_row_in_place(&mut dst, &src);
    assert_eq!(dst, vec![1, 2, 3, 255, 50, 60, 70, 255]);
}
