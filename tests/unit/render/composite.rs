use super::*;

#[test]
fn over_with_extreme_alphas_short_circuits() {
    let dst = [10, 20, 30, 200];
    assert_eq!(over(dst, [1, 2, 3, 0]), dst);
    assert_eq!(over(dst, [1, 2, 3, 255]), [1, 2, 3, 255]);
}

#[test]
fn half_red_over_blue() {
    assert_eq!(over([0, 0, 255, 255], [255, 0, 0, 128]), [128, 0, 127, 255]);
}

#[test]
fn over_transparent_keeps_source_color() {
    assert_eq!(over([0, 0, 0, 0], [40, 80, 120, 100]), [40, 80, 120, 100]);
}

#[test]
fn over_in_place_checks_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    assert!(over_in_place(&mut dst[..6], &[0u8; 6]).is_err());

    over_in_place(&mut dst, &[9, 9, 9, 255, 0, 0, 0, 0]).unwrap();
    assert_eq!(dst, [9, 9, 9, 255, 0, 0, 0, 0]);
}

#[test]
fn multiply_alpha_scales_only_alpha() {
    let mut px = vec![100, 150, 200, 255, 1, 2, 3, 100];
    multiply_alpha_in_place(&mut px, 0.5);
    assert_eq!(px, [100, 150, 200, 128, 1, 2, 3, 50]);

    let mut opaque = vec![5, 5, 5, 77];
    multiply_alpha_in_place(&mut opaque, 1.0);
    assert_eq!(opaque, [5, 5, 5, 77]);
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let original = vec![200, 100, 50, 128, 7, 8, 9, 0, 1, 2, 3, 255];
    let mut px = original.clone();
    premultiply_in_place(&mut px);
    assert_eq!(&px[..4], &[100, 50, 25, 128]);
    unpremultiply_in_place(&mut px);
    for (a, b) in px[..4].iter().zip(&original[..4]) {
        assert!(a.abs_diff(*b) <= 2, "{px:?}");
    }
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..], &[1, 2, 3, 255]);
}

#[test]
fn flatten_blends_over_background() {
    let src = [255, 255, 255, 0, 255, 0, 0, 255, 255, 255, 255, 128];
    let mut dst = [0u8; 12];
    flatten_over_bg(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(&dst[..4], &[0, 0, 0, 255]);
    assert_eq!(&dst[4..8], &[255, 0, 0, 255]);
    assert_eq!(&dst[8..], &[128, 128, 128, 255]);

    assert!(flatten_over_bg(&mut [0u8; 4], &[0u8; 8], [0, 0, 0, 255]).is_err());
}
