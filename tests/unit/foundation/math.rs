use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(1, 127), 0);
    assert_eq!(mul_div255_u16(2, 128), 1);
}

#[test]
fn opaque_source_replaces_destination() {
    let mut dst = [10u8, 20, 30, 255];
    premul_over_straight_px(&mut dst, &[200, 100, 50, 255]);
    assert_eq!(dst, [200, 100, 50, 255]);
}

#[test]
fn transparent_source_keeps_destination() {
    let mut dst = [10u8, 20, 30, 40];
    premul_over_straight_px(&mut dst, &[0, 0, 0, 0]);
    assert_eq!(dst, [10, 20, 30, 40]);
}

#[test]
fn half_alpha_over_transparent_unpremultiplies() {
    // Premultiplied white at 50% over nothing is straight white at 50%.
    let mut dst = [0u8, 0, 0, 0];
    premul_over_straight_px(&mut dst, &[128, 128, 128, 128]);
    assert_eq!(dst, [255, 255, 255, 128]);
}

#[test]
fn half_alpha_over_opaque_blends() {
    let mut dst = [0u8, 0, 0, 255];
    premul_over_straight_px(&mut dst, &[128, 0, 0, 128]);
    assert_eq!(dst[3], 255);
    assert_eq!(dst[0], 128);
    assert_eq!(dst[1], 0);
}
