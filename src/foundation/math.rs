pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Composite one premultiplied source pixel over one straight-alpha destination pixel, in place.
/// The result stays straight-alpha.
pub(crate) fn premul_over_straight_px(dst: &mut [u8], src_premul: &[u8]) {
    let sa = u16::from(src_premul[3]);
    if sa == 0 {
        return;
    }
    if sa == 255 {
        dst.copy_from_slice(src_premul);
        return;
    }

    let da = u16::from(dst[3]);
    let inv = 255 - sa;
    let dst_weight = mul_div255_u16(da, inv);
    let out_a = sa + dst_weight;
    if out_a == 0 {
        dst.fill(0);
        return;
    }

    for c in 0..3 {
        let premul =
            u32::from(src_premul[c]) + u32::from(mul_div255_u16(u16::from(dst[c]), dst_weight));
        dst[c] = ((premul * 255 + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8;
    }
    dst[3] = out_a.min(255) as u8;
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
