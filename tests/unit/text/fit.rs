use super::*;
use crate::text::test_support::BlockBackend;

#[test]
fn empty_text_and_zero_area_give_exact_transparent_bitmaps() {
    let mut backend = BlockBackend::default();
    let img = fit_text(&mut backend, "", (120.7, 33.2), FontFace::Regular, FitOptions::default())
        .unwrap();
    assert_eq!(img.dimensions(), (120, 33));
    assert!(img.pixels().all(|p| p.0[3] == 0));

    let img = fit_text(&mut backend, "hello", (0.0, 40.0), FontFace::Regular, FitOptions::default())
        .unwrap();
    assert_eq!(img.dimensions(), (0, 40));
    assert_eq!(backend.measures, 0);
    assert!(backend.draws.is_empty());
}

#[test]
fn width_bound_size_without_compression() {
    // Ratios at size 10: width 6 * 1.05 = 6.3, height 1.05.
    let mut backend = BlockBackend::default();
    let img = fit_text(
        &mut backend,
        "abcdefghij",
        (100.0, 40.0),
        FontFace::Bold,
        FitOptions::default(),
    )
    .unwrap();
    assert_eq!(img.dimensions(), (100, 40));
    assert_eq!(backend.draws.len(), 1);
    assert_eq!(backend.draws[0].size_px, 15.0);
    assert_eq!(backend.draws[0].face, FontFace::Bold);
}

#[test]
fn compression_allows_larger_size_then_squeezes() {
    let mut backend = BlockBackend::default();
    let img = fit_text(
        &mut backend,
        "abcdefghij",
        (100.0, 40.0),
        FontFace::Regular,
        FitOptions::default().compress(true),
    )
    .unwrap();
    assert_eq!(img.dimensions(), (100, 40));
    assert_eq!(backend.draws[0].size_px, 23.0);
}

#[test]
fn max_size_caps_the_result() {
    let mut backend = BlockBackend::default();
    fit_text(
        &mut backend,
        "ab",
        (500.0, 500.0),
        FontFace::Mono,
        FitOptions::default().max_size(32),
    )
    .unwrap();
    assert_eq!(backend.draws[0].size_px, 32.0);
}

#[test]
fn tiny_boxes_still_use_size_one() {
    let mut backend = BlockBackend::default();
    let img = fit_text(
        &mut backend,
        "a very long line of text",
        (3.0, 2.0),
        FontFace::Regular,
        FitOptions::default(),
    )
    .unwrap();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(backend.draws[0].size_px, 1.0);
}

#[test]
fn centered_text_is_offset_and_left_text_is_not() {
    let mut backend = BlockBackend::default();
    fit_text(
        &mut backend,
        "ab",
        (100.0, 20.0),
        FontFace::Regular,
        FitOptions::default().align(TextAlign::Center),
    )
    .unwrap();
    // size 19 (20 / 1.05); text block 22.8 x 19 centered in 100 x 20.
    let call = &backend.draws[0];
    assert_eq!(call.size_px, 19.0);
    assert_eq!(call.origin, Point::new(39.0, 1.0));

    let mut backend = BlockBackend::default();
    fit_text(&mut backend, "ab", (100.0, 20.0), FontFace::Regular, FitOptions::default())
        .unwrap();
    assert_eq!(backend.draws[0].origin, Point::new(0.0, 1.0));
}

#[test]
fn drawn_pixels_use_requested_color() {
    let mut backend = BlockBackend::default();
    let red = Rgba8::opaque(255, 0, 0);
    let img = fit_text(
        &mut backend,
        "ab",
        (100.0, 20.0),
        FontFace::Regular,
        FitOptions::default().color(red),
    )
    .unwrap();
    assert_eq!(img.get_pixel(5, 10).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(90, 10).0[3], 0);
}

#[test]
fn multiline_wraps_long_text_before_measuring() {
    let mut backend = BlockBackend::default();
    fit_text(
        &mut backend,
        "Team Long Name Here",
        (200.0, 100.0),
        FontFace::Bold,
        FitOptions::default().multiline(true),
    )
    .unwrap();
    assert_eq!(backend.draws[0].text, "Team Long\nName Here");
}

#[test]
fn wrap_picks_whitespace_nearest_middle() {
    assert_eq!(wrap_at_middle("short text"), "short text");
    assert_eq!(wrap_at_middle("abcdefghijklmnopq"), "abcdefghijklmnopq");
    assert_eq!(wrap_at_middle("aaaaaaaaaaaaaa bb"), "aaaaaaaaaaaaaa\nbb");
    assert_eq!(wrap_at_middle("Université de Montréal"), "Université\nde Montréal");
}
