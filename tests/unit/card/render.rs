use super::*;
use crate::card::model::CardFields;
use crate::config::Palette;
use crate::foundation::core::Fps;
use crate::text::test_support::BlockBackend;

fn card(success: bool) -> Card {
    let fields = CardFields {
        title: "Kotlin Heroes".to_owned(),
        subtitle: "Saint Petersburg State University".to_owned(),
        hashtag: "#spbsu".to_owned(),
        task: "C".to_owned(),
        outcome: if success { "AC" } else { "WA" }.to_owned(),
        success,
        time_ms: 3_723_000.0,
        rank_before: 100,
        rank_after: 1,
    };
    let logo = RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 255, 255]));
    Card::new(
        fields,
        &logo,
        900,
        Fps::new(30, 1).unwrap(),
        CardConfig::default(),
    )
    .unwrap()
}

fn close(px: Option<[u8; 4]>, want: [u8; 4]) -> bool {
    px.is_some_and(|px| px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 2))
}

fn renderer() -> CardRenderer<BlockBackend> {
    CardRenderer::new(BlockBackend::default(), &RenderConfig::default())
}

#[test]
fn slots_follow_card_geometry() {
    let slots = CardSlots::compute(&CardConfig::default());
    assert_eq!(slots.logo, Rect::new(40.0, 48.0, 192.0, 340.0));
    assert_eq!(slots.title, Rect::new(224.0, 64.0, 708.0, 234.0));
    assert_eq!(slots.task, Rect::new(724.0, 64.0, 960.0, 234.0));
    assert_eq!(slots.subtitle, Rect::new(224.0, 254.0, 708.0, 324.0));
    assert_eq!(slots.status, Rect::new(724.0, 254.0, 960.0, 324.0));
}

#[test]
fn frame_has_card_size_and_panel_color() {
    let c = card(true);
    let mut r = renderer();
    let frame = r.render_frame(&c, FrameIndex(905)).unwrap();
    assert_eq!((frame.width, frame.height), (1000, 340));
    assert_eq!(frame.data.len(), 1000 * 340 * 4);

    let green = Palette::default().green.to_array();
    // Gap between the logo slot and the content slots.
    assert!(close(frame.pixel(210, 300), green));
    // Strip above the panel is transparent away from the badge.
    assert_eq!(frame.pixel(500, 10).map(|p| p[3]), Some(0));
    // Logo is centered in its slot.
    let logo = frame.pixel(116, 194).unwrap();
    assert_eq!(logo[3], 255);
    assert!(logo[2] > 190 && logo[0] < 60, "{logo:?}");
}

#[test]
fn badge_slides_from_right_edge_to_left_edge() {
    let c = card(true);
    let mut r = renderer();
    let gray = Palette::default().light_gray.to_array();

    // Offscreen side: "100th place" is 264 px of text plus 32 px padding.
    let start = r.render_frame(&c, FrameIndex(885)).unwrap();
    assert_eq!(start.pixel(8, 40).map(|p| p[3]), Some(0));
    assert!(close(start.pixel(712, 40), gray));

    let end = r.render_frame(&c, FrameIndex(905)).unwrap();
    assert!(close(end.pixel(8, 40), gray));
    assert_eq!(end.pixel(990, 40).map(|p| p[3]), Some(0));
}

#[test]
fn rejected_card_turns_red() {
    let c = card(false);
    let mut r = renderer();
    let frame = r.render_frame(&c, FrameIndex(900)).unwrap();
    assert!(close(frame.pixel(210, 300), Palette::default().red.to_array()));
}

#[test]
fn title_text_lands_in_title_slot() {
    let c = card(true);
    let mut r = renderer();
    let frame = r.render_frame(&c, FrameIndex(905)).unwrap();
    let px = frame.pixel(324, 149).unwrap();
    assert_eq!(px[3], 255);
    assert!(px[0] > 250 && px[1] > 250 && px[2] > 250, "{px:?}");
}

#[test]
fn frozen_frames_reuse_cached_text() {
    let c = card(true);
    let mut r = renderer();
    r.render_frame(&c, FrameIndex(905)).unwrap();
    assert_eq!(r.text_cache().len(), 4);
    let draws = r.backend().draws.len();

    r.render_frame(&c, FrameIndex(906)).unwrap();
    assert_eq!(r.text_cache().len(), 4);
    assert_eq!(r.backend().draws.len(), draws);
}

#[test]
fn rendering_is_deterministic() {
    let c = card(false);
    let a = renderer().render_frame(&c, FrameIndex(897)).unwrap();
    let b = renderer().render_frame(&c, FrameIndex(897)).unwrap();
    assert_eq!(a, b);
}
