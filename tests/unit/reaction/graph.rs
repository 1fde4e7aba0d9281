use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn sources() -> ReactionSources {
    ReactionSources {
        webcam: PathBuf::from("webcam.mp4"),
        screen: Some(PathBuf::from("screen.mp4")),
        background: Background::Image(PathBuf::from("bg.png")),
        verdict_sound: Some(PathBuf::from("success.mp3")),
    }
}

#[test]
fn vertical_graph_layers_card_webcam_and_screen() {
    let layout = ReactionLayout::vertical(1000, 340);
    let g = ReactionGraph::build(&layout, &sources(), 300, fps30()).unwrap();

    assert_eq!(
        g.inputs,
        [
            AuxInput::File(PathBuf::from("webcam.mp4")),
            AuxInput::LoopedImage(PathBuf::from("bg.png")),
            AuxInput::File(PathBuf::from("screen.mp4")),
            AuxInput::File(PathBuf::from("success.mp3")),
        ]
    );
    assert_eq!(
        g.filter_complex.split(';').collect::<Vec<_>>(),
        [
            "[1:v]scale=1000:-1[webcam]",
            "[2:v]scale=1080:1920[bg]",
            "[bg][0:v]overlay=x=40:y=790:shortest=1[with_card]",
            "[with_card][webcam]overlay=x=40:y=178[with_webcam]",
            "[3:v]scale=1000:-1[screen]",
            "[with_webcam][screen]overlay=x=40:y=1180[vout]",
            "[4:a]adelay=delays=10000:all=1[verdict]",
            "[1:a][verdict]amix=inputs=2:duration=longest[aout]",
        ]
    );
    assert_eq!(g.maps, ["[vout]", "[aout]"]);
}

#[test]
fn color_background_uses_lavfi_source() {
    let layout = ReactionLayout::vertical(1000, 340);
    let src = ReactionSources {
        background: "#1B8041".parse().unwrap(),
        screen: None,
        ..sources()
    };
    let g = ReactionGraph::build(&layout, &src, 0, fps30()).unwrap();

    assert_eq!(
        g.inputs[1],
        AuxInput::Lavfi("color=c=0x1b8041:s=1080x1920:r=30".to_owned())
    );
    assert!(g.filter_complex.contains("[with_card][webcam]overlay=x=40:y=178[vout]"));
    assert!(!g.filter_complex.contains("[screen]"));
    assert!(g.filter_complex.contains("[3:a]adelay=delays=0:all=1[verdict]"));
}

#[test]
fn horizontal_graph_overlays_card_on_webcam() {
    let layout = ReactionLayout::horizontal(1000, 340);
    let g = ReactionGraph::build(&layout, &sources(), 450, Fps::new(30000, 1001).unwrap()).unwrap();

    assert_eq!(
        g.inputs,
        [
            AuxInput::File(PathBuf::from("webcam.mp4")),
            AuxInput::File(PathBuf::from("success.mp3")),
        ]
    );
    assert_eq!(
        g.filter_complex,
        "[1:v]scale=1920:-1[webcam];\
         [webcam][0:v]overlay=x=920:y=740[vout];\
         [2:a]adelay=delays=15015:all=1[verdict];\
         [1:a][verdict]amix=inputs=2:duration=longest[aout]"
    );
}

#[test]
fn without_sound_the_webcam_audio_passes_through() {
    let layout = ReactionLayout::horizontal(1000, 340);
    let src = ReactionSources {
        verdict_sound: None,
        ..sources()
    };
    let g = ReactionGraph::build(&layout, &src, 0, fps30()).unwrap();
    assert_eq!(g.maps, ["[vout]", "1:a?"]);
    assert!(!g.filter_complex.contains("amix"));
}

#[test]
fn background_parses_colors_and_paths() {
    assert_eq!(
        "#ffffff".parse::<Background>().unwrap(),
        Background::Color(Rgba8::opaque(255, 255, 255))
    );
    assert_eq!(
        "assets/bg.png".parse::<Background>().unwrap(),
        Background::Image(PathBuf::from("assets/bg.png"))
    );
    assert!("#nothex".parse::<Background>().is_err());
    assert!("".parse::<Background>().is_err());
}

#[test]
fn empty_webcam_is_rejected() {
    let src = ReactionSources {
        webcam: PathBuf::new(),
        ..sources()
    };
    let layout = ReactionLayout::vertical(1000, 340);
    assert!(ReactionGraph::build(&layout, &src, 0, fps30()).is_err());
}

#[test]
fn verdict_delay_tracks_the_reveal_frame() {
    assert_eq!(verdict_delay_ms(900, fps30()), 30_000);
    assert_eq!(verdict_delay_ms(1, fps30()), 33);
}
