use std::path::PathBuf;
use std::str::FromStr;

use crate::encode::ffmpeg::AuxInput;
use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{ReactionError, ReactionResult};
use crate::layout::boxes::place_grid;
use crate::reaction::layout::{Orientation, ReactionLayout};

/// Backdrop of the vertical layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Background {
    Color(Rgba8),
    Image(PathBuf),
}

impl FromStr for Background {
    type Err = ReactionError;

    /// `#rrggbb` is a solid color, anything else an image path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('#') {
            return Rgba8::from_hex(s).map(Self::Color);
        }
        if s.is_empty() {
            return Err(ReactionError::validation("background source is empty"));
        }
        Ok(Self::Image(PathBuf::from(s)))
    }
}

/// Footage and sound muxed with the card stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionSources {
    pub webcam: PathBuf,
    pub screen: Option<PathBuf>,
    pub background: Background,
    /// Played when the verdict lands.
    pub verdict_sound: Option<PathBuf>,
}

/// Encoder inputs plus the `-filter_complex` graph that places them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionGraph {
    pub inputs: Vec<AuxInput>,
    pub filter_complex: String,
    pub maps: Vec<String>,
}

impl ReactionGraph {
    /// Input `0` is the raw card stream; the inputs here are numbered from `1`.
    pub fn build(
        layout: &ReactionLayout,
        sources: &ReactionSources,
        animation_start: u64,
        fps: Fps,
    ) -> ReactionResult<Self> {
        if sources.webcam.as_os_str().is_empty() {
            return Err(ReactionError::validation("webcam source is empty"));
        }
        let mut inputs = vec![AuxInput::File(sources.webcam.clone())];
        let webcam = 1;
        let mut chains = Vec::new();
        let card = place_grid(layout.card);
        let cam = place_grid(layout.webcam);

        chains.push(format!("[{webcam}:v]scale={}:-1[webcam]", cam.width()));
        match layout.orientation {
            Orientation::Vertical => {
                inputs.push(match &sources.background {
                    Background::Image(path) => AuxInput::LoopedImage(path.clone()),
                    Background::Color(c) => AuxInput::Lavfi(format!(
                        "color=c=0x{:02x}{:02x}{:02x}:s={}x{}:r={fps}",
                        c.r, c.g, c.b, layout.width, layout.height
                    )),
                });
                let background = inputs.len();
                chains.push(format!(
                    "[{background}:v]scale={}:{}[bg]",
                    layout.width, layout.height
                ));
                // The backdrop never ends, so the card stream bounds the output.
                chains.push(format!(
                    "[bg][0:v]overlay=x={}:y={}:shortest=1[with_card]",
                    card.left, card.top
                ));

                let screen = match (&sources.screen, layout.screen) {
                    (Some(path), Some(slot)) => {
                        inputs.push(AuxInput::File(path.clone()));
                        Some((inputs.len(), place_grid(slot)))
                    }
                    _ => None,
                };
                let webcam_out = if screen.is_some() { "[with_webcam]" } else { "[vout]" };
                chains.push(format!(
                    "[with_card][webcam]overlay=x={}:y={}{webcam_out}",
                    cam.left, cam.top
                ));
                if let Some((idx, at)) = screen {
                    chains.push(format!("[{idx}:v]scale={}:-1[screen]", at.width()));
                    chains.push(format!(
                        "[with_webcam][screen]overlay=x={}:y={}[vout]",
                        at.left, at.top
                    ));
                }
            }
            Orientation::Horizontal => {
                chains.push(format!(
                    "[webcam][0:v]overlay=x={}:y={}[vout]",
                    card.left, card.top
                ));
            }
        }

        let mut maps = vec!["[vout]".to_owned()];
        match &sources.verdict_sound {
            Some(sound) => {
                inputs.push(AuxInput::File(sound.clone()));
                let idx = inputs.len();
                let delay_ms = verdict_delay_ms(animation_start, fps);
                chains.push(format!("[{idx}:a]adelay=delays={delay_ms}:all=1[verdict]"));
                chains.push(format!(
                    "[{webcam}:a][verdict]amix=inputs=2:duration=longest[aout]"
                ));
                maps.push("[aout]".to_owned());
            }
            None => maps.push(format!("{webcam}:a?")),
        }

        Ok(Self {
            inputs,
            filter_complex: chains.join(";"),
            maps,
        })
    }
}

/// Milliseconds from the start of the clip to the verdict frame.
pub fn verdict_delay_ms(animation_start: u64, fps: Fps) -> u64 {
    (fps.frames_to_secs(animation_start) * 1000.0).round() as u64
}

#[cfg(test)]
#[path = "../../tests/unit/reaction/graph.rs"]
mod tests;
