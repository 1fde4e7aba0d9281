use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::EncoderSettings;
use crate::encode::process::{EncoderLauncher, EncoderSink, EncoderSinkOpts};
use crate::encode::sink::SinkConfig;
use crate::foundation::error::{ReactionError, ReactionResult};

/// Extra encoder input next to the raw frame pipe (which is always input `0`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuxInput {
    /// Media file or URL.
    File(PathBuf),
    /// Still image repeated forever (`-loop 1`).
    LoopedImage(PathBuf),
    /// `lavfi` source graph, e.g. `color=c=0x1f1f1f:s=1080x1920`.
    Lavfi(String),
}

impl AuxInput {
    fn push_args(&self, args: &mut Vec<OsString>) {
        match self {
            Self::File(path) => {
                args.push("-i".into());
                args.push(path.clone().into_os_string());
            }
            Self::LoopedImage(path) => {
                args.extend(["-loop", "1", "-i"].map(OsString::from));
                args.push(path.clone().into_os_string());
            }
            Self::Lavfi(graph) => {
                args.extend(["-f", "lavfi", "-i"].map(OsString::from));
                args.push(graph.into());
            }
        }
    }
}

/// Launches the system `ffmpeg` reading raw RGBA frames from stdin.
#[derive(Clone, Debug)]
pub struct FfmpegLauncher {
    settings: EncoderSettings,
    inputs: Vec<AuxInput>,
    filter_complex: Option<String>,
    maps: Vec<String>,
}

impl FfmpegLauncher {
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            settings,
            inputs: Vec::new(),
            filter_complex: None,
            maps: Vec::new(),
        }
    }

    /// Add inputs numbered `1..` in the order given.
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = AuxInput>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Filter graph over all inputs plus the output labels to map.
    pub fn with_filter_complex(
        mut self,
        graph: impl Into<String>,
        maps: impl IntoIterator<Item = String>,
    ) -> Self {
        self.filter_complex = Some(graph.into());
        self.maps = maps.into_iter().collect();
        self
    }

    /// Full argument list for writing `output`.
    pub fn args(&self, cfg: &SinkConfig, output: &Path) -> ReactionResult<Vec<OsString>> {
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReactionError::validation(
                "ffmpeg width/height must be even (required for yuv420p output)",
            ));
        }
        let fps = cfg.fps.to_string();
        let mut args: Vec<OsString> = Vec::new();
        args.extend(
            [
                "-hide_banner",
                "-loglevel",
                self.settings.log_level.as_str(),
                "-y",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
            ]
            .map(OsString::from),
        );
        args.push(format!("{}x{}", cfg.width, cfg.height).into());
        args.extend(["-r", fps.as_str(), "-i", "pipe:0"].map(OsString::from));

        for input in &self.inputs {
            input.push_args(&mut args);
        }
        if let Some(graph) = &self.filter_complex {
            args.push("-filter_complex".into());
            args.push(graph.into());
            for map in &self.maps {
                args.push("-map".into());
                args.push(map.into());
            }
        }

        args.push("-c:v".into());
        args.push((&self.settings.video_codec).into());
        match &self.settings.audio_codec {
            Some(codec) if !self.inputs.is_empty() => {
                args.push("-c:a".into());
                args.push(codec.into());
            }
            _ => args.push("-an".into()),
        }
        args.extend(["-pix_fmt", "yuv420p", "-r", fps.as_str()].map(OsString::from));

        let is_mp4_family = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "mp4" | "mov" | "m4v"));
        if is_mp4_family {
            args.extend(["-movflags", "+faststart"].map(OsString::from));
        }
        args.push(output.as_os_str().to_owned());
        Ok(args)
    }
}

impl EncoderLauncher for FfmpegLauncher {
    fn command(&self, cfg: &SinkConfig, output: &Path) -> ReactionResult<Command> {
        let mut cmd = Command::new(&self.settings.program);
        cmd.args(self.args(cfg, output)?);
        Ok(cmd)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Encoder sink backed by the system `ffmpeg`.
pub type FfmpegSink = EncoderSink<FfmpegLauncher>;

pub fn ffmpeg_sink(launcher: FfmpegLauncher, opts: EncoderSinkOpts) -> FfmpegSink {
    EncoderSink::new(launcher, opts)
}

pub fn is_ffmpeg_on_path(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
