use std::path::Path;
use std::process::Command;

use anyhow::{Context as _, anyhow};

use crate::foundation::core::Fps;
use crate::foundation::error::{ReactionError, ReactionResult};

/// What the reaction pipeline needs to know about the footage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoMetadata {
    pub fps: Fps,
    pub duration_secs: f64,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Frame rate and duration of the first video stream, through `ffprobe`.
///
/// Errors are returned as-is; falling back to defaults is the caller's decision.
pub fn probe_video(program: &Path, source: &Path) -> ReactionResult<VideoMetadata> {
    let out = Command::new(program)
        .args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
        .arg(source)
        .output()
        .with_context(|| format!("failed to run {}", program.display()))?;
    if !out.status.success() {
        return Err(anyhow!(
            "{} failed for '{}': {}",
            program.display(),
            source.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )
        .into());
    }
    parse_probe_json(&out.stdout)
}

/// Interpret `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(bytes: &[u8]) -> ReactionResult<VideoMetadata> {
    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| ReactionError::serde(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReactionError::validation("no video stream found"))?;

    // Variable frame rate sources report "0/0" as the average.
    let fps = [&video.avg_frame_rate, &video.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|rate| rate.parse::<Fps>().ok())
        .ok_or_else(|| ReactionError::validation("video stream has no usable frame rate"))?;

    let duration_secs = [
        video.duration.as_deref(),
        parsed.format.as_ref().and_then(|f| f.duration.as_deref()),
    ]
    .into_iter()
    .flatten()
    .find_map(|d| d.trim().parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0))
    .ok_or_else(|| ReactionError::validation("video has no usable duration"))?;

    Ok(VideoMetadata { fps, duration_secs })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
