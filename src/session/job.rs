use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::card::model::Card;
use crate::card::render::CardRenderer;
use crate::encode::sink::{FrameRGBA, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReactionError, ReactionResult};
use crate::text::backend::TextBackend;

/// Counters returned by [`RenderJob::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames composed from scratch.
    pub frames_rendered: u64,
    /// Frames that repeated the previous frame's state and reused its pixels.
    pub frames_reused: u64,
}

/// One card video: frames `0..=last_frame` pushed in order into a single sink.
#[derive(Clone, Debug, Default)]
pub struct RenderJob {
    pub last_frame: u64,
    cancel: Option<Arc<AtomicBool>>,
}

impl RenderJob {
    pub fn new(last_frame: u64) -> Self {
        Self {
            last_frame,
            cancel: None,
        }
    }

    /// Stop between frames once `flag` is set; the sink is aborted as for any other failure.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn check_cancelled(&self) -> ReactionResult<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                Err(ReactionError::encode("render job cancelled"))
            }
            _ => Ok(()),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.last_frame + 1
    }

    /// Render and stream every frame. On failure the sink is aborted before the error
    /// propagates, so a partially written output is never published.
    #[tracing::instrument(skip_all, fields(last_frame = self.last_frame))]
    pub fn run<B: TextBackend>(
        &self,
        renderer: &mut CardRenderer<B>,
        card: &Card,
        sink: &mut dyn FrameSink,
    ) -> ReactionResult<RenderStats> {
        self.check_cancelled()?;
        let (width, height) = card.size();
        sink.begin(SinkConfig {
            width,
            height,
            fps: card.fps(),
        })?;

        match self.stream(renderer, card, sink) {
            Ok(stats) => {
                sink.end()?;
                tracing::info!(
                    frames = stats.frames_total,
                    rendered = stats.frames_rendered,
                    reused = stats.frames_reused,
                    "render job finished"
                );
                Ok(stats)
            }
            Err(e) => {
                sink.abort();
                Err(e)
            }
        }
    }

    fn stream<B: TextBackend>(
        &self,
        renderer: &mut CardRenderer<B>,
        card: &Card,
        sink: &mut dyn FrameSink,
    ) -> ReactionResult<RenderStats> {
        let mut stats = RenderStats::default();
        let mut previous = None;
        for f in 0..=self.last_frame {
            self.check_cancelled()?;
            let idx = FrameIndex(f);
            let state = card.sample(idx);
            let frame = match previous.take() {
                Some((prev_state, frame)) if prev_state == state => {
                    stats.frames_reused += 1;
                    frame
                }
                _ => {
                    stats.frames_rendered += 1;
                    FrameRGBA::from_image(renderer.compose(card, &state)?)
                }
            };
            sink.push_frame(idx, &frame)?;
            stats.frames_total += 1;
            previous = Some((state, frame));
        }
        Ok(stats)
    }
}

/// Index of the last frame of a clip `duration_secs` long.
pub fn last_frame_for(duration_secs: f64, fps: Fps) -> u64 {
    if !duration_secs.is_finite() {
        return 0;
    }
    fps.secs_to_frames_floor(duration_secs)
}

/// Frame at which the verdict lands: `reveal_secs` before the end of the clip, never negative.
pub fn animation_start_for(last_frame: u64, fps: Fps, reveal_secs: f64) -> u64 {
    let start = (last_frame as f64 - reveal_secs * fps.as_f64()).round_ties_even();
    if start.is_finite() { start.max(0.0) as u64 } else { 0 }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
