//! Animated scoreboard reaction cards.
//!
//! A [`Card`] holds one judged submission. [`CardRenderer`] turns it into frames that are a pure
//! function of the frame index, and a [`RenderJob`] streams those frames into a [`FrameSink`],
//! usually an [`FfmpegSink`] that publishes its output atomically once the encoder succeeds.
//!
//! - Build [`CardFields`] directly or from an overlay payload ([`SubmissionRecord`])
//! - Create a [`CardRenderer`] over a [`TextBackend`] ([`ParleyTextBackend`] in production)
//! - Run a [`RenderJob`] into a sink; for reactions, mux footage with a [`ReactionGraph`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod card;
/// Tunables with defaults, loadable from JSON.
pub mod config;
pub(crate) mod encode;
pub(crate) mod layout;
pub(crate) mod media;
pub(crate) mod raster;
pub(crate) mod reaction;
pub(crate) mod session;
pub(crate) mod submission;
pub(crate) mod text;

pub use crate::foundation::core::{Fps, FrameIndex, Point, Rect, Rgba8};
pub use crate::foundation::error::{ReactionError, ReactionResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::interp::{Keyframes, interpolate};
pub use crate::card::model::{Card, CardFields, fit_logo, load_logo};
pub use crate::card::render::{CardRenderer, CardSlots};
pub use crate::card::timeline::{CardFrameState, badge_text, format_clock, ordinal_suffix};
pub use crate::config::{CardConfig, EncoderSettings, Palette, RenderConfig};
pub use crate::encode::ffmpeg::{
    AuxInput, FfmpegLauncher, FfmpegSink, ffmpeg_sink, is_ffmpeg_on_path,
};
pub use crate::encode::process::{
    ChildGuard, EncoderLauncher, EncoderSink, EncoderSinkOpts, SinkState,
};
pub use crate::encode::publish::temp_path_for;
pub use crate::encode::shutdown::terminate_encoders;
pub use crate::encode::sink::{FrameRGBA, FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::boxes::{
    PixelBox, center_anchor, dimensions, place_above, place_below, place_grid, split_horizontal,
    split_vertical,
};
pub use crate::media::probe::{VideoMetadata, parse_probe_json, probe_video};
pub use crate::raster::canvas::{
    fill_rounded_rect, paint_onto, paste_with_alpha, resize_exact, transparent,
};
pub use crate::reaction::graph::{Background, ReactionGraph, ReactionSources, verdict_delay_ms};
pub use crate::reaction::layout::{Orientation, ReactionLayout};
pub use crate::session::job::{RenderJob, RenderStats, animation_start_for, last_frame_for};
pub use crate::submission::record::{SubmissionRecord, apply_cds_auth};
pub use crate::text::backend::{FontFace, FontSet, FontSource, TextBackend};
pub use crate::text::cache::{LruCache, TextFitCache, TextFitKey, fit_text_cached};
pub use crate::text::fit::{FitOptions, TextAlign, fit_text, wrap_at_middle};
pub use crate::text::parley_backend::ParleyTextBackend;
