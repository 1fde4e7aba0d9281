use crate::card::model::Card;
use crate::foundation::core::{FrameIndex, Rgba8};

const BLINK_FRAMES: i64 = 6;
const BLINK_CYCLES: i64 = 8;
const STATUS_FRAMES: u64 = 6;
const STATUS_REVEAL_DELAY: u64 = 3;
const STATUS_STATES: [&str; 5] = ["   ", ".  ", ".. ", " ..", "  ."];

/// Everything that varies between frames of one card.
#[derive(Clone, Debug, PartialEq)]
pub struct CardFrameState {
    pub rank: u32,
    /// `0` is fully on-canvas at the left edge, `1` fully against the right edge.
    pub badge_offset: f64,
    pub background: Rgba8,
    pub status: String,
    pub clock: String,
}

impl Card {
    /// Displayed rank. Rejected submissions flash 1st place around the reveal frame.
    pub fn rank_at(&self, frame: FrameIndex) -> u32 {
        let rank = self.rank_track.sample(frame.as_f64()).round_ties_even();
        rank.max(0.0) as u32
    }

    pub fn badge_offset_at(&self, frame: FrameIndex) -> f64 {
        self.badge_track.sample(frame.as_f64())
    }

    /// Pending color, then a blink between pending and accepted, then the verdict color.
    pub fn background_at(&self, frame: FrameIndex) -> Rgba8 {
        let palette = &self.config.palette;
        let a = self.animation_start as i64;
        let f = frame.0 as i64;
        if f >= a {
            return if self.fields.success {
                palette.green
            } else {
                palette.red
            };
        }
        if f < a - BLINK_CYCLES * BLINK_FRAMES {
            return palette.yellow;
        }
        let cycle = [palette.yellow, palette.green];
        cycle[((a - f) / BLINK_FRAMES).rem_euclid(2) as usize]
    }

    /// Animated ellipsis until shortly after the reveal, then the verdict right-aligned in the
    /// same three columns.
    pub fn status_at(&self, frame: FrameIndex) -> String {
        if frame.0 >= self.animation_start + STATUS_REVEAL_DELAY {
            return format!("{:>3}", self.fields.outcome);
        }
        let i = (frame.0 / STATUS_FRAMES) % STATUS_STATES.len() as u64;
        STATUS_STATES[i as usize].to_owned()
    }

    /// `HH:MM:SS` contest clock, running up to the submission time and frozen from the reveal.
    pub fn clock_at(&self, frame: FrameIndex) -> String {
        let before_reveal = (frame.0 as i64 - self.animation_start as i64).min(0) as f64;
        let ms = (self.fields.time_ms + before_reveal / self.fps.as_f64() * 1000.0).max(0.0);
        format_clock(ms)
    }

    pub fn sample(&self, frame: FrameIndex) -> CardFrameState {
        CardFrameState {
            rank: self.rank_at(frame),
            badge_offset: self.badge_offset_at(frame),
            background: self.background_at(frame),
            status: self.status_at(frame),
            clock: self.clock_at(frame),
        }
    }
}

pub fn format_clock(ms: f64) -> String {
    let ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 } as u64;
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// English ordinal suffix: `1st`, `2nd`, `3rd`, `11th`, `21st`.
pub fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    }
}

pub fn badge_text(rank: u32) -> String {
    format!("{rank}{} place", ordinal_suffix(rank))
}

#[cfg(test)]
#[path = "../../tests/unit/card/timeline.rs"]
mod tests;
