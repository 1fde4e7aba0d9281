//! Keyframe interpolation used by the card timeline.

pub(crate) mod ease;
pub(crate) mod interp;
