//! The scoreboard card: immutable submission state, per-frame timeline and frame composition.

pub(crate) mod model;
pub(crate) mod render;
pub(crate) mod timeline;
