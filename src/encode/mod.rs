//! Frame sinks.
//!
//! A sink consumes rendered frames in timeline order. The encoder sink streams them into an
//! external process and publishes its output atomically.

pub(crate) mod ffmpeg;
pub(crate) mod process;
pub(crate) mod publish;
pub(crate) mod shutdown;
pub(crate) mod sink;
