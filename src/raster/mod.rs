//! Straight-alpha RGBA canvases and the `vello_cpu` bridge used to paint onto them.

pub(crate) mod canvas;
