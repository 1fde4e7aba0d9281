//! Text measurement, rasterization and the largest-size-that-fits solver.

pub(crate) mod backend;
pub(crate) mod cache;
pub(crate) mod fit;
pub(crate) mod parley_backend;

#[cfg(test)]
#[path = "../../tests/unit/text/support.rs"]
pub(crate) mod test_support;
