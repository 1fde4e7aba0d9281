pub(crate) mod boxes;
