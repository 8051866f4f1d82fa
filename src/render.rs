//! Presentation of composed canvases.

pub(crate) mod backend;
pub(crate) mod cpu;
