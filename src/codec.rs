//! [`ImageCodec`](crate::ImageCodec) implementations.

pub(crate) mod gif;
pub(crate) mod memory;
