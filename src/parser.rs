//! Readers for the formats a source font can come in.

pub mod gfx_header;
