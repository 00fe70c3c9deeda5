//! Writers for the shrunk font.

pub mod gfx_header;
