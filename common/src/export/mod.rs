//! Export core modules shared by the renderer and the PDF assembler.

pub mod page_core;
