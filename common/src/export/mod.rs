//! Export core modules shared by the renderer and its tests.

pub mod pdf_core;
