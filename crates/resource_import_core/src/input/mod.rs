//! Input file loading.

pub mod loader;
