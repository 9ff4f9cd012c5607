#![forbid(unsafe_code)]

//! Border effect implementations.

pub mod binary;
pub mod cell_grid;
pub mod fire;
pub mod frost;
pub mod glow;
pub mod lightning;
pub mod noise_line;
