#![forbid(unsafe_code)]

//! Headless cardfx demo: command-line parsing and offline PNG rendering.

pub mod cli;
pub mod render;
