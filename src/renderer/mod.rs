//! Rendering module
//!
//! Everything is drawn on the CPU into RGBA canvases; presenting the final
//! frame is left to whatever window layer hosts the game.

pub mod canvas;

pub use canvas::{Canvas, Rgba};
