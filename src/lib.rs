//! Fireworks for the terminal: a frame-rate aware render loop driving a
//! rocket and spark simulation, drawn through a canvas-style surface.

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod logging;
pub mod rng;
pub mod scheduler;
pub mod show;
pub mod surface;

pub use error::{Error, Result};
