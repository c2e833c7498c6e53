//! Name badge for the Waveshare 2.66" e-paper panel
//!
//! - `display`: SPI/GPIO transport and the panel controller protocol
//! - `canvas`: landscape and portrait 1-bit frame buffers
//! - `text`: scaled bitmap text with automatic fitting
//! - `badge`: composition of the badge screen from config and artwork

pub mod badge;
pub mod canvas;
pub mod config;
pub mod display;
pub mod image_proc;
pub mod text;
