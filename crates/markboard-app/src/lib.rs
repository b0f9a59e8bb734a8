//! Markboard headless front end.
//!
//! Drives the engine end-to-end from recorded pointer scripts: annotating a
//! photo, sketching on a blank surface, and inspecting saved documents.

pub mod commands;
pub mod error;
pub mod script;

pub use error::{AppError, AppResult};
