//! Report output.

pub mod generator;

pub use generator::{render_json, write_report};
