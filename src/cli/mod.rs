//! Command-line interface module
//!
//! Provides the argument surface, keyword input reading, and the conversion
//! from CLI arguments to the library configuration.

pub mod config;
pub mod input;
pub mod main;

pub use main::main;
