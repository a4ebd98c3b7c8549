//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes defining commands, parsing arguments, and the `App` that ties the
//! fetcher, location, theme and rendering together.

mod commands;

pub use commands::*;
