//! ecectl library - exposes modules for the binary and integration tests

pub mod cli;
pub mod commands;
pub mod errors;
pub mod logging;
pub mod output;
