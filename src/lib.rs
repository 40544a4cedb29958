// ABOUTME: Library root for ebdeploy - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod artifact;
pub mod cloud;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod provision;
pub mod types;
