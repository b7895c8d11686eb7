//! Zoneroute CLI library.
//!
//! Rendering helpers shared by the `zoneroute-cli` binary's subcommands.

pub mod output;

pub use output::{format_minutes, OutputFormat};
