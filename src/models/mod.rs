//! Data models for the programs backend.
//!
//! Field names are camelCase on the wire to match the web client.

mod page;
mod patch;
mod program;

pub use page::*;
pub use patch::*;
pub use program::*;
