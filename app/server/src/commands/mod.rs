//! Built-in commands.

pub mod version;
