//! Child process execution with masked output.

pub mod command;

pub use command::{execute_masked, execute_plain, CommandResult, CommandSpec};
