//! # IO Module
//!
//! Interface layer between a user and the domain services: a console sink for
//! notices, a stdin confirmation prompt and the command-line dispatcher.

pub mod console;
pub mod cli;

pub use console::{ConsoleConfirmation, ConsoleNoticeSink};
pub use cli::{run_command, Cli, Command};
