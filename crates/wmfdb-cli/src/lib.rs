//! Command-line tools for wmfdb.
//!
//! Parsers live in [`parser`], the work of each tool in [`handlers`].

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only.
use dotenvy as _;

pub mod error;
pub mod handlers;
pub mod parser;

pub use error::CliError;
pub use parser::{DbMysqlCli, InstanceArgs};
