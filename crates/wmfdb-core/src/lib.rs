//! Core building blocks for working with a fleet of `MariaDB` instances.
//!
//! - [`section`]: replication section names, ports and per-section paths
//! - [`addr`]: `host[:port|:section]` parsing and hostname resolution
//! - [`mycnf`]: reading `my.cnf` option files into connection arguments
//! - [`log`]: logging level validation and subscriber setup
//! - [`mysql_cli`]: shared pieces for wrappers around the `mysql` client
//!
//! Every fallible operation returns [`WmfdbError`].

#![deny(unused_crate_dependencies)]

pub mod addr;
pub mod error;
pub mod log;
pub mod mycnf;
pub mod mysql_cli;
pub mod section;

#[cfg(test)]
pub(crate) mod test_utils;

pub use addr::{ReverseLookup, SystemResolver};
pub use error::{Result, WmfdbError};
pub use log::LogLevel;
pub use mycnf::{Cnf, ConnArgs};
pub use section::{
    DEFAULT_PORT, DEFAULT_PROM_PORT, DEFAULT_SECTION, Section, SectionMap, TEST_DATA_ENV,
};

#[cfg(test)]
use tempfile as _;
