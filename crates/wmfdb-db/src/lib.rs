//! Connections to `MariaDB` instances, built on sqlx.
//!
//! [`Db`] wraps one connection and knows how to describe itself
//! (`user@host:port[db]`) for logs and errors. Statements run through a
//! [`Cursor`], which renders queries client-side, applies per-statement
//! timeouts and buffers result rows as [`Value`]s.
//!
//! ```rust,no_run
//! use wmfdb_core::ConnArgs;
//! use wmfdb_db::Db;
//!
//! # async fn example() -> wmfdb_core::Result<()> {
//! let mut db = Db::connect(&ConnArgs {
//!     host: Some("db1001.eqiad.wmnet".to_string()),
//!     ..ConnArgs::default()
//! })
//! .await?;
//! let mut cur = db.cursor(Some(10.0))?;
//! cur.query("SELECT @@hostname", &[], None).await?;
//! let rows = cur.fetch_all();
//! # Ok(())
//! # }
//! ```

#![deny(unused_crate_dependencies)]

pub mod conn_info;
pub mod connection;
pub mod cursor;
pub mod options;
pub mod query;
pub mod value;

pub use conn_info::ConnInfo;
pub use connection::Db;
pub use cursor::{Cursor, Dict, RowFormat, Tuple};
pub use value::Value;
