//! Command handlers.

pub mod db_mysql;
