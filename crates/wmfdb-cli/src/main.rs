//! `db-mysql` entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use wmfdb_cli::{CliError, DbMysqlCli, handlers};
use wmfdb_core::{SectionMap, log};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = DbMysqlCli::parse();

    if let Err(e) = log::setup_from_str(&cli.target.log.to_uppercase()) {
        // No logger yet.
        eprintln!("{e}");
        return ExitCode::from(1);
    }

    let err = SectionMap::load(None)
        .map_or_else(CliError::from, |sm| handlers::db_mysql::execute(&cli, &sm));
    error!("{err}");
    ExitCode::from(err.exit_code())
}
