//! `db-mysql`: run the mysql client against an instance named the way
//! operators name them (`db1115:s3`, `db1115:3313`, `db1115`).

use std::os::unix::process::CommandExt;
use std::process::Command;

use tracing::info;
use wmfdb_core::mysql_cli::{self, MYSQL_CMD};
use wmfdb_core::{SectionMap, addr};

use crate::error::CliError;
use crate::parser::DbMysqlCli;

/// Full mysql client argument list for `cli`, resolving the instance
/// through `sm`.
pub fn build_command_args(cli: &DbMysqlCli, sm: &SectionMap) -> Result<Vec<String>, CliError> {
    let (host, port) = addr::split(&cli.target.instance, sm)?;
    Ok(mysql_cli::client_args(&host, port, !cli.target.skip_ssl, &cli.mysql_args))
}

/// Replace the current process with the mysql client.
///
/// Only returns if the exec fails.
pub fn execute(cli: &DbMysqlCli, sm: &SectionMap) -> CliError {
    let args = match build_command_args(cli, sm) {
        Ok(args) => args,
        Err(e) => return e,
    };
    info!(cmd = MYSQL_CMD, ?args, "Execing");
    let source = Command::new(MYSQL_CMD).args(args).exec();
    CliError::Process {
        cmd: MYSQL_CMD.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn sm() -> SectionMap {
        SectionMap::parse("s1,3311\ns3,3313\nx1,3320\n").unwrap()
    }

    fn build(argv: &[&str]) -> Result<Vec<String>, CliError> {
        let cli = DbMysqlCli::parse_from(argv);
        build_command_args(&cli, &sm())
    }

    #[test]
    fn test_section_name() {
        let args = build(&["db-mysql", "db1115:s3", "-e", "show global status"]).unwrap();
        assert_eq!(
            args,
            vec![
                "-h",
                "db1115",
                "-P",
                "3313",
                "--ssl",
                "--ssl-ca=/etc/ssl/certs/Puppet_Internal_CA.pem",
                "--ssl-verify-server-cert",
                "-e",
                "show global status",
            ]
        );
    }

    #[test]
    fn test_default_port_skip_ssl() {
        assert_eq!(
            build(&["db-mysql", "--skip-ssl", "db1115"]).unwrap(),
            vec!["-h", "db1115", "-P", "3306"]
        );
    }

    #[test]
    fn test_numeric_port() {
        let args = build(&["db-mysql", "--skip-ssl", "[2001:db8::11]:3320"]).unwrap();
        assert_eq!(args, vec!["-h", "2001:db8::11", "-P", "3320"]);
    }

    #[test]
    fn test_unknown_section() {
        let err = build(&["db-mysql", "db1115:s99"]).unwrap_err();
        assert!(matches!(err, CliError::Wmfdb(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
