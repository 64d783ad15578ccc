//! Argument parsers for the command-line tools.

use clap::{Args, Parser};

/// Arguments shared by every tool that targets a single instance.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct InstanceArgs {
    /// Instance to connect to: `host`, `host:port` or `host:section`
    pub instance: String,

    /// Set logging level
    #[arg(long, env = "WMFDB_LOG", default_value = "WARN")]
    pub log: String,

    /// Connect without TLS
    #[arg(long)]
    pub skip_ssl: bool,
}

/// A wrapper around the mysql command-line client.
///
/// Everything after the instance is passed to `mysql` untouched. There is
/// no `-V`/`--version` flag, so those reach `mysql` too.
#[derive(Parser, Debug)]
#[command(name = "db-mysql")]
#[command(about = "A wrapper around the mysql cmdline client")]
#[command(
    after_help = "Example usage:\n  db-mysql --log=debug db1115:s3 -e 'show global status'"
)]
pub struct DbMysqlCli {
    #[command(flatten)]
    pub target: InstanceArgs,

    /// Extra arguments for the mysql client
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub mysql_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        DbMysqlCli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = DbMysqlCli::parse_from(["db-mysql", "db1115"]);
        assert_eq!(cli.target.instance, "db1115");
        assert_eq!(cli.target.log, "WARN");
        assert!(!cli.target.skip_ssl);
        assert!(cli.mysql_args.is_empty());
    }

    #[test]
    fn test_passthrough_args() {
        let cli = DbMysqlCli::parse_from([
            "db-mysql",
            "--log=debug",
            "--skip-ssl",
            "db1115:s3",
            "-e",
            "show global status",
            "--batch",
        ]);
        assert_eq!(cli.target.log, "debug");
        assert!(cli.target.skip_ssl);
        assert_eq!(cli.target.instance, "db1115:s3");
        assert_eq!(cli.mysql_args, vec!["-e", "show global status", "--batch"]);
    }

    #[test]
    fn test_version_flag_goes_to_mysql() {
        let cli = DbMysqlCli::parse_from(["db-mysql", "db1115", "-V"]);
        assert_eq!(cli.mysql_args, vec!["-V"]);
        let cli = DbMysqlCli::parse_from(["db-mysql", "db1115", "--version"]);
        assert_eq!(cli.mysql_args, vec!["--version"]);
    }

    #[test]
    fn test_own_options_after_passthrough_go_to_mysql() {
        let cli = DbMysqlCli::parse_from(["db-mysql", "db1115", "-e", "x", "--skip-ssl"]);
        assert!(!cli.target.skip_ssl);
        assert_eq!(cli.target.log, "WARN");
        assert_eq!(cli.mysql_args, vec!["-e", "x", "--skip-ssl"]);
    }

    #[test]
    fn test_instance_required() {
        assert!(DbMysqlCli::try_parse_from(["db-mysql"]).is_err());
    }

    #[test]
    fn test_no_prefix_matching() {
        assert!(DbMysqlCli::try_parse_from(["db-mysql", "--sk", "db1115"]).is_err());
    }
}
