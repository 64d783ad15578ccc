//! Integration tests for reading my.cnf files from disk.

use std::path::PathBuf;

use wmfdb_core::{Cnf, ConnArgs, WmfdbError};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/mycnf")
        .join(name)
}

#[test]
fn test_load_cfg_sections() {
    let mut c = Cnf::new();
    assert!(c.sections().is_empty());
    c.load_cfg(&fixture("base.cnf")).unwrap();
    assert_eq!(c.sections(), vec!["client", "clientextra"]);
    assert_eq!(c.raw("clientextra", "user"), Some(Some("\"user1_extra\"")));
}

#[test]
fn test_load_cfg_parse_error() {
    let err = Cnf::new()
        .load_cfg(&fixture("parse_error.cnf"))
        .unwrap_err();
    assert!(matches!(err, WmfdbError::Value(_)));
    assert!(err.to_string().contains("no section headers"));
}

#[test]
fn test_load_cfgs_skips_missing_files() {
    let mut c = Cnf::new();
    c.load_cfgs([fixture("missing.cnf"), fixture("base.cnf")])
        .unwrap();
    assert_eq!(c.get_str("user").as_deref(), Some("user1"));
}

#[test]
fn test_conn_args_one_cnf() {
    let mut c = Cnf::new();
    c.load_cfgs([fixture("base.cnf")]).unwrap();
    assert_eq!(
        c.conn_args().unwrap(),
        ConnArgs {
            user: Some("user1".to_string()),
            port: Some(3999),
            connect_timeout: Some(0.3),
            max_allowed_packet: Some("16M".to_string()),
            ssl_ca: Some("/path/to/CA.pem".to_string()),
            ..ConnArgs::default()
        }
    );
}

#[test]
fn test_conn_args_multi_cnf() {
    let mut c = Cnf::new();
    c.load_cfgs([fixture("base.cnf"), fixture("add.cnf")])
        .unwrap();
    assert_eq!(
        c.conn_args().unwrap(),
        ConnArgs {
            user: Some("user2".to_string()),
            port: Some(3999),
            connect_timeout: Some(0.3),
            max_allowed_packet: Some("32M".to_string()),
            ssl_ca: Some("/path/to/CA.pem".to_string()),
            ssl_verify_cert: true,
            ssl_verify_identity: true,
            ..ConnArgs::default()
        }
    );
}

#[test]
fn test_conn_args_multi_section() {
    let mut c = Cnf::with_sections(["clientextra", "client"]);
    c.load_cfgs([fixture("base.cnf")]).unwrap();
    assert_eq!(
        c.conn_args().unwrap(),
        ConnArgs {
            user: Some("user1_extra".to_string()),
            port: Some(3999),
            connect_timeout: Some(0.3),
            max_allowed_packet: Some("16M".to_string()),
            ssl_ca: Some("/path/to/CA.pem".to_string()),
            ..ConnArgs::default()
        }
    );
}
