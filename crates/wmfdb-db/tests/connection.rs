//! Connection behaviour that needs no running server, plus an opt-in
//! round trip against a real instance.

use wmfdb_core::{ConnArgs, WmfdbError};
use wmfdb_db::{Db, Value};

/// Server socket path for the live tests, which run with `--ignored`.
const LIVE_SOCKET_ENV: &str = "WMFDB_TEST_MYSQL_SOCKET";

#[tokio::test]
async fn test_connect_missing_socket_is_db_error() {
    let err = Db::connect(&ConnArgs {
        unix_socket: Some("/nonexistent/mysqld.sock".to_string()),
        user: Some("user1".to_string()),
        ..ConnArgs::default()
    })
    .await
    .unwrap_err();
    match err {
        WmfdbError::Db { addr, .. } => assert_eq!(addr, "localhost:/nonexistent/mysqld.sock"),
        other => panic!("expected a Db error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_unreachable_host_is_db_error() {
    let err = Db::connect(&ConnArgs {
        host: Some("192.0.2.1".to_string()),
        port: Some(3311),
        connect_timeout: Some(0.2),
        ..ConnArgs::default()
    })
    .await
    .unwrap_err();
    match err {
        WmfdbError::Db { addr, .. } => assert_eq!(addr, "192.0.2.1:3311"),
        other => panic!("expected a Db error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_invalid_timeout_is_value_error() {
    let err = Db::connect(&ConnArgs {
        connect_timeout: Some(f64::NAN),
        ..ConnArgs::default()
    })
    .await
    .unwrap_err();
    assert!(matches!(err, WmfdbError::Value(_)));
}

#[tokio::test]
#[ignore = "needs a server socket in WMFDB_TEST_MYSQL_SOCKET"]
async fn test_live_round_trip() {
    let socket = std::env::var(LIVE_SOCKET_ENV)
        .expect("set WMFDB_TEST_MYSQL_SOCKET to run the live tests");
    let mut db = Db::connect(&ConnArgs {
        unix_socket: Some(socket),
        ..ConnArgs::default()
    })
    .await
    .unwrap();
    assert!(db.is_open());
    db.ping(false).await.unwrap();

    let unknown = db.select_db("wmfdb_no_such_database").await.unwrap_err();
    assert!(matches!(unknown, WmfdbError::Value(_)));

    {
        let mut cur = db.cursor(Some(5.0)).unwrap();
        assert_eq!(cur.result_meta(), (vec![], -1));
        let args = [Value::Int(1), Value::from("x")];
        let n = cur
            .query("SELECT ? AS a, ? AS b", &args, None)
            .await
            .unwrap();
        assert_eq!(n, 1);
        let columns = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cur.result_meta(), (columns, 1));
        assert_eq!(
            cur.fetch_one(),
            Some(vec![Value::Int(1), Value::Text("x".to_string())])
        );
        assert_eq!(cur.fetch_one(), None);
    }

    {
        let mut cur = db.dict_cursor(None).unwrap();
        cur.query("SELECT NULL AS n", &[], Some(0.0)).await.unwrap();
        let rows = cur.fetch_all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("n"), Some(&Value::Null));
    }

    db.begin().await.unwrap();
    db.rollback().await.unwrap();
    db.close().await.unwrap();
    assert!(!db.is_open());
    assert!(db.close().await.is_err());
    db.ping(true).await.unwrap();
    assert!(db.is_open());
}
