//! A connection to a single `MariaDB` instance.

use std::time::Duration;

use sqlx::Connection;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError};
use tracing::{debug, info};
use wmfdb_core::{Cnf, ConnArgs, Result, WmfdbError};

use crate::conn_info::ConnInfo;
use crate::cursor::{Cursor, Dict, Tuple};
use crate::options;

/// Server error number for an unknown database.
pub const ER_BAD_DB_ERROR: u16 = 1049;

/// One open (or closed) connection, plus enough detail to describe it and
/// to reconnect.
#[derive(Debug)]
pub struct Db {
    conn: Option<MySqlConnection>,
    options: MySqlConnectOptions,
    connect_timeout: Option<Duration>,
    info: ConnInfo,
}

impl Db {
    /// Connect using `args`.
    ///
    /// # Errors
    ///
    /// Returns [`WmfdbError::Value`] for an invalid `connect_timeout`, and
    /// [`WmfdbError::Db`] if the connection fails or times out.
    pub async fn connect(args: &ConnArgs) -> Result<Self> {
        let info = ConnInfo::from_args(args);
        let options = options::connect_options(args);
        let connect_timeout = options::connect_timeout(args)?;
        let conn = open(&options, connect_timeout, &info.addr()).await?;
        let db = Self {
            conn: Some(conn),
            options,
            connect_timeout,
            info,
        };
        info!(conn = %db.desc(), "Connected");
        Ok(db)
    }

    /// Connect using the default option files and sections, with
    /// `overrides` applied on top of what they provide.
    pub async fn connect_default(overrides: impl FnOnce(&mut ConnArgs) + Send) -> Result<Self> {
        let mut cnf = Cnf::new();
        cnf.load_default_cfgs()?;
        let mut args = cnf.conn_args()?;
        overrides(&mut args);
        Self::connect(&args).await
    }

    /// See [`ConnInfo::host`].
    pub fn host(&self) -> String {
        self.info.host()
    }

    /// See [`ConnInfo::addr`].
    pub fn addr(&self) -> String {
        self.info.addr()
    }

    /// See [`ConnInfo::desc`].
    pub fn desc(&self) -> String {
        self.info.desc()
    }

    /// Currently selected database.
    pub fn db(&self) -> Option<&str> {
        self.info.database()
    }

    pub const fn info(&self) -> &ConnInfo {
        &self.info
    }

    pub const fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Switch the default database.
    ///
    /// # Errors
    ///
    /// An unknown database is a [`WmfdbError::Value`]. Anything else the
    /// server rejects is a [`WmfdbError::Db`].
    pub async fn select_db(&mut self, db: &str) -> Result<()> {
        let addr = self.addr();
        let conn = self.conn_mut()?;
        let sql = format!("USE {}", quote_identifier(db));
        if let Err(e) = sqlx::raw_sql(&sql).execute(&mut *conn).await {
            return Err(select_db_error(&addr, server_error_number(&e), &e.to_string()));
        }
        self.info.set_database(db);
        // Reconnects land in the same database.
        self.options = self.options.clone().database(db);
        debug!(conn = %self.desc(), "Selected database");
        Ok(())
    }

    /// Start a transaction.
    pub async fn begin(&mut self) -> Result<()> {
        self.run_raw("BEGIN").await
    }

    /// Roll back the current transaction.
    pub async fn rollback(&mut self) -> Result<()> {
        self.run_raw("ROLLBACK").await
    }

    /// Check the connection is alive.
    ///
    /// With `reconnect`, a dead or closed connection is replaced by a fresh
    /// one instead of failing.
    pub async fn ping(&mut self, reconnect: bool) -> Result<()> {
        let addr = self.addr();
        let err = match self.conn.as_mut() {
            Some(conn) => match conn.ping().await {
                Ok(()) => return Ok(()),
                Err(e) => WmfdbError::db(&addr, e.to_string()),
            },
            None => WmfdbError::db(&addr, "Connection is closed"),
        };
        if !reconnect {
            return Err(err);
        }
        debug!(%addr, error = %err, "Reconnecting");
        self.conn = None;
        self.conn = Some(open(&self.options, self.connect_timeout, &addr).await?);
        Ok(())
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Closing a connection that is already closed is a [`WmfdbError::Db`].
    pub async fn close(&mut self) -> Result<()> {
        let addr = self.addr();
        let conn = self
            .conn
            .take()
            .ok_or_else(|| WmfdbError::db(&addr, "Already closed"))?;
        conn.close()
            .await
            .map_err(|e| WmfdbError::db(addr, e.to_string()))
    }

    /// A cursor returning rows as positional values.
    ///
    /// `timeout` is the default statement timeout in seconds for queries
    /// run through it.
    pub fn cursor(&mut self, timeout: Option<f64>) -> Result<Cursor<'_, Tuple>> {
        let addr = self.addr();
        Ok(Cursor::new(self.conn_mut()?, addr, timeout))
    }

    /// A cursor returning rows keyed by column name.
    pub fn dict_cursor(&mut self, timeout: Option<f64>) -> Result<Cursor<'_, Dict>> {
        let addr = self.addr();
        Ok(Cursor::new(self.conn_mut()?, addr, timeout))
    }

    fn conn_mut(&mut self) -> Result<&mut MySqlConnection> {
        let addr = self.info.addr();
        self.conn
            .as_mut()
            .ok_or_else(|| WmfdbError::db(addr, "Connection is closed"))
    }

    async fn run_raw(&mut self, sql: &str) -> Result<()> {
        let addr = self.addr();
        let conn = self.conn_mut()?;
        sqlx::raw_sql(sql)
            .execute(&mut *conn)
            .await
            .map_err(|e| WmfdbError::db(addr, e.to_string()))?;
        Ok(())
    }
}

async fn open(
    options: &MySqlConnectOptions,
    timeout: Option<Duration>,
    addr: &str,
) -> Result<MySqlConnection> {
    debug!(%addr, ?timeout, "Connecting");
    let connect = MySqlConnection::connect_with(options);
    let res = match timeout {
        Some(t) => {
            let Ok(res) = tokio::time::timeout(t, connect).await else {
                let msg = format!("Timed out connecting after {t:?}");
                return Err(WmfdbError::db(addr, msg));
            };
            res
        }
        None => connect.await,
    };
    res.map_err(|e| WmfdbError::db(addr, e.to_string()))
}

/// The server error number carried by `err`, if the server sent one.
fn server_error_number(err: &sqlx::Error) -> Option<u16> {
    err.as_database_error()?
        .try_downcast_ref::<MySqlDatabaseError>()
        .map(MySqlDatabaseError::number)
}

/// Map a rejected `USE` to the error callers see.
///
/// An unknown database is a caller mistake rather than a server fault.
fn select_db_error(addr: &str, number: Option<u16>, message: &str) -> WmfdbError {
    if number == Some(ER_BAD_DB_ERROR) {
        WmfdbError::value(format!("{addr}: {message}"))
    } else {
        WmfdbError::db(addr, message)
    }
}

/// Backtick-quote an identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("enwiki"), "`enwiki`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_select_db_unknown_database_is_value_error() {
        let msg = "1049 (42000): Unknown database 'nowiki'";
        let err = select_db_error("db1001:3306", Some(ER_BAD_DB_ERROR), msg);
        assert!(matches!(err, WmfdbError::Value(_)));
        assert_eq!(
            err.to_string(),
            "db1001:3306: 1049 (42000): Unknown database 'nowiki'"
        );
    }

    #[test]
    fn test_select_db_other_failures_are_db_errors() {
        let denied = "1044 (42000): Access denied for user 'u'@'%' to database 'x'";
        let err = select_db_error("db1001:3306", Some(1044), denied);
        assert!(matches!(
            err,
            WmfdbError::Db { ref addr, .. } if addr == "db1001:3306"
        ));

        let err = select_db_error("localhost:/run/mysqld/mysqld.sock", None, "broken pipe");
        assert_eq!(
            err.to_string(),
            "localhost:/run/mysqld/mysqld.sock: broken pipe"
        );
    }

    #[test]
    fn test_server_error_number_without_server_error() {
        let err = sqlx::Error::PoolTimedOut;
        assert_eq!(server_error_number(&err), None);
    }
}
