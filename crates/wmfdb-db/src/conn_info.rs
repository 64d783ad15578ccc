//! Human-readable descriptions of a database connection.

use wmfdb_core::{ConnArgs, DEFAULT_PORT};

/// Host used by the driver when no host is given.
pub const DEFAULT_HOST: &str = "localhost";

/// Who and where a connection points at, for logs and error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnInfo {
    user: Option<String>,
    host: String,
    unix_socket: Option<String>,
    port: Option<u16>,
    database: Option<String>,
}

impl ConnInfo {
    /// Describe a connection opened with `args`.
    ///
    /// Over a unix socket, user, host and port don't identify the server,
    /// so they are dropped.
    pub fn from_args(args: &ConnArgs) -> Self {
        if let Some(socket) = &args.unix_socket {
            return Self {
                user: None,
                host: DEFAULT_HOST.to_string(),
                unix_socket: Some(socket.clone()),
                port: None,
                database: args.database.clone(),
            };
        }
        Self {
            user: args.user.clone(),
            host: args.host.as_deref().unwrap_or(DEFAULT_HOST).to_string(),
            unix_socket: None,
            port: Some(args.port.unwrap_or(DEFAULT_PORT)),
            database: args.database.clone(),
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn unix_socket(&self) -> Option<&str> {
        self.unix_socket.as_deref()
    }

    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Currently selected database, if any.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub(crate) fn set_database(&mut self, db: &str) {
        self.database = Some(db.to_string());
    }

    /// The instance host.
    ///
    /// IPv6 literals are wrapped in `[]`, IPv4 literals are returned as-is,
    /// and FQDNs are cut down to the bare hostname.
    pub fn host(&self) -> String {
        if self.host.contains(':') {
            return format!("[{}]", self.host);
        }
        // WMF hostnames never start with a digit.
        if self.host.starts_with(|c: char| c.is_ascii_digit()) {
            return self.host.clone();
        }
        self.host.split('.').next().unwrap_or_default().to_string()
    }

    /// The instance address: `host:/path/to/socket`, `host:port` for a
    /// non-default port, or the plain host.
    pub fn addr(&self) -> String {
        let h = self.host();
        match (&self.unix_socket, self.port) {
            (Some(socket), _) => format!("{h}:{socket}"),
            (None, Some(port)) if port != DEFAULT_PORT => format!("{h}:{port}"),
            _ => h,
        }
    }

    /// The connection description, `user@addr[dbname]`, e.g.
    /// `wikiadmin@db9999[plwiki]`.
    ///
    /// The user is omitted when unset or `root`. Without a selected
    /// database, `(none)` is shown.
    pub fn desc(&self) -> String {
        let db_name = self.database.as_deref().unwrap_or("(none)");
        let d = format!("{}[{db_name}]", self.addr());
        match self.user.as_deref() {
            None | Some("root") => d,
            Some(user) => format!("{user}@{d}"),
        }
    }
}
