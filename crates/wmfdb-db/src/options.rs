//! Translating [`ConnArgs`] into driver connect options.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use tracing::debug;
use wmfdb_core::{ConnArgs, Result, WmfdbError};

/// TLS mode implied by the ssl settings in `args`.
///
/// Verification flags win over plain file settings. With no ssl settings
/// at all, the driver default is kept.
pub const fn ssl_mode(args: &ConnArgs) -> Option<MySqlSslMode> {
    if args.ssl_verify_identity {
        Some(MySqlSslMode::VerifyIdentity)
    } else if args.ssl_verify_cert {
        Some(MySqlSslMode::VerifyCa)
    } else if args.ssl_ca.is_some() || args.ssl_cert.is_some() || args.ssl_key.is_some() {
        Some(MySqlSslMode::Required)
    } else {
        None
    }
}

/// Build the driver options for `args`.
pub fn connect_options(args: &ConnArgs) -> MySqlConnectOptions {
    let mut opts = MySqlConnectOptions::new();
    if let Some(host) = &args.host {
        opts = opts.host(host);
    }
    if let Some(port) = args.port {
        opts = opts.port(port);
    }
    if let Some(socket) = &args.unix_socket {
        opts = opts.socket(socket);
    }
    if let Some(user) = &args.user {
        opts = opts.username(user);
    }
    if let Some(password) = &args.password {
        opts = opts.password(password);
    }
    if let Some(database) = &args.database {
        opts = opts.database(database);
    }
    if let Some(charset) = &args.charset {
        opts = opts.charset(charset);
    }
    if let Some(mode) = ssl_mode(args) {
        opts = opts.ssl_mode(mode);
    }
    if let Some(ca) = &args.ssl_ca {
        opts = opts.ssl_ca(ca);
    }
    if let Some(cert) = &args.ssl_cert {
        opts = opts.ssl_client_cert(cert);
    }
    if let Some(key) = &args.ssl_key {
        opts = opts.ssl_client_key(key);
    }
    if let Some(packet) = &args.max_allowed_packet {
        debug!(
            max_allowed_packet = %packet,
            "Ignoring max_allowed_packet, the server value applies"
        );
    }
    if let Some(bind) = &args.bind_address {
        debug!(
            bind_address = %bind,
            "Ignoring bind_address, not supported by the driver"
        );
    }
    opts
}

/// The connect timeout from `args`, if any.
pub fn connect_timeout(args: &ConnArgs) -> Result<Option<Duration>> {
    args.connect_timeout
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_err(|e| WmfdbError::value(format!("Invalid connect_timeout {secs}: {e}")))
        })
        .transpose()
}
