//! Shared pieces for command-line wrappers around the `mysql` client.

/// The mysql client binary.
pub const MYSQL_CMD: &str = "mysql";

/// CA bundle used to verify production server certificates.
pub const DEFAULT_SSL_CA: &str = "/etc/ssl/certs/Puppet_Internal_CA.pem";

/// TLS flags for the mysql client.
///
/// With a CA, the server certificate is verified against it.
pub fn ssl_args(ssl_ca: Option<&str>) -> Vec<String> {
    let mut args = vec!["--ssl".to_string()];
    if let Some(ca) = ssl_ca {
        args.push(format!("--ssl-ca={ca}"));
        args.push("--ssl-verify-server-cert".to_string());
    }
    args
}

/// Full argument list (without the program name) for connecting the mysql
/// client to `host:port`.
///
/// `extra` is appended untouched.
pub fn client_args(host: &str, port: u16, ssl: bool, extra: &[String]) -> Vec<String> {
    let mut args = vec![
        "-h".to_string(),
        host.to_string(),
        "-P".to_string(),
        port.to_string(),
    ];
    if ssl {
        args.extend(ssl_args(Some(DEFAULT_SSL_CA)));
    }
    args.extend(extra.iter().cloned());
    args
}
