//! Reading mysql `my.cnf` option files.
//!
//! my.cnf files are ini-like, with some non-standard differences:
//! - Dashes and underscores in key names are interchangeable, so
//!   `max-allowed-packet`, `max_allowed_packet` and `max-allowed_packet`
//!   are the same key.
//! - Single or double quotes around values are stripped.
//! - Unquoted values can carry an in-line `#` comment:
//!   `port = 3306 # default port` reads as `3306`, while
//!   `port = "3306 # default port"` reads as `3306 # default port`.
//! - Keys may appear without a value (`ssl-verify-server-cert`).
//!
//! Files are loaded in order, later values overriding earlier ones. Lookups
//! search a list of sections, and the first section holding the key wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, WmfdbError};

/// Option files read by the mysql client, in load order.
pub const DEF_CFG_LIST: [&str; 3] = ["/etc/my.cnf", "/etc/mysql/my.cnf", "~/.my.cnf"];

/// Sections searched by default.
pub const DEF_SECTION_LIST: [&str; 1] = ["client"];

type Options = HashMap<String, Option<String>>;

/// Merged view over one or more my.cnf files.
#[derive(Debug, Clone)]
pub struct Cnf {
    section_order: Vec<String>,
    sections: Vec<(String, Options)>,
}

impl Default for Cnf {
    fn default() -> Self {
        Self::new()
    }
}

impl Cnf {
    /// Create an empty config that searches [`DEF_SECTION_LIST`].
    pub fn new() -> Self {
        Self::with_sections(DEF_SECTION_LIST)
    }

    /// Create an empty config that searches `section_order`, first match wins.
    pub fn with_sections<I, S>(section_order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            section_order: section_order.into_iter().map(Into::into).collect(),
            sections: Vec::new(),
        }
    }

    pub fn section_order(&self) -> &[String] {
        &self.section_order
    }

    /// Names of all sections seen so far, in first-seen order.
    pub fn sections(&self) -> Vec<&str> {
        self.sections.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Raw value of `key` in `section`, before quote and comment cleanup.
    ///
    /// The outer `None` means the key is absent, the inner one that it has
    /// no value.
    #[allow(clippy::option_option)]
    pub fn raw(&self, section: &str, key: &str) -> Option<Option<&str>> {
        self.options(section)?
            .get(&normalize_key(key))
            .map(Option::as_deref)
    }

    fn options(&self, section: &str) -> Option<&Options> {
        self.sections
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, opts)| opts)
    }

    fn options_mut(&mut self, section: &str) -> &mut Options {
        if let Some(idx) = self.sections.iter().position(|(name, _)| name == section) {
            return &mut self.sections[idx].1;
        }
        self.sections.push((section.to_string(), Options::new()));
        let last = self.sections.len() - 1;
        &mut self.sections[last].1
    }

    /// Load my.cnf files in order.
    ///
    /// Paths that don't exist or aren't readable are skipped.
    pub fn load_cfgs<I, P>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in find_cfgs(paths) {
            self.load_cfg(&path)?;
        }
        Ok(())
    }

    /// Load the default option files, [`DEF_CFG_LIST`].
    pub fn load_default_cfgs(&mut self) -> Result<()> {
        self.load_cfgs(DEF_CFG_LIST)
    }

    /// Load a single my.cnf file.
    pub fn load_cfg(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| WmfdbError::io(path, e))?;
        self.load_str(&content, &path.display().to_string())?;
        debug!(path = %path.display(), "Loaded mysql config");
        Ok(())
    }

    /// Parse my.cnf contents. `source` names the input in error messages.
    pub fn load_str(&mut self, content: &str, source: &str) -> Result<()> {
        let mut current: Option<String> = None;
        let mut seen_sections: Vec<String> = Vec::new();
        let mut seen_keys: Vec<(String, String)> = Vec::new();

        for (idx, raw_line) in content.lines().enumerate() {
            let line_num = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('!') {
                debug!(source, line_num, line, "Skipping my.cnf directive");
                continue;
            }
            if let Some(name) = parse_header(line) {
                if seen_sections.iter().any(|s| s == name) {
                    return Err(WmfdbError::value(format!(
                        "While reading from '{source}' [line {line_num:2}]: \
                         section '{name}' already exists"
                    )));
                }
                seen_sections.push(name.to_string());
                self.options_mut(name);
                current = Some(name.to_string());
                continue;
            }
            let Some(section) = current.as_deref() else {
                return Err(WmfdbError::value(format!(
                    "File contains no section headers.\n\
                     file: '{source}', line: {line_num}\n{raw_line:?}"
                )));
            };
            let (key, value) = line.split_once('=').map_or_else(
                || (normalize_key(line), None),
                |(k, v)| (normalize_key(k.trim()), Some(v.trim().to_string())),
            );
            if key.is_empty() {
                return Err(WmfdbError::value(format!(
                    "Source contains parsing errors: '{source}'\n\t\
                     [line {line_num:2}]: {raw_line:?}"
                )));
            }
            if seen_keys.iter().any(|(s, k)| s == section && *k == key) {
                return Err(WmfdbError::value(format!(
                    "While reading from '{source}' [line {line_num:2}]: \
                     option '{key}' in section '{section}' already exists"
                )));
            }
            seen_keys.push((section.to_string(), key.clone()));
            self.options_mut(section).insert(key, value);
        }
        Ok(())
    }

    /// Search sections for `key`, returning `(section, cleaned value)`.
    fn get(&self, key: &str) -> Option<(&str, String)> {
        let key = normalize_key(key);
        self.section_order.iter().find_map(|sec| {
            self.options(sec)?
                .get(&key)
                .map(|val| (sec.as_str(), cleanup_value(val.as_deref())))
        })
    }

    /// String value of `key`, if present.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(|(_, val)| val)
    }

    /// Integer value of `key`, if present.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        let Some((sec, val)) = self.get(key) else {
            return Ok(None);
        };
        val.parse().map(Some).map_err(|_| {
            WmfdbError::value(format!(
                "Mysql config value [{sec}]{key} has non-integer value: \"{val}\""
            ))
        })
    }

    /// Float value of `key`, if present.
    pub fn get_float(&self, key: &str) -> Result<Option<f64>> {
        let Some((sec, val)) = self.get(key) else {
            return Ok(None);
        };
        val.parse().map(Some).map_err(|_| {
            WmfdbError::value(format!(
                "Mysql config value [{sec}]{key} has non-float value: \"{val}\""
            ))
        })
    }

    /// Boolean value of `key`, if present. Accepts true/1/on and false/0/off.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some((sec, val)) = self.get(key) else {
            return Ok(None);
        };
        match val.to_lowercase().as_str() {
            "true" | "1" | "on" => Ok(Some(true)),
            "false" | "0" | "off" => Ok(Some(false)),
            _ => Err(WmfdbError::value(format!(
                "Mysql config value [{sec}]{key} has non-boolean value: \"{val}\""
            ))),
        }
    }

    /// Whether a value-less key such as `ssl_verify_server_cert` is present.
    pub fn get_no_value(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Connection arguments for every client setting a my.cnf file can hold.
    pub fn conn_args(&self) -> Result<ConnArgs> {
        let port = self
            .get_int("port")?
            .map(|p| {
                u16::try_from(p).map_err(|_| {
                    WmfdbError::value(format!("Mysql config value port is out of range: {p}"))
                })
            })
            .transpose()?;
        let verify = self.get_no_value("ssl_verify_server_cert");
        Ok(ConnArgs {
            user: self.get_str("user"),
            password: self.get_str("password"),
            host: self.get_str("host"),
            database: self.get_str("database"),
            unix_socket: self.get_str("socket"),
            port,
            charset: self.get_str("default_character_set"),
            connect_timeout: self.get_float("connect_timeout")?,
            max_allowed_packet: self.get_str("max_allowed_packet"),
            bind_address: self.get_str("bind_address"),
            ssl_ca: self.get_str("ssl_ca"),
            ssl_cert: self.get_str("ssl_cert"),
            ssl_key: self.get_str("ssl_key"),
            ssl_verify_cert: verify,
            ssl_verify_identity: verify,
        })
    }
}

/// Arguments for opening a connection to a database instance.
///
/// `None` means "use the driver default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnArgs {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
    pub unix_socket: Option<String>,
    pub port: Option<u16>,
    pub charset: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout: Option<f64>,
    pub max_allowed_packet: Option<String>,
    pub bind_address: Option<String>,
    pub ssl_ca: Option<String>,
    pub ssl_cert: Option<String>,
    pub ssl_key: Option<String>,
    pub ssl_verify_cert: bool,
    pub ssl_verify_identity: bool,
}

/// Normalize a key: mysql accepts `a-b-c`, `a_b_c`, and even `a_b-c`.
pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

fn parse_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?;
    let end = inner.rfind(']')?;
    let name = &inner[..end];
    (!name.is_empty()).then_some(name)
}

/// Strip wrapping quotes, or an in-line comment from an unquoted value.
pub fn cleanup_value(val: Option<&str>) -> String {
    let Some(val) = val else {
        return String::new();
    };
    let bytes = val.as_bytes();
    if bytes.len() >= 2 && bytes[0] == bytes[bytes.len() - 1] && matches!(bytes[0], b'"' | b'\'')
    {
        return val[1..val.len() - 1].to_string();
    }
    if let Some(idx) = val.find('#') {
        return val[..idx].trim_end().to_string();
    }
    val.to_string()
}

/// Keep the readable files among `paths`, expanding a leading `~`.
pub fn find_cfgs<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|p| expand_home(p.as_ref()))
        .filter(|p| p.is_file() && fs::File::open(p).is_ok())
        .collect()
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}
