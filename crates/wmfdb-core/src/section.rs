//! Mapping between replication section names and instance ports.
//!
//! Multi-instance hosts run one mysqld per section, each on its own port.
//! The mapping lives in a two-column CSV file (`name, port`).

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, WmfdbError};

/// Location of the section map on production hosts.
pub const DEFAULT_CFG_PATH: &str = "/etc/wmfmariadbpy/section_ports.csv";

/// When set (to any value), [`SectionMap::load`] uses [`TEST_DATA`] instead
/// of reading the default config file.
pub const TEST_DATA_ENV: &str = "WMFDB_SECTION_MAP_TEST_DATA";

/// Section map used when [`TEST_DATA_ENV`] is set.
pub const TEST_DATA: &str = "\
f0, 10110
f1, 10111
f2, 10112
f3, 10113
alpha, 10320
";

/// Name of the section served on the standard mysql port.
pub const DEFAULT_SECTION: &str = "default";

/// Standard mysql port.
pub const DEFAULT_PORT: u16 = 3306;

/// Prometheus exporter port of the default section.
pub const DEFAULT_PROM_PORT: u32 = 9104;

/// Bidirectional map between section names and ports.
#[derive(Debug, Clone, Default)]
pub struct SectionMap {
    by_section: HashMap<String, u16>,
    by_port: HashMap<u16, String>,
}

impl SectionMap {
    /// A map with no entries. Only the default section resolves.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the section map.
    ///
    /// With no `path`, [`TEST_DATA`] is used if [`TEST_DATA_ENV`] is present
    /// in the environment, otherwise [`DEFAULT_CFG_PATH`] is read.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = Self::read_cfg(path)?;
        let map = Self::parse(&cfg)?;
        debug!(sections = map.by_section.len(), "Loaded section map");
        Ok(map)
    }

    fn read_cfg(path: Option<&Path>) -> Result<String> {
        if path.is_none() && env::var_os(TEST_DATA_ENV).is_some() {
            debug!("{TEST_DATA_ENV} is set, using built-in section map");
            return Ok(TEST_DATA.to_string());
        }
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CFG_PATH));
        fs::read_to_string(path).map_err(|e| WmfdbError::io(path, e))
    }

    /// Parse section map contents.
    ///
    /// Line numbers in error messages are zero-based.
    pub fn parse(cfg: &str) -> Result<Self> {
        let mut map = Self::default();
        for (line_num, line) in cfg.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            let [section, port_str] = fields.as_slice() else {
                return Err(WmfdbError::value(format!(
                    "Line {line_num} of config has {} fields, expected 2",
                    fields.len()
                )));
            };
            if section.trim().is_empty() {
                return Err(WmfdbError::value(format!(
                    "Line {line_num} of config has a blank section entry"
                )));
            }
            let port: u16 = port_str.trim().parse().map_err(|_| {
                WmfdbError::value(format!(
                    "Line {line_num} of config has a invalid port number: {port_str}"
                ))
            })?;
            map.by_section.insert((*section).to_string(), port);
            map.by_port.insert(port, (*section).to_string());
        }
        Ok(map)
    }

    /// All known section names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_section.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All known section ports, sorted.
    pub fn ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self.by_port.keys().copied().collect();
        ports.sort_unstable();
        ports
    }

    /// Look up a section by name. [`DEFAULT_SECTION`] always resolves.
    pub fn by_name(&self, name: &str) -> Result<Section> {
        if name == DEFAULT_SECTION {
            return Section::new(DEFAULT_SECTION, DEFAULT_PORT);
        }
        let port = self
            .by_section
            .get(name)
            .ok_or_else(|| WmfdbError::value(format!("Invalid section name {name}")))?;
        Section::new(name, *port)
    }

    /// Look up a section by port. [`DEFAULT_PORT`] always resolves.
    pub fn by_port(&self, port: u16) -> Result<Section> {
        if port == DEFAULT_PORT {
            return Section::new(DEFAULT_SECTION, DEFAULT_PORT);
        }
        let name = self
            .by_port
            .get(&port)
            .ok_or_else(|| WmfdbError::value(format!("Invalid port number {port}")))?;
        Section::new(name, port)
    }
}

/// A validated (name, port) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    port: u16,
}

impl Section {
    /// Create a section.
    ///
    /// The default section and the default port must go together.
    pub fn new(name: &str, port: u16) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(WmfdbError::value(format!("Empty/blank section name \"{name}\"")));
        }
        if port == 0 {
            return Err(WmfdbError::value(format!("Invalid port number, {port}")));
        }
        if name == DEFAULT_SECTION && port != DEFAULT_PORT {
            return Err(WmfdbError::value(format!(
                "Section {name} must have default port ({DEFAULT_PORT}), not {port}"
            )));
        }
        if port == DEFAULT_PORT && name != DEFAULT_SECTION {
            return Err(WmfdbError::value(format!(
                "Port {port} must have {DEFAULT_SECTION} section name, not {name}"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    fn is_default(&self) -> bool {
        self.name == DEFAULT_SECTION
    }

    /// Unix socket of the section's mysqld, e.g. `/run/mysqld/mysqld.s8.sock`.
    pub fn socket_path(&self) -> PathBuf {
        if self.is_default() {
            return PathBuf::from("/run/mysqld/mysqld.sock");
        }
        PathBuf::from(format!("/run/mysqld/mysqld.{}.sock", self.name))
    }

    /// Data directory of the section's mysqld, e.g. `/srv/sqldata.s8`.
    pub fn datadir(&self) -> PathBuf {
        if self.is_default() {
            return PathBuf::from("/srv/sqldata");
        }
        PathBuf::from(format!("/srv/sqldata.{}", self.name))
    }

    /// Port of the section's prometheus exporter.
    pub fn prom_port(&self) -> u32 {
        if self.is_default() {
            return DEFAULT_PROM_PORT;
        }
        u32::from(self.port) + 10000
    }
}
