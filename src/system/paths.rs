//! Well-known file locations touched during provisioning
//!
//! Everything the tool mutates hangs off one of three roots: the XAMPP
//! install directory, the user's home, and the per-user config directory.
//! `with_base` points all three under a single directory for tests.

use std::path::{Path, PathBuf};

/// Windows hosts file location
pub const HOSTS_FILE: &str = r"C:\Windows\System32\drivers\etc\hosts";

/// Resolved system paths
#[derive(Debug, Clone)]
pub struct SystemPaths {
    /// XAMPP install root (default: C:\xampp)
    stack_root: PathBuf,
    /// System hosts file
    hosts: PathBuf,
    /// User home directory (.npmrc lives here)
    home: PathBuf,
    /// Per-user config directory (Composer auth.json lives under it)
    config_home: PathBuf,
}

impl SystemPaths {
    /// Resolve real system locations for the given stack root
    pub fn new(stack_root: impl AsRef<Path>) -> Self {
        Self {
            stack_root: stack_root.as_ref().to_path_buf(),
            hosts: PathBuf::from(HOSTS_FILE),
            home: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            config_home: dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Place every location under one base directory (useful for testing)
    pub fn with_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            stack_root: base.join("xampp"),
            hosts: base.join("hosts"),
            home: base.to_path_buf(),
            config_home: base.join("config"),
        }
    }

    pub fn stack_root(&self) -> &Path {
        &self.stack_root
    }

    pub fn hosts(&self) -> &Path {
        &self.hosts
    }

    /// Per-user npm config
    pub fn npmrc(&self) -> PathBuf {
        self.home.join(".npmrc")
    }

    /// Machine-scoped Composer auth file
    pub fn composer_auth(&self) -> PathBuf {
        self.config_home.join("Composer").join("auth.json")
    }

    /// Main Apache config inside the stack
    pub fn apache_conf(&self) -> PathBuf {
        self.stack_root.join("apache").join("conf").join("httpd.conf")
    }

    pub fn php_ini(&self) -> PathBuf {
        self.stack_root.join("php").join("php.ini")
    }

    /// Binary directories registered on the machine PATH
    pub fn php_dir(&self) -> PathBuf {
        self.stack_root.join("php")
    }

    pub fn apache_bin(&self) -> PathBuf {
        self.stack_root.join("apache").join("bin")
    }

    pub fn mysql_bin(&self) -> PathBuf {
        self.stack_root.join("mysql").join("bin")
    }
}
