//! On-disk layout: `<data-dir>/config.toml` holds the three role identities,
//! `<data-dir>/engine.db` holds the engine.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};

use resonance_core::{Address, Roles};

use crate::error::Result;
use crate::store::Store;

pub const DATA_DIR_ENV: &str = "RC_DATA_DIR";
pub const CONFIG_FILE: &str = "config.toml";
pub const DB_FILE: &str = "engine.db";

/// Default base directory for engine storage.
fn default_base_dir() -> PathBuf {
    dirs_home().join(".resonance-calc")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub curator: Address,
    pub oracle: Address,
    pub keeper: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub roles: RoleConfig,
}

impl Config {
    pub fn new(curator: Address, oracle: Address, keeper: Address) -> Self {
        Config {
            roles: RoleConfig {
                curator,
                oracle,
                keeper,
            },
        }
    }

    /// Fails with `ZeroAddress` if any identity is zero.
    pub fn roles(&self) -> Result<Roles> {
        Ok(Roles::new(
            self.roles.curator,
            self.roles.oracle,
            self.roles.keeper,
        )?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.roles()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// A resolved data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// `explicit`, else `$RC_DATA_DIR`, else `$HOME/.resonance-calc`.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => env::var_os(DATA_DIR_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_base_dir),
        };
        DataDir { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(DB_FILE)
    }

    pub fn is_initialized(&self) -> bool {
        self.config_path().exists()
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.config_path())
    }

    /// Create the directory if needed and write `config`.
    pub fn write_config(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        config.save(&self.config_path())?;
        tracing::info!(path = %self.config_path().display(), "config written");
        Ok(())
    }

    pub fn open_store(&self) -> Result<Store> {
        fs::create_dir_all(&self.root)?;
        Store::open(&self.db_path())
    }
}
