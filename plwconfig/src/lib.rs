//! # PlaylistWatch Configuration Module
//!
//! This module provides configuration management for PlaylistWatch,
//! including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Validation of required values at startup
//!
//! Unlike a global singleton, [`Config::load`] returns an owned,
//! immutable value: it is constructed once at startup, passed explicitly
//! to whoever needs it, and changing it requires a restart.
//!
//! ## Usage
//!
//! ```no_run
//! use plwconfig::Config;
//!
//! let config = Config::load("")?;
//! println!("watching {}", config.playlist_url());
//! println!("checking every {:?}", config.poll_interval());
//! # Ok::<(), plwconfig::ConfigError>(())
//! ```

use dirs::home_dir;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;
use url::Url;

// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("playlistwatch.yaml");

const ENV_CONFIG_DIR: &str = "PLAYLISTWATCH_CONFIG";
const ENV_PREFIX: &str = "PLAYLISTWATCH_CONFIG__";
/// Convenience override matching the variable the bot historically used
const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const CONFIG_DIR_NAME: &str = ".playlistwatch";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading the configuration.
///
/// Every variant is fatal: configuration problems are the one failure
/// class the process does not recover from at runtime.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid YAML
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required setting has no value
    #[error("missing required setting '{key}' (set it in config.yaml or via {env_var})")]
    Missing {
        key: &'static str,
        env_var: &'static str,
    },

    /// A setting has an unusable value
    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The config directory cannot be used
    #[error("config directory {path} is not usable: {reason}")]
    BadDirectory { path: String, reason: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    playlist: RawPlaylist,
    telegram: RawTelegram,
    state: RawState,
    logger: RawLogger,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawPlaylist {
    url: String,
    poll_interval_secs: u64,
}

impl Default for RawPlaylist {
    fn default() -> Self {
        Self {
            url: String::new(),
            poll_interval_secs: 300,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTelegram {
    bot_token: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawState {
    file: String,
}

impl Default for RawState {
    fn default() -> Self {
        Self {
            file: "playlist_state.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawLogger {
    filter: String,
}

impl Default for RawLogger {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Immutable process-wide configuration
///
/// Constructed once by [`Config::load`] and valid for the lifetime of the
/// process.
#[derive(Debug, Clone)]
pub struct Config {
    config_dir: PathBuf,
    playlist_url: String,
    poll_interval: Duration,
    bot_token: String,
    chat_id: String,
    state_file: PathBuf,
    log_filter: String,
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// The configuration is assembled in layers:
    /// 1. The embedded default configuration
    /// 2. `config.yaml` from the config directory, if present
    /// 3. `PLAYLISTWATCH_CONFIG__SECTION__KEY` environment overrides
    /// 4. `TELEGRAM_BOT_TOKEN` as a shortcut for the bot credential
    ///
    /// The config directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PLAYLISTWATCH_CONFIG` environment variable
    /// 3. `.playlistwatch` in the current directory
    /// 4. `.playlistwatch` in the user's home directory
    ///
    /// It is created if it doesn't exist and probed for read/write
    /// permissions, since the state file defaults to living inside it.
    pub fn load(directory: &str) -> Result<Self> {
        let mut env: Vec<(String, String)> = env::vars().collect();
        if let Ok(token) = env::var(ENV_BOT_TOKEN) {
            env.push((format!("{ENV_PREFIX}TELEGRAM__BOT_TOKEN"), token));
        }
        Self::load_with_env(directory, env)
    }

    fn load_with_env(directory: &str, env: Vec<(String, String)>) -> Result<Self> {
        let config_dir = Self::resolve_config_dir(directory, &env);
        Self::validate_config_dir(&config_dir)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let mut merged: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&config_path) {
            Ok(bytes) => {
                info!(config_file = %config_path.display(), "loaded config file");
                let external: Value = serde_yaml::from_slice(&bytes)?;
                merge_yaml(&mut merged, &lower_keys(external));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    config_file = %config_path.display(),
                    "config file not found, using embedded defaults"
                );
            }
            Err(e) => return Err(e.into()),
        }

        apply_env_overrides(&mut merged, &env);

        let raw: RawConfig = serde_yaml::from_value(merged)?;
        Self::validate(config_dir, raw)
    }

    fn resolve_config_dir(directory: &str, env: &[(String, String)]) -> PathBuf {
        // 1. Explicitly provided directory
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        // 2. Environment variable
        if let Some((_, path)) = env.iter().find(|(k, _)| k == ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %path, "using config dir from env");
            return PathBuf::from(path);
        }

        // 3. Current directory
        let local = PathBuf::from(CONFIG_DIR_NAME);
        if local.exists() {
            return local;
        }

        // 4. Home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        // Default fallback
        local
    }

    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(ConfigError::BadDirectory {
                path: path.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        // Probe write permission; the state file lives here by default.
        let probe = path.join(".write_test");
        fs::write(&probe, b"test")?;
        fs::remove_file(&probe)?;

        Ok(())
    }

    fn validate(config_dir: PathBuf, raw: RawConfig) -> Result<Self> {
        if raw.playlist.url.is_empty() {
            return Err(ConfigError::Missing {
                key: "playlist.url",
                env_var: "PLAYLISTWATCH_CONFIG__PLAYLIST__URL",
            });
        }
        Url::parse(&raw.playlist.url).map_err(|e| ConfigError::Invalid {
            key: "playlist.url",
            reason: e.to_string(),
        })?;

        if raw.playlist.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "playlist.poll_interval_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }

        if raw.telegram.bot_token.is_empty() {
            return Err(ConfigError::Missing {
                key: "telegram.bot_token",
                env_var: ENV_BOT_TOKEN,
            });
        }
        if raw.telegram.chat_id.is_empty() {
            return Err(ConfigError::Missing {
                key: "telegram.chat_id",
                env_var: "PLAYLISTWATCH_CONFIG__TELEGRAM__CHAT_ID",
            });
        }

        let state_file = {
            let path = PathBuf::from(&raw.state.file);
            if path.is_absolute() {
                path
            } else {
                config_dir.join(path)
            }
        };

        Ok(Self {
            config_dir,
            playlist_url: raw.playlist.url,
            poll_interval: Duration::from_secs(raw.playlist.poll_interval_secs),
            bot_token: raw.telegram.bot_token,
            chat_id: raw.telegram.chat_id,
            state_file,
            log_filter: raw.logger.filter,
        })
    }

    /// The configuration directory in use
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Playlist page URL to watch
    pub fn playlist_url(&self) -> &str {
        &self.playlist_url
    }

    /// Time between scheduled checks
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Telegram bot credential
    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    /// Chat receiving the notifications
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Absolute path of the snapshot state file
    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Default tracing filter directive
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }
}

/// Merges external YAML configuration into the default configuration.
///
/// Mappings merge key-by-key; scalars and sequences from `external`
/// replace the default value.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

/// Lowercase all mapping keys so the file's casing doesn't matter
fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        _ => value,
    }
}

/// Apply `PLAYLISTWATCH_CONFIG__SECTION__KEY=value` overrides
fn apply_env_overrides(config: &mut Value, env: &[(String, String)]) {
    for (key, value) in env {
        if let Some(key_path) = key.strip_prefix(ENV_PREFIX) {
            let path: Vec<String> = key_path
                .split("__")
                .map(|segment| segment.to_lowercase())
                .collect();
            set_value(config, &path, convert_env_value(value));
        }
    }
}

fn set_value(data: &mut Value, path: &[String], value: Value) {
    if path.is_empty() {
        *data = value;
        return;
    }
    if let Value::Mapping(map) = data {
        let key = Value::String(path[0].clone());
        if path.len() == 1 {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value(entry, &path[1..], value);
        }
    }
}

/// Parse an env value as YAML so numbers and booleans come out typed
fn convert_env_value(value: &str) -> Value {
    if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
        return parsed;
    }
    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, yaml: &str) {
        fs::write(dir.join(CONFIG_FILE_NAME), yaml).unwrap();
    }

    fn base_yaml() -> &'static str {
        r#"
playlist:
  url: "https://soundcloud.com/someone/sets/test"
telegram:
  bot_token: "123:abc"
  chat_id: "987"
"#
    }

    fn load_from(dir: &Path, env: Vec<(String, String)>) -> Result<Config> {
        Config::load_with_env(dir.to_str().unwrap(), env)
    }

    #[test]
    fn test_file_values_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), base_yaml());

        let config = load_from(dir.path(), Vec::new()).unwrap();

        assert_eq!(
            config.playlist_url(),
            "https://soundcloud.com/someone/sets/test"
        );
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
        assert_eq!(config.bot_token(), "123:abc");
        assert_eq!(config.chat_id(), "987");
        assert_eq!(config.log_filter(), "info");
        assert_eq!(
            config.state_file(),
            dir.path().join("playlist_state.json")
        );
    }

    #[test]
    fn test_env_override_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), base_yaml());

        let env = vec![(
            "PLAYLISTWATCH_CONFIG__PLAYLIST__POLL_INTERVAL_SECS".to_string(),
            "60".to_string(),
        )];
        let config = load_from(dir.path(), env).unwrap();

        assert_eq!(config.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_bot_token_from_dedicated_env_var() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
playlist:
  url: "https://soundcloud.com/someone/sets/test"
telegram:
  chat_id: "987"
"#,
        );

        // Config::load maps TELEGRAM_BOT_TOKEN onto this override key.
        let env = vec![(
            format!("{ENV_PREFIX}TELEGRAM__BOT_TOKEN"),
            "env-token".to_string(),
        )];
        let config = load_from(dir.path(), env).unwrap();

        assert_eq!(config.bot_token(), "env-token");
    }

    #[test]
    fn test_missing_required_values_are_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_from(dir.path(), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                key: "playlist.url",
                ..
            }
        ));

        write_config(
            dir.path(),
            r#"
playlist:
  url: "https://soundcloud.com/someone/sets/test"
"#,
        );
        let err = load_from(dir.path(), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                key: "telegram.bot_token",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
playlist:
  url: "not a url"
telegram:
  bot_token: "123:abc"
  chat_id: "987"
"#,
        );

        let err = load_from(dir.path(), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "playlist.url",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), base_yaml());

        let env = vec![(
            "PLAYLISTWATCH_CONFIG__PLAYLIST__POLL_INTERVAL_SECS".to_string(),
            "0".to_string(),
        )];
        let err = load_from(dir.path(), env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_absolute_state_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("elsewhere").join("state.json");
        write_config(
            dir.path(),
            &format!(
                "{}\nstate:\n  file: \"{}\"\n",
                base_yaml(),
                state.display()
            ),
        );

        let config = load_from(dir.path(), Vec::new()).unwrap();
        assert_eq!(config.state_file(), state);
    }

    #[test]
    fn test_uppercase_file_keys_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
PLAYLIST:
  URL: "https://soundcloud.com/someone/sets/test"
telegram:
  bot_token: "123:abc"
  chat_id: "987"
"#,
        );

        let config = load_from(dir.path(), Vec::new()).unwrap();
        assert_eq!(
            config.playlist_url(),
            "https://soundcloud.com/someone/sets/test"
        );
    }

    #[test]
    fn test_merge_yaml_merges_mappings_and_replaces_scalars() {
        let mut default: Value = serde_yaml::from_str("a: 1\nb:\n  c: 2\n  d: 3").unwrap();
        let external: Value = serde_yaml::from_str("b:\n  c: 9\ne: 4").unwrap();

        merge_yaml(&mut default, &external);

        let merged: Value = serde_yaml::from_str("a: 1\nb:\n  c: 9\n  d: 3\ne: 4").unwrap();
        assert_eq!(default, merged);
    }
}
