//! Configuration Vault – reads/writes `~/.proxguard/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use proxguard_perception::FusionConfig;
use serde::{Deserialize, Serialize};

/// Persisted node configuration stored in `~/.proxguard/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Identifier stamped on every event.
    #[serde(default = "default_sensor_id")]
    pub sensor_id: String,

    /// Endpoint of the signing service that receives events.
    #[serde(default = "default_signer_url")]
    pub signer_url: String,

    /// Per-event delivery timeout in milliseconds.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Fusion thresholds and loop period.
    #[serde(default)]
    pub fusion: FusionConfig,
}

fn default_sensor_id() -> String {
    "pi_sensor_01".to_string()
}
fn default_signer_url() -> String {
    "http://127.0.0.1:5002/sign".to_string()
}
fn default_send_timeout_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor_id: default_sensor_id(),
            signer_url: default_signer_url(),
            send_timeout_ms: default_send_timeout_ms(),
            fusion: FusionConfig::default(),
        }
    }
}

impl Config {
    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.sensor_id.trim().is_empty() {
            return Err("sensor_id must not be empty".to_string());
        }
        let interval = self.fusion.loop_interval_s;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(format!(
                "fusion.loop_interval_s must be a positive number of seconds, got {interval}"
            ));
        }
        if self.send_timeout_ms == 0 {
            return Err("send_timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Return the path to `~/.proxguard/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".proxguard").join("config.toml")
}

/// Load the config at `path`, writing defaults there first if it does not
/// exist yet. Environment overrides are applied after loading and are never
/// written back.
pub fn load_or_init(path: &Path) -> Result<Config, String> {
    let mut cfg = match load_from(path)? {
        Some(cfg) => cfg,
        None => {
            let cfg = Config::default();
            save_to(&cfg, path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            cfg
        }
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from `path`.  Returns `None` if the file does not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `PROXGUARD_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PROXGUARD_SIGNER_URL` | `signer_url` |
/// | `PROXGUARD_SENSOR_ID` | `sensor_id` |
/// | `PROXGUARD_LOOP_INTERVAL` | `fusion.loop_interval_s` |
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PROXGUARD_SIGNER_URL") {
        cfg.signer_url = v;
    }
    if let Ok(v) = std::env::var("PROXGUARD_SENSOR_ID") {
        cfg.sensor_id = v;
    }
    if let Ok(v) = std::env::var("PROXGUARD_LOOP_INTERVAL")
        && let Ok(secs) = v.parse::<f64>()
    {
        cfg.fusion.loop_interval_s = secs;
    }
}

/// Save the config to `path`, creating its directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
