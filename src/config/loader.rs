//! Layered config loading
//!
//! Defaults, then the config file, then `REPO_FLATTEN_*` environment
//! variables. A missing or broken file never aborts a run.

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::domain::Config;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const ENV_PREFIX: &str = "REPO_FLATTEN_";

/// Load configuration, falling back to defaults on any problem.
pub fn load_config(config_path: Option<&Path>) -> Config {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let defaults = Figment::from(Serialized::defaults(Config::default()));

    let figment = if path.is_file() {
        debug!(path = %path.display(), "loading config file");
        with_file(defaults, &path)
    } else {
        warn!(path = %path.display(), "config file not found, using default configuration");
        defaults
    };

    match figment.merge(Env::prefixed(ENV_PREFIX)).extract::<Config>() {
        Ok(config) => config,
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to load config, using default configuration");
            Config::default()
        }
    }
}

fn with_file(figment: Figment, path: &Path) -> Figment {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Json::file(path)),
    }
}
