use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::HeraldConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["herald.toml", "herald.yaml", "herald.yml", "herald.json"];

/// Load config from the given path (any supported format).
///
/// Relative plugin directories are resolved against the file's directory.
pub fn load_config(path: &Path) -> Result<HeraldConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let substituted = substitute_env(&raw);
    for name in &substituted.unresolved {
        warn!(path = %path.display(), var = %name, "config references unset environment variable");
    }
    let mut config = parse_config(&substituted.text, path)?;
    if let Some(base) = path.parent() {
        config.directories = config.directories.resolved_against(base);
    }
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./herald.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/herald.{toml,yaml,yml,json}` (user-global)
///
/// Returns `HeraldConfig::default()` if no config file is found.
///
/// # Errors
///
/// A config file that exists but cannot be read or parsed.
pub fn discover_and_load() -> Result<HeraldConfig> {
    match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)
        },
        None => {
            debug!("no config file found, using defaults");
            Ok(HeraldConfig::default())
        },
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/herald/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "herald").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<HeraldConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let parse_err = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "json" => serde_json::from_str(raw).map_err(|e| parse_err(e.to_string())),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::time::Duration};

    #[test]
    fn loads_toml_and_resolves_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("herald.toml");
        std::fs::write(
            &path,
            "[directories]\ncommands = \"plugins/commands\"\n[presence]\ninterval = \"20s\"\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(
            cfg.directories.commands.unwrap(),
            dir.path().join("plugins/commands")
        );
        assert_eq!(cfg.presence.interval, Duration::from_secs(20));
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("herald.yaml");
        std::fs::write(&yaml, "bot:\n  prefix: \"$\"\nlogging:\n  json: true\n").unwrap();
        let cfg = load_config(&yaml).unwrap();
        assert_eq!(cfg.bot.prefix, "$");
        assert!(cfg.logging.json);

        let json = dir.path().join("herald.json");
        std::fs::write(&json, r#"{"registry": {"duplicate_policy": "reject"}}"#).unwrap();
        let cfg = load_config(&json).unwrap();
        assert_eq!(
            cfg.registry.duplicate_policy,
            crate::schema::DuplicatePolicy::Reject
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("herald.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(matches!(
            load_config(&path).unwrap_err(),
            Error::UnsupportedFormat(ext) if ext == "ini"
        ));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("herald.toml");
        std::fs::write(&path, "[bot\nprefix = 1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("herald.toml"), "{err}");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_config(Path::new("/definitely/not/here/herald.toml")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn find_in_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("herald.json"), "{}").unwrap();
        std::fs::write(dir.path().join("herald.toml"), "").unwrap();
        assert_eq!(find_in(dir.path()).unwrap(), dir.path().join("herald.toml"));
    }
}
