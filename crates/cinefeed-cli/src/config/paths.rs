//! Config file location.
//!
//! Lookup order, first match wins:
//! 1. `--dir <DIR>`: `<DIR>/config.toml`
//! 2. `CINEFEED_CONFIG`: the file path itself
//! 3. `XDG_CONFIG_HOME`: `$XDG_CONFIG_HOME/cinefeed/config.toml`
//! 4. `HOME`: `$HOME/.config/cinefeed/config.toml`
//!
//! Blank environment values are treated as unset.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Environment variable naming the config file directly.
const CONFIG_FILE_ENV: &str = "CINEFEED_CONFIG";

/// File name used inside a config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory under the config home.
const APP_DIR: &str = "cinefeed";

/// Resolves the config file path from `--dir` and the process environment.
///
/// # Errors
///
/// Returns an error if no `--dir` is given and none of `CINEFEED_CONFIG`,
/// `XDG_CONFIG_HOME` or `HOME` is set.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    locate(dir.map(PathBuf::as_path), |key| std::env::var(key).ok())
}

/// Resolves the config file path, reading variables through `env`.
fn locate(dir: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE_NAME));
    }

    let var = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    if let Some(file) = var(CONFIG_FILE_ENV) {
        return Ok(PathBuf::from(file));
    }
    if let Some(xdg) = var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join(APP_DIR).join(CONFIG_FILE_NAME));
    }
    if let Some(home) = var("HOME") {
        return Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE_NAME));
    }

    bail!("cannot locate config file: set --dir, {CONFIG_FILE_ENV}, XDG_CONFIG_HOME or HOME")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_dir_wins_over_environment() {
        // Arrange
        let env = env_of(&[
            ("CINEFEED_CONFIG", "/etc/cinefeed.toml"),
            ("HOME", "/home/viewer"),
        ]);

        // Act
        let path = locate(Some(Path::new("/srv/profile")), env).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/srv/profile/config.toml"));
    }

    #[test]
    fn test_config_env_names_the_file() {
        // Arrange
        let env = env_of(&[
            ("CINEFEED_CONFIG", "/etc/cinefeed.toml"),
            ("XDG_CONFIG_HOME", "/home/viewer/.xdg"),
        ]);

        // Act
        let path = locate(None, env).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/etc/cinefeed.toml"));
    }

    #[test]
    fn test_xdg_config_home_before_home() {
        // Arrange
        let env = env_of(&[
            ("XDG_CONFIG_HOME", "/home/viewer/.xdg"),
            ("HOME", "/home/viewer"),
        ]);

        // Act
        let path = locate(None, env).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/home/viewer/.xdg/cinefeed/config.toml"));
    }

    #[test]
    fn test_home_fallback_and_blank_values_ignored() {
        // Arrange
        let env = env_of(&[
            ("CINEFEED_CONFIG", "  "),
            ("XDG_CONFIG_HOME", ""),
            ("HOME", "/home/viewer"),
        ]);

        // Act
        let path = locate(None, env).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/home/viewer/.config/cinefeed/config.toml"));
    }

    #[test]
    fn test_no_location_is_an_error() {
        // Arrange & Act
        let err = locate(None, env_of(&[])).unwrap_err();

        // Assert
        assert!(err.to_string().contains("CINEFEED_CONFIG"));
    }
}
