//! Loading a [`kb_session::SessionConfig`] from a `--config` file.
//!
//! The file format is picked by extension: `.toml` parses as TOML,
//! anything else (including no extension) parses as JSON. Either format
//! only needs to set the keys it wants to override — missing keys fall
//! back to [`kb_session::SessionConfig::default`].

use std::fmt;
use std::path::Path;

use kb_session::SessionConfig;

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "couldn't read config file: {e}"),
            ConfigError::Toml(e) => write!(f, "couldn't parse config as TOML: {e}"),
            ConfigError::Json(e) => write!(f, "couldn't parse config as JSON: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load(path: &Path) -> Result<SessionConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
    if path.extension().and_then(|e| e.to_str()) == Some("toml") {
        toml::from_str(&text).map_err(ConfigError::Toml)
    } else {
        serde_json::from_str(&text).map_err(ConfigError::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_toml_override() {
        let mut f = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(f, "closedWorldAssumption = true\nmaxReasonerIterations = 42").unwrap();
        let cfg = load(f.path()).unwrap();
        assert!(cfg.closed_world_assumption);
        assert_eq!(cfg.max_reasoner_iterations, 42);
    }

    #[test]
    fn loads_json_override() {
        let mut f = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        writeln!(f, r#"{{"closedWorldAssumption": true}}"#).unwrap();
        let cfg = load(f.path()).unwrap();
        assert!(cfg.closed_world_assumption);
    }

    #[test]
    fn missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/kb-config-test.toml");
        assert!(load(missing).is_err());
    }
}
