//! Config file loading and flag overrides.

use anyhow::{Context, Result};
use kvfeed_engine::{EngineConfig, UnrecognizedKeys};
use kvfeed_store::ConsulConfig;
use serde::Deserialize;
use std::path::Path;

/// Contents of the JSON config file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub engine: EngineConfig,
    pub consul: ConsulConfig,
}

/// Values given on the command line or in the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub consul_address: Option<String>,
    pub consul_token: Option<String>,
    pub prefix: Option<String>,
    pub secret_key: Option<String>,
    pub skip_unrecognized: bool,
}

impl Settings {
    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(address) = overrides.consul_address {
            self.consul.address = address;
        }
        if let Some(token) = overrides.consul_token {
            self.consul.token = Some(token);
        }
        if let Some(prefix) = overrides.prefix {
            self.engine.prefix = prefix;
        }
        if let Some(secret_key) = overrides.secret_key {
            self.engine.secret_key = Some(secret_key);
        }
        if overrides.skip_unrecognized {
            self.engine.unrecognized_keys = UnrecognizedKeys::Skip;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_path_gives_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.engine.prefix, "vulcand");
        assert_eq!(settings.consul.address, "http://127.0.0.1:8500");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config(r#"{"engine":{"prefix":"lb","unrecognized_keys":"skip"}}"#);
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.engine.prefix, "lb");
        assert_eq!(settings.engine.unrecognized_keys, UnrecognizedKeys::Skip);
        assert_eq!(settings.consul.wait_time_secs, 300);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let file = write_config(r#"{"etcd":{}}"#);
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = write_config(
            r#"{"engine":{"prefix":"lb"},"consul":{"address":"http://consul:8500"}}"#,
        );
        let settings = Settings::load(Some(file.path())).unwrap().apply(Overrides {
            consul_address: Some("http://10.0.0.1:8500".into()),
            prefix: Some("lb2".into()),
            secret_key: Some("00".repeat(32)),
            skip_unrecognized: true,
            ..Default::default()
        });
        assert_eq!(settings.consul.address, "http://10.0.0.1:8500");
        assert_eq!(settings.engine.prefix, "lb2");
        assert_eq!(settings.engine.secret_key.as_deref(), Some("00".repeat(32).as_str()));
        assert_eq!(settings.engine.unrecognized_keys, UnrecognizedKeys::Skip);
        assert!(settings.engine.validate().is_ok());
    }
}
