use demo_api::config::Config as DemoApiConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            sentry_dsn: None,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub demo_api: Option<DemoApiConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn demo_api_config() {
        let yaml = r#"
            logging:
                level: debug
                sentry_dsn: https://public@sentry.example.com/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            demo_api:
                listener:
                    host: 0.0.0.0
                    port: 8080
                admin_listener:
                    host: 127.0.0.1
                    port: 8081
                seed: 42
                distribution:
                    - name: 2xx
                      weight: 100
                      codes: [200]
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.common.logging.level, "debug");
        assert_eq!(
            config.common.logging.sentry_dsn.as_deref(),
            Some("https://public@sentry.example.com/1")
        );
        assert_eq!(
            config.common.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125,
            })
        );

        let demo_api_config = config.demo_api.expect("demo_api config");
        assert_eq!(demo_api_config.listener.port, 8080);
        assert_eq!(demo_api_config.seed, Some(42));
        assert!(demo_api_config.validate().is_ok());
    }

    #[test]
    fn defaults_when_sections_missing() {
        let yaml = r#"
            demo_api:
                listener: {host: 0.0.0.0, port: 8080}
                admin_listener: {host: 127.0.0.1, port: 8081}
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.common, CommonConfig::default());
        assert_eq!(config.common.logging.level, "info");
    }

    #[test]
    fn example_config_is_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../example_config.yaml");
        let config = Config::from_file(&path).expect("load example config");

        let demo_api_config = config.demo_api.expect("demo_api config");
        assert!(demo_api_config.validate().is_ok());
        assert_eq!(
            demo_api_config.build_distribution().unwrap(),
            statusgen::Distribution::default()
        );
    }

    #[test]
    fn load_errors() {
        let missing = Config::from_file(std::path::Path::new("/nonexistent/flaky.yaml"));
        assert!(matches!(missing.unwrap_err(), ConfigError::LoadError(_)));

        let tmp = write_tmp_file("demo_api: [not, a, map]");
        let invalid = Config::from_file(tmp.path());
        assert!(matches!(invalid.unwrap_err(), ConfigError::ParseError(_)));
    }
}
