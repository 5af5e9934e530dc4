use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub qr: QrConfig,
    pub scanner: ScannerConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Timings for the rotating QR display
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QrConfig {
    /// Countdown used when the backend declares no rotation window
    pub default_rotation_seconds: u32,
    pub retry_delay_seconds: u64,
    pub session_expired_redirect_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScannerConfig {
    pub error_clear_seconds: u64,
    pub success_redirect_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionConfig {
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                timeout_seconds: 15,
            },
            qr: QrConfig {
                default_rotation_seconds: 30,
                retry_delay_seconds: 5,
                session_expired_redirect_seconds: 2,
            },
            scanner: ScannerConfig {
                error_clear_seconds: 3,
                success_redirect_seconds: 2,
            },
            session: SessionConfig {
                path: PathBuf::from(".evently/session.json"),
            },
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl QrConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn session_expired_redirect(&self) -> Duration {
        Duration::from_secs(self.session_expired_redirect_seconds)
    }
}

impl ScannerConfig {
    pub fn error_clear(&self) -> Duration {
        Duration::from_secs(self.error_clear_seconds)
    }

    pub fn success_redirect(&self) -> Duration {
        Duration::from_secs(self.success_redirect_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = config::Config::try_from(&Config::default())?;

        let s = config::Config::builder()
            .add_source(defaults)
            // All files are optional; the built-in defaults are complete
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked developer overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `EVENTLY__API__BASE_URL=https://fest.example.org/api`
            .add_source(config::Environment::with_prefix("EVENTLY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_portal_timings() {
        let config = Config::default();
        assert_eq!(config.qr.default_rotation_seconds, 30);
        assert_eq!(config.qr.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.scanner.error_clear(), Duration::from_secs(3));
        assert_eq!(config.scanner.success_redirect(), Duration::from_secs(2));
    }

    #[test]
    fn test_defaults_survive_layering() {
        let defaults = config::Config::try_from(&Config::default()).unwrap();
        let layered: Config = config::Config::builder()
            .add_source(defaults)
            .set_override("qr.retry_delay_seconds", 9_i64)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(layered.qr.retry_delay_seconds, 9);
        assert_eq!(layered.api, Config::default().api);
    }
}
