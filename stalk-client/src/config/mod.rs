use secrecy::Secret;
use serde::Deserialize;
use stalk_core::AppError;
use std::time::Duration;
use validator::Validate;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub stocks: StockSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub name: String,
    /// Access token to sign in with at startup (`APP_APPLICATION__ACCESS_TOKEN`).
    #[serde(default)]
    pub access_token: Option<Secret<String>>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Backend REST base URL, without trailing slash.
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Deserialize, Clone, Debug, Validate)]
pub struct SessionSettings {
    /// WebSocket endpoint of the signaling service.
    pub signaling_url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Capacity of the inbound and outbound frame queues.
    #[serde(default = "default_channel_buffer")]
    #[validate(range(min = 1))]
    pub channel_buffer: usize,
}

impl SessionSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_send_timeout_ms() -> u64 {
    5_000
}

fn default_channel_buffer() -> usize {
    64
}

#[derive(Deserialize, Clone, Debug, Validate)]
pub struct StockSettings {
    #[serde(default = "default_poll_interval_secs")]
    #[validate(range(min = 1))]
    pub poll_interval_secs: u64,
}

impl StockSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint; export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Reject values that would only fail later, inside a spawned task.
    pub fn validate(&self) -> Result<(), AppError> {
        self.session.validate()?;
        self.stocks.validate()?;
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let settings = stalk_core::config::load::<Settings>("stalk-client")?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let stocks = StockSettings {
            poll_interval_secs: 0,
        };
        assert!(stocks.validate().is_err());

        let stocks = StockSettings {
            poll_interval_secs: 1,
        };
        assert!(stocks.validate().is_ok());
    }

    #[test]
    fn test_zero_channel_buffer_is_rejected() {
        let session = SessionSettings {
            signaling_url: "ws://localhost:4443/signal".into(),
            connect_timeout_ms: 1_000,
            send_timeout_ms: 1_000,
            channel_buffer: 0,
        };
        assert!(matches!(
            session.validate().map_err(AppError::from),
            Err(AppError::ValidationError(_))
        ));
    }
}
