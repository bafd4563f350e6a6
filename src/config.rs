use std::str::FromStr;
use tracing::Level;

pub const DEFAULT_BASE_URL: &str = "https://mock-api-2p6p.onrender.com/v1/api";

/// Build-time configuration. Both values are baked into the wasm bundle, so
/// set `MAAS_BASE_URL` / `MAAS_LOG_LEVEL` before running `trunk build`.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub log_level: Level,
}

impl AppConfig {
    pub fn load() -> Self {
        Self::from_values(option_env!("MAAS_BASE_URL"), option_env!("MAAS_LOG_LEVEL"))
    }

    fn from_values(base_url: Option<&str>, log_level: Option<&str>) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);

        Self {
            base_url: clean_url(base_url),
            log_level: log_level
                .and_then(|l| Level::from_str(l.trim()).ok())
                .unwrap_or(Level::INFO),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

pub fn clean_url(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        let cfg = AppConfig::from_values(None, None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.log_level, Level::INFO);
    }

    #[test]
    fn trims_trailing_slashes_and_blank_values() {
        let cfg = AppConfig::from_values(Some("http://localhost:3000/api//"), Some("debug"));
        assert_eq!(cfg.base_url, "http://localhost:3000/api");
        assert_eq!(cfg.log_level, Level::DEBUG);

        let cfg = AppConfig::from_values(Some("   "), Some("nonsense"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.log_level, Level::INFO);
    }
}
