// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::matrix::PollingMatrix;

pub const ENV_CONFIG_PATH: &str = "FARE_WATCHER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/watcher.toml";

/// Process-wide, read-only settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub aviasales_token: String,
    pub telegram_bot_token: String,
    /// Chat that receives fare alerts.
    pub telegram_user_id: i64,
    pub affiliate_marker: String,

    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub dates: Vec<NaiveDate>,

    pub max_price: u64,
    pub max_duration_minutes: u32,
    /// Special offers must undercut `max_price` by this much.
    pub special_price_margin: u64,
    pub currency: String,
    pub offers_per_route: usize,

    pub check_interval_secs: u64,
    pub http_timeout_secs: u64,

    pub command_bot: bool,
    pub metrics_listen: Option<SocketAddr>,
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aviasales_token: String::new(),
            telegram_bot_token: String::new(),
            telegram_user_id: 0,
            affiliate_marker: String::new(),
            origins: Vec::new(),
            destinations: Vec::new(),
            dates: Vec::new(),
            max_price: 5000,
            max_duration_minutes: 1440,
            special_price_margin: 1000,
            currency: "rub".to_string(),
            offers_per_route: 1,
            check_interval_secs: 600,
            http_timeout_secs: 20,
            command_bot: true,
            metrics_listen: None,
            log_json: false,
        }
    }
}

impl Settings {
    /// Load from TOML, apply environment overrides, validate:
    /// 1) $FARE_WATCHER_CONFIG (must exist when set)
    /// 2) config/watcher.toml
    /// 3) built-in defaults
    pub fn load() -> Result<Self> {
        let base = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
                }
                Self::from_file(&pb)?
            }
            Err(_) => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        let mut settings = base;
        settings.apply_env(|k| std::env::var(k).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Override fields from variables visible through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string());

        if let Some(v) = get("AVIASALES_TOKEN") {
            self.aviasales_token = v;
        }
        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = v;
        }
        if let Some(v) = get("TELEGRAM_USER_ID") {
            self.telegram_user_id = parse_var("TELEGRAM_USER_ID", &v)?;
        }
        if let Some(v) = get("AFFILIATE_MARKER") {
            self.affiliate_marker = v;
        }
        if let Some(v) = get("ORIGINS") {
            self.origins = split_list(&v);
        }
        if let Some(v) = get("DESTINATIONS") {
            self.destinations = split_list(&v);
        }
        if let Some(v) = get("DATES") {
            self.dates = split_list(&v)
                .iter()
                .map(|d| {
                    NaiveDate::parse_from_str(d, "%Y-%m-%d")
                        .map_err(|_| anyhow!("DATES: `{d}` is not YYYY-MM-DD"))
                })
                .collect::<Result<_>>()?;
        }
        if let Some(v) = get("MAX_PRICE") {
            self.max_price = parse_var("MAX_PRICE", &v)?;
        }
        if let Some(v) = get("MAX_DURATION_MINUTES") {
            self.max_duration_minutes = parse_var("MAX_DURATION_MINUTES", &v)?;
        }
        if let Some(v) = get("SPECIAL_PRICE_MARGIN") {
            self.special_price_margin = parse_var("SPECIAL_PRICE_MARGIN", &v)?;
        }
        if let Some(v) = get("CURRENCY") {
            self.currency = v.to_ascii_lowercase();
        }
        if let Some(v) = get("OFFERS_PER_ROUTE") {
            self.offers_per_route = parse_var("OFFERS_PER_ROUTE", &v)?;
        }
        if let Some(v) = get("CHECK_INTERVAL_SECONDS") {
            self.check_interval_secs = parse_var("CHECK_INTERVAL_SECONDS", &v)?;
        }
        if let Some(v) = get("HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_var("HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("COMMAND_BOT_ENABLED") {
            self.command_bot = matches!(v.as_str(), "1" | "true" | "TRUE" | "True");
        }
        if let Some(v) = get("METRICS_LISTEN") {
            self.metrics_listen = if v.is_empty() {
                None
            } else {
                Some(parse_var("METRICS_LISTEN", &v)?)
            };
        }
        if let Some(v) = get("LOG_FORMAT") {
            self.log_json = v.eq_ignore_ascii_case("json");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.aviasales_token.is_empty() {
            bail!("AVIASALES_TOKEN is required");
        }
        if self.telegram_bot_token.is_empty() {
            bail!("TELEGRAM_BOT_TOKEN is required");
        }
        if self.telegram_user_id == 0 {
            bail!("TELEGRAM_USER_ID is required");
        }
        if self.origins.is_empty() || self.destinations.is_empty() || self.dates.is_empty() {
            bail!("ORIGINS, DESTINATIONS and DATES must each list at least one value");
        }
        if self.check_interval_secs == 0 {
            bail!("CHECK_INTERVAL_SECONDS must be positive");
        }
        if self.http_timeout_secs == 0 {
            bail!("HTTP_TIMEOUT_SECS must be positive");
        }
        Ok(())
    }

    pub fn matrix(&self) -> PollingMatrix {
        PollingMatrix {
            dates: self.dates.clone(),
            origins: self.origins.clone(),
            destinations: self.destinations.clone(),
        }
    }

    /// Ceiling applied to special offers; `None` when no `max_price` is set.
    pub fn special_max_price(&self) -> Option<u64> {
        (self.max_price > 0).then(|| self.max_price.saturating_sub(self.special_price_margin))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, v: &str) -> Result<T> {
    v.parse()
        .map_err(|_| anyhow!("{name}: cannot parse `{v}`"))
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|it| it.trim().to_ascii_uppercase())
        .filter(|it| !it.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn lists_are_trimmed_and_uppercased() {
        assert_eq!(split_list(" mow, LED ,,aer"), vec!["MOW", "LED", "AER"]);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut s = Settings::from_toml_str(
            r#"
origins = ["MOW"]
destinations = ["LED"]
dates = ["2025-06-01"]
max_price = 4000
"#,
        )
        .unwrap();
        let vars = env(&[
            ("ORIGINS", "KZN, MOW"),
            ("MAX_PRICE", "6000"),
            ("DATES", "2025-07-01,2025-07-02"),
            ("LOG_FORMAT", "json"),
        ]);
        s.apply_env(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(s.origins, vec!["KZN", "MOW"]);
        assert_eq!(s.destinations, vec!["LED"]);
        assert_eq!(s.max_price, 6000);
        assert_eq!(s.dates.len(), 2);
        assert!(s.log_json);
        assert_eq!(s.currency, "rub");
    }

    #[test]
    fn bad_number_is_reported_with_name() {
        let mut s = Settings::default();
        let vars = env(&[("MAX_PRICE", "cheap")]);
        let err = s.apply_env(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("MAX_PRICE"));
    }

    #[test]
    fn bad_date_is_rejected() {
        let mut s = Settings::default();
        let vars = env(&[("DATES", "2025-13-01")]);
        assert!(s.apply_env(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn validate_requires_credentials_and_matrix() {
        let mut s = Settings::default();
        assert!(s.validate().is_err());

        s.aviasales_token = "t".into();
        s.telegram_bot_token = "b".into();
        s.telegram_user_id = 7;
        assert!(s.validate().is_err());

        s.origins = vec!["MOW".into()];
        s.destinations = vec!["LED".into()];
        s.dates = vec![NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()];
        assert!(s.validate().is_ok());
    }

    #[test]
    fn special_ceiling_is_reduced_by_margin() {
        let mut s = Settings::default();
        s.max_price = 5000;
        s.special_price_margin = 1000;
        assert_eq!(s.special_max_price(), Some(4000));
        s.special_price_margin = 9000;
        assert_eq!(s.special_max_price(), Some(0));
        s.max_price = 0;
        assert_eq!(s.special_max_price(), None);
    }
}
