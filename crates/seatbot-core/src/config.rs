use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18890;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Every outbound portal call is capped at this; a slow portal reply is a
/// failed attempt, not a hung task.
pub const PORTAL_TIMEOUT_SECS: u64 = 10;

/// Top-level config (seatbot.toml + SEATBOT_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatbotConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for SeatbotConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            portal: PortalConfig::default(),
            booking: BookingConfig::default(),
            scheduler: SchedulerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// The remote reservation portal. Host and header values mimic the WeChat
/// in-app browser the portal expects; changing them usually breaks login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Exact host name, also the cookie domain for the "exact host" records.
    #[serde(default = "default_host")]
    pub host: String,
    /// Wall-clock time at which the portal opens next-day bookings, `HH:MM`.
    /// Also the literal marker the portal embeds in "not yet open" refusals.
    #[serde(default = "default_opening_time")]
    pub opening_time: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_host(),
            opening_time: default_opening_time(),
            user_agent: default_user_agent(),
        }
    }
}

/// One prefix→region inference rule. The portal's recommendation endpoint
/// wants a region id, but callers only know seat codes; the prefix table
/// encodes the portal's numbering convention and is deliberately
/// configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRule {
    pub prefix: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Total booking attempts per seat, including the first (retry gate cap).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between retry-gate attempts.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Region used when no prefix rule matches a seat code.
    #[serde(default = "default_region")]
    pub default_region: String,
    /// First-match-wins, evaluated in declaration order.
    #[serde(default = "default_region_rules")]
    pub region_rules: Vec<RegionRule>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_interval_ms: default_retry_interval_ms(),
            default_region: default_region(),
            region_rules: default_region_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Centre of the jitter distribution, seconds after the nominal instant.
    #[serde(default = "default_jitter_mean_secs")]
    pub jitter_mean_secs: f64,
    /// Standard deviation of the jitter distribution, seconds.
    #[serde(default = "default_jitter_std_secs")]
    pub jitter_std_secs: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            jitter_mean_secs: default_jitter_mean_secs(),
            jitter_std_secs: default_jitter_std_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persisted cookie records (global fallback set).
    #[serde(default = "default_cookies_path")]
    pub cookies_path: String,
    /// Whitespace/comma-delimited fallback seat codes.
    #[serde(default = "default_prefs_path")]
    pub prefs_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cookies_path: default_cookies_path(),
            prefs_path: default_prefs_path(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_base_url() -> String {
    "https://libwx.hunnu.edu.cn".to_string()
}
fn default_host() -> String {
    "libwx.hunnu.edu.cn".to_string()
}
fn default_opening_time() -> String {
    "07:00".to_string()
}
fn default_user_agent() -> String {
    "7.0.5 WindowsWechat".to_string()
}
fn default_max_attempts() -> u32 {
    6
}
fn default_retry_interval_ms() -> u64 {
    500
}
fn default_region() -> String {
    "1".to_string()
}
fn default_region_rules() -> Vec<RegionRule> {
    // Seat codes look like "Z314": floor area letter, room digit, seat number.
    [("Z1", "1"), ("Z2", "2"), ("Z3", "3"), ("Z4", "4")]
        .into_iter()
        .map(|(prefix, region)| RegionRule {
            prefix: prefix.to_string(),
            region: region.to_string(),
        })
        .collect()
}
fn default_jitter_mean_secs() -> f64 {
    3.0
}
fn default_jitter_std_secs() -> f64 {
    1.0
}
fn default_cookies_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.seatbot/cookies.json", home)
}
fn default_prefs_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.seatbot/prefs.txt", home)
}

impl SeatbotConfig {
    /// Load config from a TOML file with SEATBOT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.seatbot/seatbot.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SeatbotConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SEATBOT_").split("__"))
            .extract()
            .map_err(|e| crate::error::SeatbotError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.seatbot/seatbot.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_portal_policy() {
        let config = SeatbotConfig::default();
        assert_eq!(config.booking.max_attempts, 6);
        assert_eq!(config.booking.retry_interval_ms, 500);
        assert_eq!(config.portal.opening_time, "07:00");
        assert_eq!(config.scheduler.jitter_std_secs, 1.0);
    }

    #[test]
    fn region_rules_are_ordered() {
        let rules = default_region_rules();
        assert_eq!(rules[0].prefix, "Z1");
        assert_eq!(rules.last().unwrap().region, "4");
    }
}
