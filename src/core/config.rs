//! Runtime configuration.
//!
//! Settings are read once at process start from `RPCENABLE_*` environment
//! variables and apply to every dispatcher created afterwards. Server bind
//! settings (`HOST`, `PORT`, `WORKER_THREADS`) stay in `main` next to where
//! they are used.

use std::env;

/// XML-RPC adapter settings.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Wrap every inbound dispatch in timing/log capture.
    pub log_incoming: bool,
    /// Persist a record for every outbound client call.
    pub log_outgoing: bool,
    /// Whether a `<nil/>` value may be serialized without faulting.
    pub allow_none: bool,
    /// Character encoding named in the XML declaration and Content-Type.
    /// Bodies are always UTF-8; `None` leaves the declaration bare.
    pub encoding: Option<String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            log_incoming: false,
            log_outgoing: false,
            allow_none: true,
            encoding: None,
        }
    }
}

impl RpcConfig {
    /// Load settings from the environment, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            log_incoming: env_bool("RPCENABLE_LOG_INCOMING", false),
            log_outgoing: env_bool("RPCENABLE_LOG_OUTGOING", false),
            allow_none: env_bool("RPCENABLE_ALLOW_NONE", true),
            encoding: env::var("RPCENABLE_ENCODING")
                .ok()
                .filter(|value| !value.is_empty()),
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|value| parse_bool(&value))
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_values_parse_loosely() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults_match_the_documented_contract() {
        let config = RpcConfig::default();
        assert!(!config.log_incoming);
        assert!(!config.log_outgoing);
        assert!(config.allow_none);
        assert!(config.encoding.is_none());
    }
}
