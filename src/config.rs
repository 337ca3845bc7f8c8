//! Service configuration, built from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Default namespace leads are filed under.
pub const DEFAULT_APP_ID: &str = "prospairity-consulting";

/// Default provenance tag recorded with every submitted lead.
pub const DEFAULT_SOURCE: &str = "Ghost Diagnostic Page";

/// Remote document store settings. Present only when `LEAD_WIZARD_STORE_URL` is set.
#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    /// Base URL of the document store, no trailing slash.
    pub base_url: String,
    /// Optional bearer token.
    pub token: Option<SecretString>,
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port.
    pub port: u16,
    /// libSQL database file (ignored when a remote store is configured).
    pub db_path: PathBuf,
    /// Namespace leads are filed under.
    pub app_id: String,
    /// Provenance tag written with every lead.
    pub source: String,
    /// Sessions untouched for this long are dropped from memory.
    pub session_idle_timeout: Duration,
    /// How often the idle-session sweep runs.
    pub prune_interval: Duration,
    pub remote_store: Option<RemoteStoreConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/leads.db"),
            app_id: DEFAULT_APP_ID.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(60),
            remote_store: None,
        }
    }
}

impl ServiceConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port: u16 = lookup("LEAD_WIZARD_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let db_path = lookup("LEAD_WIZARD_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let app_id = lookup("LEAD_WIZARD_APP_ID")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.app_id);

        let source = lookup("LEAD_WIZARD_SOURCE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.source);

        let session_idle_timeout = lookup("LEAD_WIZARD_SESSION_IDLE_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_idle_timeout);

        let prune_interval = lookup("LEAD_WIZARD_PRUNE_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.prune_interval);

        let remote_store = lookup("LEAD_WIZARD_STORE_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|url| RemoteStoreConfig {
                base_url: url.trim().trim_end_matches('/').to_string(),
                token: lookup("LEAD_WIZARD_STORE_TOKEN")
                    .filter(|s| !s.is_empty())
                    .map(SecretString::from),
            });

        Self {
            port,
            db_path,
            app_id,
            source,
            session_idle_timeout,
            prune_interval,
            remote_store,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_env_gives_defaults() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.app_id, "prospairity-consulting");
        assert_eq!(config.source, "Ghost Diagnostic Page");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(3600));
        assert!(config.remote_store.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("LEAD_WIZARD_PORT", "9090"),
            ("LEAD_WIZARD_DB_PATH", "/tmp/x.db"),
            ("LEAD_WIZARD_APP_ID", "acme"),
            ("LEAD_WIZARD_SESSION_IDLE_SECS", "120"),
            ("LEAD_WIZARD_STORE_URL", "https://docs.example.com/"),
            ("LEAD_WIZARD_STORE_TOKEN", "s3cret"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.app_id, "acme");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(120));

        let remote = config.remote_store.unwrap();
        assert_eq!(remote.base_url, "https://docs.example.com");
        assert_eq!(remote.token.unwrap().expose_secret(), "s3cret");
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("LEAD_WIZARD_PORT", "not-a-port"),
            ("LEAD_WIZARD_PRUNE_INTERVAL_SECS", "0"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.prune_interval, Duration::from_secs(60));
    }
}
