use std::{
    env, fs,
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::UserId, errors::Error, Result};

pub const DEFAULT_ADMIN_ID: i64 = 1340555782;
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_USERS_FILE: &str = "users.json";
pub const DEFAULT_MINI_APP_URL: &str = "https://t.me/TextEncryptBot/encryptonite";
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 600;

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    /// `None` halts the bot startup path; the liveness server runs regardless.
    pub bot_token: Option<String>,
    pub admin_id: UserId,
    pub mini_app_url: String,

    // Storage
    pub users_file: PathBuf,

    // Broadcast
    /// `None` means an open broadcast session never expires.
    pub broadcast_session_timeout: Option<Duration>,
    pub broadcast_concurrency: usize,

    // Liveness HTTP server
    pub port: u16,
}

impl Config {
    /// Read from the process env. Call [`load_dotenv`] first so `.env` values are visible.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = get("BOT_TOKEN").and_then(non_empty);

        let admin_id = match get("ADMIN_ID").and_then(non_empty) {
            Some(raw) => raw.trim().parse::<i64>().map(UserId).map_err(|_| {
                Error::Config(format!("ADMIN_ID must be a numeric user id, got {raw:?}"))
            })?,
            None => UserId(DEFAULT_ADMIN_ID),
        };

        let mini_app_url = get("MINI_APP_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_MINI_APP_URL.to_string());

        let users_file = PathBuf::from(
            get("USERS_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_USERS_FILE.to_string()),
        );

        let timeout_secs = parse_or_default(
            "BROADCAST_SESSION_TIMEOUT_SECS",
            get("BROADCAST_SESSION_TIMEOUT_SECS"),
            DEFAULT_SESSION_TIMEOUT_SECS,
        );
        let broadcast_session_timeout = if timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(timeout_secs))
        };

        let broadcast_concurrency =
            parse_or_default("BROADCAST_CONCURRENCY", get("BROADCAST_CONCURRENCY"), 1usize).max(1);

        let port = parse_or_default("PORT", get("PORT"), DEFAULT_PORT);

        Ok(Self {
            bot_token,
            admin_id,
            mini_app_url,
            users_file,
            broadcast_session_timeout,
            broadcast_concurrency,
            port,
        })
    }

    pub fn health_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn parse_or_default<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    let Some(raw) = raw.and_then(non_empty) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(key, value = %raw, %default, "unparseable config value, using default");
            default
        }
    }
}

/// Copy `./.env` into the process env without overriding what is already set.
///
/// Runs before logging is installed so `RUST_LOG` from `.env` reaches the filter.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

pub fn load_dotenv_from(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let cfg = cfg_from(&[]).unwrap();
        assert_eq!(cfg.bot_token, None);
        assert_eq!(cfg.admin_id, UserId(DEFAULT_ADMIN_ID));
        assert_eq!(cfg.port, 10000);
        assert_eq!(cfg.users_file, PathBuf::from("users.json"));
        assert_eq!(cfg.broadcast_concurrency, 1);
        assert_eq!(
            cfg.broadcast_session_timeout,
            Some(Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS))
        );
        assert_eq!(cfg.health_addr().to_string(), "0.0.0.0:10000");
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let cfg = cfg_from(&[("BOT_TOKEN", "   ")]).unwrap();
        assert!(cfg.bot_token.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = cfg_from(&[
            ("BOT_TOKEN", "123:abc"),
            ("ADMIN_ID", " 42 "),
            ("PORT", "8080"),
            ("USERS_FILE", "/var/lib/enc/users.json"),
            ("BROADCAST_SESSION_TIMEOUT_SECS", "0"),
            ("BROADCAST_CONCURRENCY", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(cfg.admin_id, UserId(42));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.users_file, PathBuf::from("/var/lib/enc/users.json"));
        assert_eq!(cfg.broadcast_session_timeout, None);
        assert_eq!(cfg.broadcast_concurrency, 1);
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        let cfg = cfg_from(&[("PORT", "http")]).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn bad_admin_id_is_a_config_error() {
        let err = cfg_from(&[("ADMIN_ID", "@someone")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn dotenv_sets_missing_keys_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# comment\nENC_DOTENV_TEST_LOG=\"debug\"\nENC_DOTENV_TEST_KEEP=from-file\nnot a pair\n",
        )
        .unwrap();
        env::set_var("ENC_DOTENV_TEST_KEEP", "from-env");

        load_dotenv_from(&path);

        assert_eq!(env::var("ENC_DOTENV_TEST_LOG").unwrap(), "debug");
        assert_eq!(env::var("ENC_DOTENV_TEST_KEEP").unwrap(), "from-env");
    }

    #[test]
    fn missing_dotenv_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        load_dotenv_from(&dir.path().join(".env"));
    }

    #[test]
    fn dotenv_values_lose_surrounding_quotes() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("\"abc"), "\"abc");
    }
}
