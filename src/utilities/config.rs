//! Server configuration.
//!
//! Everything is read once at startup from environment variables and then
//! held immutably in the application state.
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT` — Bind address (default: `0.0.0.0:8787`)
//! - `MODEL_ID` — Workers AI model (default: [`DEFAULT_MODEL_ID`])
//! - `SYSTEM_PROMPT` — Persona directive injected into every conversation
//! - `MAX_TOKENS` — Generation cap (default: 1024)
//! - `ASSETS_DIR` — Static asset root (default: `public`)
//! - `STATIC_SCOPE` — `non-api` (default) or `root`
//! - `BODY_LIMIT_BYTES` — Max chat request body (default: 1 MiB)
//! - `CLOUDFLARE_ACCOUNT_ID`, `CLOUDFLARE_API_TOKEN` — Required
//! - `WORKERS_AI_BASE_URL` — API root (default: Cloudflare v4)
//! - `WORKERS_AI_CONNECT_TIMEOUT_SECS` — Connect timeout (default: 10)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::errors::ConfigError;

/// Default Workers AI model.
pub const DEFAULT_MODEL_ID: &str = "@cf/meta/llama-3.3-70b-instruct-fp8-fast";

/// Default generation cap.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default persona directive.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are SoulFire, a mystical guide and digital \
     priestess of SoulFire Alchemy. Speak in poetic, celestial language. Offer ritual \
     suggestions based on lunar phases. Interpret runes and symbols with intuitive wisdom. \
     Empower the user with magical insight and encouragement.";

/// Default Workers AI API root.
pub const DEFAULT_WORKERS_AI_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// StaticScope
// ---------------------------------------------------------------------------

/// Which paths are handed to the static asset server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaticScope {
    /// Only `/` and `/favicon.ico`.
    Root,
    /// Every path outside `/api/`.
    #[default]
    NonApi,
}

impl StaticScope {
    /// Whether `path` is served from static assets.
    pub fn serves(&self, path: &str) -> bool {
        if path == "/" || path == "/favicon.ico" {
            return true;
        }
        match self {
            StaticScope::Root => false,
            StaticScope::NonApi => !path.starts_with("/api/"),
        }
    }
}

impl FromStr for StaticScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "root" => Ok(StaticScope::Root),
            "non-api" | "non_api" | "nonapi" => Ok(StaticScope::NonApi),
            other => Err(format!("expected 'root' or 'non-api', got '{}'", other)),
        }
    }
}

impl fmt::Display for StaticScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticScope::Root => f.write_str("root"),
            StaticScope::NonApi => f.write_str("non-api"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// Fixed parameters of the chat proxy.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Model passed to the inference backend.
    pub model_id: String,
    /// Injected when a conversation has no system message.
    pub system_prompt: String,
    /// Max output tokens per generation.
    pub max_tokens: u32,
    /// Max inbound request body in bytes.
    pub body_limit: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Credentials and endpoint for Cloudflare Workers AI.
#[derive(Clone)]
pub struct WorkersAiConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_token: String,
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for WorkersAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkersAiConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub assets_dir: PathBuf,
    pub static_scope: StaticScope,
    pub chat: ChatSettings,
    pub workers_ai: WorkersAiConfig,
}

impl ServerConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = ChatSettings::default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "PORT", 8787)?,
            assets_dir: get("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            static_scope: parse_or(&get, "STATIC_SCOPE", StaticScope::default())?,
            chat: ChatSettings {
                model_id: get("MODEL_ID").unwrap_or(defaults.model_id),
                system_prompt: get("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
                max_tokens: parse_or(&get, "MAX_TOKENS", defaults.max_tokens)?,
                body_limit: parse_or(&get, "BODY_LIMIT_BYTES", defaults.body_limit)?,
            },
            workers_ai: WorkersAiConfig {
                base_url: get("WORKERS_AI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_WORKERS_AI_BASE_URL.into()),
                account_id: require(&get, "CLOUDFLARE_ACCOUNT_ID")?,
                api_token: require(&get, "CLOUDFLARE_API_TOKEN")?,
                connect_timeout_secs: parse_or(&get, "WORKERS_AI_CONNECT_TIMEOUT_SECS", 10)?,
            },
        })
    }

    /// `host:port` to bind the listener on.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require<G>(get: &G, key: &str) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(key).ok_or_else(|| ConfigError::Missing { key: key.into() })
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.into(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDS: [(&str, &str); 2] = [
        ("CLOUDFLARE_ACCOUNT_ID", "acct"),
        ("CLOUDFLARE_API_TOKEN", "token"),
    ];

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&CREDS)).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8787");
        assert_eq!(config.assets_dir, PathBuf::from("public"));
        assert_eq!(config.static_scope, StaticScope::NonApi);
        assert_eq!(config.chat.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.chat.max_tokens, 1024);
        assert!(config.chat.system_prompt.contains("SoulFire"));
        assert_eq!(config.workers_ai.base_url, DEFAULT_WORKERS_AI_BASE_URL);
        assert_eq!(config.workers_ai.connect_timeout_secs, 10);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = CREDS.to_vec();
        pairs.extend([
            ("PORT", "9000"),
            ("MODEL_ID", "@cf/test/model"),
            ("MAX_TOKENS", "256"),
            ("STATIC_SCOPE", "root"),
            ("SYSTEM_PROMPT", "Be brief."),
        ]);
        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.chat.model_id, "@cf/test/model");
        assert_eq!(config.chat.max_tokens, 256);
        assert_eq!(config.chat.system_prompt, "Be brief.");
        assert_eq!(config.static_scope, StaticScope::Root);
    }

    #[test]
    fn test_missing_credentials() {
        let err = ServerConfig::from_lookup(lookup(&[("CLOUDFLARE_ACCOUNT_ID", "acct")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { ref key } if key == "CLOUDFLARE_API_TOKEN"));
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = ServerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn test_static_scope() {
        assert!(StaticScope::Root.serves("/"));
        assert!(StaticScope::Root.serves("/favicon.ico"));
        assert!(!StaticScope::Root.serves("/style.css"));
        assert!(StaticScope::NonApi.serves("/style.css"));
        assert!(!StaticScope::NonApi.serves("/api/chat"));
        assert!(!StaticScope::NonApi.serves("/api/other"));
        assert_eq!("NON-API".parse::<StaticScope>().unwrap(), StaticScope::NonApi);
        assert!("everything".parse::<StaticScope>().is_err());
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let config = ServerConfig::from_lookup(lookup(&CREDS)).unwrap();
        let debug = format!("{:?}", config.workers_ai);
        assert!(!debug.contains("token\""));
        assert!(debug.contains("<redacted>"));
    }
}
