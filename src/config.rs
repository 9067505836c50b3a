use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Public URL prefix under which uploaded images are served.
pub const UPLOAD_URL_PREFIX: &str = "/public/uploads";

/// Runtime configuration, read once from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub default_page_limit: u64,
    pub max_page_limit: u64,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
    pub frontend_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            mongo_uri: "mongodb://localhost:27017/user-management".to_string(),
            upload_dir: PathBuf::from("public/uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
            default_page_limit: 5,
            max_page_limit: 100,
            cors_origins: Vec::new(),
            frontend_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_page_limit = parse_or("MAX_PAGE_LIMIT", &lookup, defaults.max_page_limit).max(1);
        let default_page_limit =
            parse_or("DEFAULT_PAGE_LIMIT", &lookup, defaults.default_page_limit)
                .clamp(1, max_page_limit);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", &lookup, defaults.port),
            mongo_uri: lookup("MONGO_URI").unwrap_or(defaults.mongo_uri),
            upload_dir: lookup("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", &lookup, defaults.max_upload_bytes),
            default_page_limit,
            max_page_limit,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            frontend_dir: lookup("FRONTEND_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("⚠️  Invalid {}={:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
