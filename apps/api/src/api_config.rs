use std::env;
use std::fmt::{Debug, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use myblog_application::{DEFAULT_LISTING_CACHE_TTL_SECONDS, RateLimitRule};
use myblog_core::AppError;
use tracing_subscriber::EnvFilter;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    TotalBlogs,
    /// Registers an API user. The password comes from `CREATE_USER_PASSWORD`.
    CreateUser {
        username: String,
        password: Password,
    },
}

/// Password read from the environment; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Password {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStoreConfig {
    Postgres,
    Redis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogCacheBackend {
    InMemory,
    Redis,
}

/// Throttle scopes applied to the public API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleRates {
    pub anon: RateLimitRule,
    pub blog: RateLimitRule,
    pub blog_2: RateLimitRule,
}

impl Default for ThrottleRates {
    fn default() -> Self {
        Self {
            anon: RateLimitRule::new("anon", 100, 24 * 60 * 60),
            blog: RateLimitRule::new("blog_limit", 10, 60),
            blog_2: RateLimitRule::new("blog_2_limit", 2, 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub redis_url: Option<String>,
    pub rate_limit_store: RateLimitStoreConfig,
    pub blog_cache_backend: BlogCacheBackend,
    pub blog_cache_ttl_seconds: u32,
    pub log_channel: String,
    pub throttle: ThrottleRates,
    pub rate_limit_cleanup_interval: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let args: Vec<String> = env::args().skip(1).collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Self::from_lookup(&args, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        args: &[&str],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let command = parse_command(args, &lookup)?;

        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match lookup("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let redis_url = lookup("REDIS_URL").filter(|value| !value.trim().is_empty());

        let rate_limit_store = match lookup("RATE_LIMIT_STORE")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => RateLimitStoreConfig::Postgres,
            "redis" => RateLimitStoreConfig::Redis,
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be either 'postgres' or 'redis', got '{other}'"
                )));
            }
        };

        let blog_cache_backend = match lookup("BLOG_CACHE_BACKEND")
            .unwrap_or_else(|| "in_memory".to_owned())
            .as_str()
        {
            "in_memory" => BlogCacheBackend::InMemory,
            "redis" => BlogCacheBackend::Redis,
            other => {
                return Err(AppError::Validation(format!(
                    "BLOG_CACHE_BACKEND must be either 'in_memory' or 'redis', got '{other}'"
                )));
            }
        };

        let blog_cache_ttl_seconds = match lookup("BLOG_CACHE_TTL_SECONDS") {
            Some(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid BLOG_CACHE_TTL_SECONDS: {error}"))
            })?,
            None => DEFAULT_LISTING_CACHE_TTL_SECONDS,
        };

        let log_channel = lookup("LOG_CHANNEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "myblog".to_owned());

        let rate_limit_cleanup_interval = match lookup("RATE_LIMIT_CLEANUP_INTERVAL_SECONDS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "RATE_LIMIT_CLEANUP_INTERVAL_SECONDS must be a positive integer, got '{value}'"
                    ))
                })?,
            None => Duration::from_secs(60 * 60),
        };

        let defaults = ThrottleRates::default();
        let throttle = ThrottleRates {
            anon: rate_from(&lookup, "THROTTLE_ANON_RATE", defaults.anon)?,
            blog: rate_from(&lookup, "THROTTLE_BLOG_LIMIT_RATE", defaults.blog)?,
            blog_2: rate_from(&lookup, "THROTTLE_BLOG_2_LIMIT_RATE", defaults.blog_2)?,
        };

        let config = Self {
            command,
            database_url,
            api_host,
            api_port,
            redis_url,
            rate_limit_store,
            blog_cache_backend,
            blog_cache_ttl_seconds,
            log_channel,
            throttle,
            rate_limit_cleanup_interval,
        };

        if config.requires_redis() && config.redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when RATE_LIMIT_STORE or BLOG_CACHE_BACKEND is 'redis'"
                    .to_owned(),
            ));
        }

        Ok(config)
    }

    pub fn requires_redis(&self) -> bool {
        self.rate_limit_store == RateLimitStoreConfig::Redis
            || self.blog_cache_backend == BlogCacheBackend::Redis
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_command(
    args: &[&str],
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<ApiCommand, AppError> {
    match args {
        [] | ["serve"] => Ok(ApiCommand::Serve),
        ["migrate"] => Ok(ApiCommand::Migrate),
        ["total-blogs"] => Ok(ApiCommand::TotalBlogs),
        ["create-user", username] => {
            let password = lookup("CREATE_USER_PASSWORD")
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    AppError::Validation(
                        "CREATE_USER_PASSWORD is required for 'create-user'".to_owned(),
                    )
                })?;
            Ok(ApiCommand::CreateUser {
                username: (*username).to_owned(),
                password: Password(password),
            })
        }
        ["create-user"] => Err(AppError::Validation(
            "usage: create-user <username>".to_owned(),
        )),
        other => Err(AppError::Validation(format!(
            "unknown command '{}', expected 'serve', 'migrate', 'total-blogs' or 'create-user'",
            other.join(" ")
        ))),
    }
}

fn rate_from(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: RateLimitRule,
) -> Result<RateLimitRule, AppError> {
    match lookup(name) {
        Some(rate) => RateLimitRule::parse(default.category, &rate)
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
