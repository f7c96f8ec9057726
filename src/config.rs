use std::fmt;

use anyhow::{bail, Context};

/// Signing secret used when `JWT_SECRET` is unset in development.
/// Never accepted outside `APP_ENV=development`.
pub const DEV_FALLBACK_SECRET: &str = "academy-dev-secret-change-me";

/// Upper bound for any token lifetime (one year).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Lifetime of tokens issued by register/login.
    pub ttl_minutes: i64,
    /// Lifetime of tokens printed by the `generate_tokens` utility.
    pub demo_ttl_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .field("demo_ttl_minutes", &self.demo_ttl_minutes)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub client_url: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be exercised
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV").unwrap_or_else(|| "development".into());

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 10)?,
        };

        let secret = match lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None if environment == "development" => {
                tracing::warn!(
                    "JWT_SECRET is not set; using the built-in development secret. \
                     Tokens signed with it are forgeable by anyone who has read the source"
                );
                DEV_FALLBACK_SECRET.to_string()
            }
            None => bail!("JWT_SECRET must be set when APP_ENV={environment}"),
        };

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "academy".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "academy-users".into()),
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 60 * 24)?,
            demo_ttl_minutes: parse_or(&lookup, "DEMO_TOKEN_TTL_MINUTES", 60 * 24 * 7)?,
        };
        for (key, minutes) in [
            ("JWT_TTL_MINUTES", jwt.ttl_minutes),
            ("DEMO_TOKEN_TTL_MINUTES", jwt.demo_ttl_minutes),
        ] {
            if minutes <= 0 {
                bail!("{key}: token lifetimes must be positive");
            }
            if minutes > MAX_TTL_MINUTES {
                bail!("{key}: token lifetime exceeds {MAX_TTL_MINUTES} minutes");
            }
        }

        Ok(Self {
            environment,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 5000)?,
            client_url: lookup("CLIENT_URL").unwrap_or_else(|| "http://localhost:3000".into()),
            database,
            jwt,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/academy"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .expect("config");
        assert_eq!(cfg.environment, "development");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.jwt.ttl_minutes, 1440);
        assert_eq!(cfg.jwt.demo_ttl_minutes, 10080);
        assert_eq!(cfg.database.max_connections, 10);
    }

    #[test]
    fn development_falls_back_to_builtin_secret() {
        let cfg = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/academy",
        )]))
        .expect("config");
        assert_eq!(cfg.jwt.secret, DEV_FALLBACK_SECRET);
    }

    #[test]
    fn production_refuses_to_start_without_secret() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/academy"),
            ("APP_ENV", "production"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/academy"),
            ("APP_ENV", "staging"),
            ("JWT_SECRET", "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/academy"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn rejects_ttl_longer_than_a_year() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/academy"),
            ("JWT_SECRET", "s3cret"),
            ("DEMO_TOKEN_TTL_MINUTES", "9223372036854775807"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DEMO_TOKEN_TTL_MINUTES"));

        let one_year = MAX_TTL_MINUTES.to_string();
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/academy"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", one_year.as_str()),
        ]))
        .expect("one year is allowed");
        assert_eq!(cfg.jwt.ttl_minutes, MAX_TTL_MINUTES);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/academy"),
            ("JWT_SECRET", "very-secret-value"),
        ]))
        .expect("config");
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("very-secret-value"));
    }
}
