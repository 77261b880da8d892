use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use db::Backend;
use rand::{Rng, distributions::Alphanumeric};
use secrecy::SecretString;
use services::services::mailer::SmtpSettings;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// bcrypt hash of the stock admin password, used until `ADMIN_PASSWORD_HASH` is set.
const DEFAULT_ADMIN_PASSWORD_HASH: &str =
    "$2a$12$YIuOrmXTivZ54PH2JZrsfOjWO46YnA6DfDE92OwP3xZUBJxSG83C.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_backend: Backend,
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub optimize_uploads: bool,
    pub admin_username: String,
    pub admin_password_hash: String,
    /// `None` when SMTP credentials are not configured; contact mail is then refused.
    pub smtp: Option<SmtpSettings>,
}

impl Config {
    /// Read the process environment; the binary loads `.env` into it first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_backend: Backend = parse_or(&var, "DATABASE_BACKEND", Backend::Sqlite)?;
        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => match database_backend {
                Backend::Sqlite => {
                    info!("DATABASE_URL not set, using sqlite://portfolio.db");
                    "sqlite://portfolio.db".to_string()
                }
                Backend::Mysql => mysql_url(&var)?,
            },
        };

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => SecretString::from(secret),
            None => {
                warn!("JWT_SECRET not set, generating a random secret; tokens will not survive a restart");
                let secret: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(48)
                    .map(char::from)
                    .collect();
                SecretString::from(secret)
            }
        };

        let public_dir = PathBuf::from(var("PUBLIC_DIR").unwrap_or_else(|| "public".into()));
        let upload_dir = var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| public_dir.join("assets").join("images"));
        let template_path = var("TEMPLATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| public_dir.join("index.html"));
        let output_path = var("OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| template_path.clone());

        let admin_password_hash = var("ADMIN_PASSWORD_HASH").unwrap_or_else(|| {
            warn!("ADMIN_PASSWORD_HASH not set, using the default admin password hash");
            DEFAULT_ADMIN_PASSWORD_HASH.to_string()
        });

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "PORT", 3000)?,
            database_backend,
            database_url,
            jwt_secret,
            jwt_ttl_hours: parse_or(&var, "JWT_TTL_HOURS", 24)?,
            bcrypt_cost: parse_or(&var, "BCRYPT_COST", 12)?,
            public_dir,
            upload_dir,
            template_path,
            output_path,
            optimize_uploads: parse_or(&var, "OPTIMIZE_UPLOADS", false)?,
            admin_username: var("ADMIN_USERNAME").unwrap_or_else(|| "admin".into()),
            admin_password_hash,
            smtp: smtp_settings(&var)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
}

fn mysql_url(var: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let host = var("DB_HOST").unwrap_or_else(|| "localhost".into());
    let port: u16 = parse_or(var, "DB_PORT", 3306)?;
    let user = var("DB_USER").unwrap_or_else(|| "root".into());
    let password = var("DB_PASSWORD");
    let name = var("DB_NAME").unwrap_or_else(|| "portfolio".into());

    let invalid = |key: &'static str| ConfigError::Invalid {
        key,
        message: "cannot be used in a MySQL connection URL".to_string(),
    };

    // Credentials go through `Url` so reserved characters are percent-encoded.
    let mut url = Url::parse(&format!("mysql://{host}:{port}")).map_err(|e| {
        ConfigError::Invalid {
            key: "DB_HOST",
            message: e.to_string(),
        }
    })?;
    url.set_username(&user).map_err(|_| invalid("DB_USER"))?;
    url.set_password(password.as_deref())
        .map_err(|_| invalid("DB_PASSWORD"))?;
    url.set_path(&name);
    Ok(url.into())
}

fn smtp_settings(
    var: &impl Fn(&str) -> Option<String>,
) -> Result<Option<SmtpSettings>, ConfigError> {
    let (Some(username), Some(password)) = (var("EMAIL_USER"), var("EMAIL_PASS")) else {
        warn!("EMAIL_USER/EMAIL_PASS not set, contact form e-mail is disabled");
        return Ok(None);
    };

    Ok(Some(SmtpSettings {
        host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
        port: parse_or(var, "SMTP_PORT", 465)?,
        admin_email: var("ADMIN_EMAIL").unwrap_or_else(|| username.clone()),
        username,
        password: SecretString::from(password),
    }))
}
