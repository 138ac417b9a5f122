use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// When unset the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Comma-separated admin email allow-list.
    pub admin_emails: String,
    /// Signing secret of the identity provider's webhook endpoint.
    pub webhook_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            admin_emails: std::env::var("ADMIN_EMAILS").unwrap_or_default(),
            webhook_secret: std::env::var("CLERK_WEBHOOK_SECRET")
                .ok()
                .filter(|secret| !secret.trim().is_empty()),
        })
    }
}
