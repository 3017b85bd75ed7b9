use anyhow::Context;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub database_url: String,
    pub fraud_api_url: String,
    pub notify_api_url: String,
    /// Loaded for operational visibility; the evaluator's own verdict is
    /// authoritative and this value is never compared against it.
    pub fraud_threshold: f64,
    pub collaborator_timeout_secs: u64,
    pub max_page_size: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8002".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL")?,
            fraud_api_url: env::var("FRAUD_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            notify_api_url: env::var("NOTIFY_API_URL")
                .unwrap_or_else(|_| "http://localhost:8003".to_string()),
            fraud_threshold: env::var("FRAUD_THRESHOLD")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()
                .context("FRAUD_THRESHOLD must be a float")?,
            collaborator_timeout_secs: env::var("COLLABORATOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("COLLABORATOR_TIMEOUT_SECS must be an integer")?,
            max_page_size: env::var("MAX_PAGE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("MAX_PAGE_SIZE must be an integer")?,
        })
    }

    /// Startup validation of the settings that would otherwise fail at first use.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.server_port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        url::Url::parse(&self.fraud_api_url).context("FRAUD_API_URL is not a valid URL")?;
        url::Url::parse(&self.notify_api_url).context("NOTIFY_API_URL is not a valid URL")?;

        if !(0.0..=1.0).contains(&self.fraud_threshold) {
            anyhow::bail!("FRAUD_THRESHOLD must be within [0, 1]");
        }
        if self.max_page_size < 1 {
            anyhow::bail!("MAX_PAGE_SIZE must be at least 1");
        }

        Ok(())
    }
}
