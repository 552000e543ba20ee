use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub frontend_url: String,
    /// Brand name appended to blog meta titles.
    pub app_name: String,
    /// Timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,
    pub identity: IdentityConfig,
    pub image_host: ImageHostConfig,
    pub mail: MailConfig,
}

/// Identity provider settings (token verification + admin API).
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Shared secret the provider signs ID tokens with (HS256).
    pub jwt_secret: String,
    /// Base URL of the provider's admin API, e.g. `https://auth.example.com/auth/v1`.
    pub admin_url: String,
    /// Service key sent as bearer token on admin calls.
    pub service_key: String,
}

/// Cloudinary-compatible image host settings.
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Sender address on every outbound message.
    pub from: String,
    /// Recipient of the public contact form.
    pub contact_recipient: String,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, `IDENTITY_JWT_SECRET`
    /// Optional with defaults: `SERVER_HOST`, `SERVER_PORT`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `FRONTEND_URL`, `APP_NAME`, `HTTP_TIMEOUT_SECS`, `IDENTITY_ADMIN_URL`,
    /// `IDENTITY_SERVICE_KEY`, `CLOUDINARY_*`, `SMTP_*`, `EMAIL_FROM`, `CONTACT_EMAIL`
    ///
    /// `PORT` overrides `SERVER_PORT` and host defaults to `0.0.0.0` in production.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set, or if a numeric or
    /// address variable contains an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = match env_or("ENVIRONMENT", "development").as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = env_or("SERVER_HOST", default_host)
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let http_timeout_secs = env_or("HTTP_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a whole number"))?;

        let identity = IdentityConfig {
            jwt_secret: std::env::var("IDENTITY_JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("IDENTITY_JWT_SECRET must be set"))?,
            admin_url: env_or("IDENTITY_ADMIN_URL", "http://localhost:9999"),
            service_key: env_or("IDENTITY_SERVICE_KEY", ""),
        };

        let image_host = ImageHostConfig {
            base_url: env_or("CLOUDINARY_BASE_URL", "https://api.cloudinary.com/v1_1"),
            cloud_name: env_or("CLOUDINARY_CLOUD_NAME", ""),
            api_key: env_or("CLOUDINARY_API_KEY", ""),
            api_secret: env_or("CLOUDINARY_API_SECRET", ""),
        };

        let mail = MailConfig {
            smtp_host: env_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: env_or("SMTP_PORT", "587")
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a valid u16"))?,
            smtp_username: env_or("SMTP_USERNAME", ""),
            smtp_password: env_or("SMTP_PASSWORD", ""),
            from: env_or("EMAIL_FROM", "noreply@bangwelamassiwa.com"),
            contact_recipient: env_or("CONTACT_EMAIL", "contact@bangwelamassiwa.com"),
        };

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level: env_or("LOG_LEVEL", "info"),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:3000"),
            app_name: env_or("APP_NAME", "Bangwé La Massiwa"),
            http_timeout: Duration::from_secs(http_timeout_secs),
            identity,
            image_host,
            mail,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = Config {
            database_url: String::new(),
            server_host: IpAddr::from([127, 0, 0, 1]),
            server_port: 8000,
            environment: Environment::Development,
            log_level: "info".to_string(),
            frontend_url: String::new(),
            app_name: "Test".to_string(),
            http_timeout: Duration::from_secs(1),
            identity: IdentityConfig {
                jwt_secret: String::new(),
                admin_url: String::new(),
                service_key: String::new(),
            },
            image_host: ImageHostConfig {
                base_url: String::new(),
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
            },
            mail: MailConfig {
                smtp_host: String::new(),
                smtp_port: 587,
                smtp_username: String::new(),
                smtp_password: String::new(),
                from: String::new(),
                contact_recipient: String::new(),
            },
        };
        let addr = config.socket_addr();
        assert_eq!(addr.port(), 8000);
        assert!(addr.ip().is_loopback());
    }
}
