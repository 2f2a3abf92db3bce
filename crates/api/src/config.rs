/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Add the `Secure` attribute to the session cookie.
    pub cookie_secure: bool,
    /// Interval between expired-session sweeps in seconds (default: `3600`).
    pub session_cleanup_secs: u64,
    /// First administrator to create when no employees exist.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for the administrator seeded into an empty database.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `5001`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5002` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `COOKIE_SECURE`            | `false`                 |
    /// | `SESSION_CLEANUP_SECS`     | `3600`                  |
    /// | `BOOTSTRAP_ADMIN_NAME`     | unset                   |
    /// | `BOOTSTRAP_ADMIN_EMAIL`    | unset                   |
    /// | `BOOTSTRAP_ADMIN_PASSWORD` | unset                   |
    ///
    /// The bootstrap administrator is only configured when all three
    /// `BOOTSTRAP_ADMIN_*` variables are set.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5002".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let session_cleanup_secs: u64 = std::env::var("SESSION_CLEANUP_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SESSION_CLEANUP_SECS must be a valid u64");

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_NAME"),
            std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(name), Ok(email), Ok(password)) => Some(BootstrapAdmin {
                name,
                email,
                password,
            }),
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cookie_secure,
            session_cleanup_secs,
            bootstrap_admin,
        }
    }
}

/// Interpret common truthy spellings (`1`, `true`, `yes`, `on`).
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn bootstrap_admin_debug_hides_password() {
        let admin = BootstrapAdmin {
            name: "admin".into(),
            email: "admin@example.com".into(),
            password: "hunter2-hunter2".into(),
        };
        let text = format!("{admin:?}");
        assert!(!text.contains("hunter2"));
        assert!(text.contains("admin@example.com"));
    }
}
