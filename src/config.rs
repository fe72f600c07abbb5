use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub static_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// `DATABASE_URL` wins; otherwise the URL is assembled from `DB_USER`,
    /// `DB_PASSWORD`, `DB_HOST`, `DB_PORT` and `DB_NAME`.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts(
                &env_or("DB_USER", "postgres"),
                &env_or("DB_PASSWORD", "postgres"),
                &env_or("DB_HOST", "localhost"),
                &env_or("DB_PORT", "5432"),
                &env_or("DB_NAME", "businessform_db"),
            ),
        };

        let db_max_connections: u32 = env_or("DB_MAX_CONNECTIONS", "5")
            .parse()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a positive integer")?;

        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = env_or("PORT", "3000")
            .parse()
            .map_err(|_| "PORT must be a valid port number")?;

        let cors_origins = parse_origins(&env_or("CORS_ORIGIN", "http://localhost:8080"));

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let static_dir = base_dir.join(env_or("STATIC_DIR", "public"));

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            cors_origins,
            static_dir,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn database_url_from_parts(
    user: &str,
    password: &str,
    host: &str,
    port: &str,
    name: &str,
) -> String {
    format!("postgres://{user}:{password}@{host}:{port}/{name}")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
