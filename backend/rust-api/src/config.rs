use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub google_client_id: String,
    pub ai_api_key: String,
    pub ai_api_url: String,
    pub seed_admin_email: String,
    pub seed_admin_password: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "jagruk".to_string());

        let jwt_secret = settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: JWT_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            });

        let google_client_id = settings
            .get_string("auth.google_client_id")
            .or_else(|_| env::var("GOOGLE_CLIENT_ID"))
            .unwrap_or_default();

        let ai_api_key = settings
            .get_string("ai.api_key")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .unwrap_or_default();

        let ai_api_url = settings
            .get_string("ai.api_url")
            .or_else(|_| env::var("GEMINI_API_URL"))
            .unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
                    .to_string()
            });

        let seed_admin_email = settings
            .get_string("seed.admin_email")
            .or_else(|_| env::var("SEED_ADMIN_EMAIL"))
            .unwrap_or_else(|_| "admin@jagruk.edu".to_string());

        let seed_admin_password = settings
            .get_string("seed.admin_password")
            .or_else(|_| env::var("SEED_ADMIN_PASSWORD"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: SEED_ADMIN_PASSWORD must be set in production!");
                }
                "admin123".to_string()
            });

        Ok(Config {
            mongo_uri,
            mongo_database,
            jwt_secret,
            google_client_id,
            ai_api_key,
            ai_api_url,
            seed_admin_email,
            seed_admin_password,
        })
    }
}
