use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub environment: Environment,
    pub log_format: LogFormat,
    // AI provider
    pub ai_provider: AiProvider,
    pub gemini_api_key: Option<String>,
    pub gemini_vision_model: String,
    pub gemini_text_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    // Accounts
    pub admin_email: String,
    pub pro_price: i64,
    // Flow
    pub interstitial_seconds: i64,
    pub flow_idle_minutes: u64,
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    OpenAi,
}

impl AiProvider {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Ok(AiProvider::Gemini),
            "openai" => Ok(AiProvider::OpenAi),
            other => Err(format!(
                "Unknown AI_PROVIDER '{}': expected gemini or openai",
                other
            )),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let ai_provider =
            AiProvider::parse(&env::var("AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string()))?;

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://replylens.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            ai_provider,
            gemini_api_key: env::var("GEMINI_API_KEY")
                .or_else(|_| env::var("API_KEY"))
                .ok()
                .filter(|key| !key.is_empty()),
            gemini_vision_model: env::var("GEMINI_VISION_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),
            gemini_text_model: env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| "gemini-3-flash-preview".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@replylens.com".to_string())
                .trim()
                .to_lowercase(),
            pro_price: env::var("PRO_PRICE")
                .unwrap_or_else(|_| "49000".to_string())
                .parse()?,
            interstitial_seconds: env::var("INTERSTITIAL_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            flow_idle_minutes: env::var("FLOW_IDLE_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            max_image_bytes: env::var("MAX_IMAGE_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse()?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the selected provider cannot run with
    pub fn validate(&self) -> Result<(), String> {
        match self.ai_provider {
            AiProvider::Gemini if self.gemini_api_key.is_none() => {
                Err("API key not found: set GEMINI_API_KEY or API_KEY".to_string())
            }
            AiProvider::OpenAi if self.openai_api_key.is_none() => {
                Err("API key not found: set OPENAI_API_KEY".to_string())
            }
            _ if self.interstitial_seconds < 0 => {
                Err("INTERSTITIAL_SECONDS must not be negative".to_string())
            }
            _ => Ok(()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
