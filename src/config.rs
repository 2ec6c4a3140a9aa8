use anyhow::Result;
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    #[allow(dead_code)]
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Response cache
    pub cache_max_entries: usize,
    pub cache_ttl_seconds: u64,

    // Translation provider (language detection + translation)
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,

    // LLM provider (moderation, intent, grading, explanation, quiz questions)
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_explain_model: String,
    pub ai_timeout_seconds: u64,

    // Document text extraction service
    pub document_service_url: String,
    pub document_service_token: Option<String>,

    // Forms provider (quiz publishing)
    pub forms_api_url: String,
    pub forms_api_token: Option<String>,

    // Request limits
    pub max_upload_bytes: usize,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// Provider credentials are optional: a missing credential leaves the
    /// dependent feature degraded instead of failing startup.
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Response cache
        let cache_max_entries = env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);
        let cache_ttl_seconds = env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600); // 1 hour default

        // Translation provider
        let translate_api_url = env::var("TRANSLATE_API_URL")
            .unwrap_or_else(|_| "https://translation.googleapis.com/language/translate/v2".to_string());
        let translate_api_key = env::var("TRANSLATE_API_KEY").ok().filter(|s| !s.is_empty());

        // LLM provider
        let llm_api_url =
            env::var("LLM_API_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let llm_api_key = env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty());
        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let llm_explain_model =
            env::var("LLM_EXPLAIN_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let ai_timeout_seconds = env::var("AI_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120); // 2 minutes default for LLM calls

        // Document extraction service
        let document_service_url = env::var("DOCUMENT_SERVICE_URL")
            .unwrap_or_else(|_| "http://doc-service:8000".to_string());
        let document_service_token = env::var("DOCUMENT_SERVICE_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        // Forms provider
        let forms_api_url =
            env::var("FORMS_API_URL").unwrap_or_else(|_| "https://forms.googleapis.com".to_string());
        let forms_api_token = env::var("FORMS_API_TOKEN").ok().filter(|s| !s.is_empty());

        // Request limits
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15 * 1024 * 1024); // PDFs arrive base64-encoded in JSON bodies

        Ok(Settings {
            env,
            server_addr,
            cors_allow_origins,
            cache_max_entries,
            cache_ttl_seconds,
            translate_api_url,
            translate_api_key,
            llm_api_url,
            llm_api_key,
            llm_model,
            llm_explain_model,
            ai_timeout_seconds,
            document_service_url,
            document_service_token,
            forms_api_url,
            forms_api_token,
            max_upload_bytes,
        })
    }
}
