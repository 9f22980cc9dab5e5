use anyhow::{Result, bail};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub api_docs: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            api_docs: true,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let environment = lookup("APP_ENV")
            .map(|val| val.trim().to_lowercase())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| "development".into());

        // the OpenAPI document is only published in development unless forced
        let api_docs = match lookup("API_DOCS") {
            Some(raw) => parse_flag("API_DOCS", &raw)?,
            None => environment == "development",
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        Ok(Self {
            environment,
            api_docs,
            cors_allowed_origins,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got {other:?}"),
    }
}
