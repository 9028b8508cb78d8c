pub const API_URL_ENV: &str = "LINKWATCH_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Lookup is injected so tests never touch process-global env.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup(API_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { api_base_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_localhost() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.api_base_url, DEFAULT_API_URL);
    }

    #[test]
    fn env_overrides_the_default() {
        let settings = Settings::from_lookup(|key| {
            (key == API_URL_ENV).then(|| "http://dish.local:9000".to_string())
        });
        assert_eq!(settings.api_base_url, "http://dish.local:9000");
    }

    #[test]
    fn blank_env_value_falls_back() {
        let settings = Settings::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(settings.api_base_url, DEFAULT_API_URL);
    }
}
