//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;

    #[test]
    fn test_agent_toggles_default_to_enabled() {
        let toggles: AgentToggles = toml::from_str("").unwrap();
        assert!(toggles.quantitative);
        assert!(toggles.time_decay);
        assert!(toggles.trader_flow);
        assert!(toggles.news);
        assert!(toggles.macro_analyst);
        assert!(toggles.contrarian);
    }

    #[test]
    fn test_agent_toggles_partial_override() {
        let toml_str = r#"
news = false
contrarian = false
"#;
        let toggles: AgentToggles = toml::from_str(toml_str).unwrap();
        assert!(!toggles.news);
        assert!(!toggles.contrarian);
        assert!(toggles.quantitative); // untouched toggles stay enabled
    }

    #[test]
    fn test_flow_config_defaults() {
        let config: FlowConfig = toml::from_str("").unwrap();
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.min_trade_value, 100.0);
    }

    #[test]
    fn test_llm_config_defaults() {
        let config: LlmConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider, "deepseek");
        assert!(config.api_key.is_empty());
        assert!(config.base_url.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_search_config_defaults() {
        let config: SearchConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_results, 3);
    }

    #[test]
    fn test_polymarket_config_defaults() {
        let config: PolymarketConfig = toml::from_str("").unwrap();
        assert_eq!(config.gamma_url, "https://gamma-api.polymarket.com");
        assert_eq!(config.clob_url, "https://clob.polymarket.com");
        assert_eq!(config.data_api_url, "https://data-api.polymarket.com");
    }

    #[test]
    fn test_full_config_from_toml() {
        let toml_str = r#"
[llm]
provider = "openai"
api_key = "sk-test"
model = "gpt-4o-mini"

[search]
api_key = "tvly-test"
max_results = 5

[flow]
top_n = 10
concurrency = 4

[agents]
macro_analyst = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.flow.top_n, 10);
        assert_eq!(config.flow.concurrency, 4);
        assert_eq!(config.flow.lookback_days, 7); // default survives
        assert!(!config.agents.macro_analyst);
        assert!(config.agents.news);
    }

    #[test]
    fn test_validate_requires_api_key_for_hosted_providers() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut with_key = Config::default();
        with_key.llm.api_key = "sk-test".to_string();
        assert!(with_key.validate().is_ok());
    }

    #[test]
    fn test_validate_allows_keyless_ollama() {
        let mut config = Config::default();
        config.llm.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.llm.api_key = "sk-test".to_string();
        config.flow.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[llm]
provider = "ollama"

[flow]
top_n = 3
"#,
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.flow.top_n, 3);
        assert!(config.agents.quantitative);
    }
}
