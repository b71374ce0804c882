use std::collections::BTreeMap;
use std::path::PathBuf;

use arag_core::config::{LlmProvider, Settings, DEFAULT_RETRIEVE_K, DEFAULT_USER_AGENT};

fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, arag_core::error::AppError> {
    let env: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn defaults_apply_when_only_credentials_are_set() {
    let s = settings_from(&[("GROQ_API_KEY", "gk"), ("TAVILY_API_KEY", "tk")]).expect("settings");
    assert_eq!(s.llm_provider, LlmProvider::Groq);
    assert_eq!(s.groq_api_key.as_deref(), Some("gk"));
    assert_eq!(s.tavily_api_key, "tk");
    assert_eq!(s.index_path, PathBuf::from("arag_index.sqlite"));
    assert_eq!(s.ollama_base_url, "http://127.0.0.1:11434");
    assert_eq!(s.retrieve_k, DEFAULT_RETRIEVE_K);
    assert_eq!(s.user_agent, DEFAULT_USER_AGENT);
}

#[test]
fn missing_credentials_fail_fast() {
    let err = settings_from(&[("TAVILY_API_KEY", "tk")]).expect_err("groq key required");
    assert_eq!(err.code, "CONFIG_MISSING");
    assert_eq!(err.details.as_deref(), Some("key=GROQ_API_KEY"));

    let err = settings_from(&[("GROQ_API_KEY", "gk")]).expect_err("tavily key required");
    assert_eq!(err.details.as_deref(), Some("key=TAVILY_API_KEY"));

    let err = settings_from(&[("GROQ_API_KEY", "  "), ("TAVILY_API_KEY", "tk")])
        .expect_err("blank counts as missing");
    assert_eq!(err.code, "CONFIG_MISSING");
}

#[test]
fn ollama_provider_does_not_need_a_groq_key() {
    let s = settings_from(&[("ARAG_LLM_PROVIDER", "ollama"), ("TAVILY_API_KEY", "tk")])
        .expect("settings");
    assert_eq!(s.llm_provider, LlmProvider::Ollama);
    assert_eq!(s.groq_api_key, None);
}

#[test]
fn invalid_values_are_rejected() {
    let err = settings_from(&[("ARAG_LLM_PROVIDER", "openai"), ("TAVILY_API_KEY", "tk")])
        .expect_err("unknown provider");
    assert_eq!(err.code, "CONFIG_INVALID");

    let err = settings_from(&[
        ("GROQ_API_KEY", "gk"),
        ("TAVILY_API_KEY", "tk"),
        ("ARAG_RETRIEVE_K", "0"),
    ])
    .expect_err("zero k");
    assert_eq!(err.code, "CONFIG_INVALID");
}

#[test]
fn overrides_are_read() {
    let s = settings_from(&[
        ("GROQ_API_KEY", "gk"),
        ("TAVILY_API_KEY", "tk"),
        ("ARAG_INDEX_PATH", "/tmp/x.sqlite"),
        ("ARAG_RETRIEVE_K", "3"),
        ("USER_AGENT", "test-agent/1.0"),
        ("ARAG_ANSWER_MODEL", "llama-3.1-8b-instant"),
    ])
    .expect("settings");
    assert_eq!(s.index_path, PathBuf::from("/tmp/x.sqlite"));
    assert_eq!(s.retrieve_k, 3);
    assert_eq!(s.user_agent, "test-agent/1.0");
    assert_eq!(s.answer_model, "llama-3.1-8b-instant");
}

#[test]
fn debug_output_redacts_keys() {
    let s = settings_from(&[("GROQ_API_KEY", "secret-groq"), ("TAVILY_API_KEY", "secret-tavily")])
        .expect("settings");
    let dbg = format!("{s:?}");
    assert!(!dbg.contains("secret-groq"));
    assert!(!dbg.contains("secret-tavily"));
}
