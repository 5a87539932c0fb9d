use wf_domain::config::{Config, ConfigSeverity};

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_empty());
}

#[test]
fn reference_generation_parameters() {
    let config = Config::default();
    assert!((config.advisor.temperature - 0.7).abs() < f32::EPSILON);
    assert!((config.advisor.structured_temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.advisor.max_output_tokens, 700);
    assert_eq!(config.advisor.structured_max_output_tokens, 600);
    assert_eq!(config.advisor.detection_temperature, 0.0);
    assert!(config.advisor.stream);
}

#[test]
fn default_document_cap_is_2000_chars() {
    let config = Config::default();
    assert_eq!(config.document.max_chars, 2_000);
}

#[test]
fn empty_toml_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.llm.model, "sutra-v2");
    assert_eq!(config.document.max_chars, 2_000);
}

#[test]
fn sections_parse_independently() {
    let toml_str = r#"
[advisor]
stream = false
temperature = 0.5

[document]
max_chars = 500
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(!config.advisor.stream);
    assert!((config.advisor.temperature - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.advisor.max_output_tokens, 700);
    assert_eq!(config.document.max_chars, 500);
    assert_eq!(config.document.marker, "--- Uploaded document ---");
}

#[test]
fn validate_flags_out_of_range_temperature() {
    let mut config = Config::default();
    config.advisor.temperature = 3.5;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, "advisor.temperature");
    assert_eq!(issues[0].severity, ConfigSeverity::Error);
}

#[test]
fn validate_flags_zero_document_cap_and_empty_model() {
    let mut config = Config::default();
    config.document.max_chars = 0;
    config.llm.model = "  ".into();
    let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
    assert!(fields.contains(&"document.max_chars".to_string()));
    assert!(fields.contains(&"llm.model".to_string()));
}

#[test]
fn missing_credentials_is_only_a_warning() {
    let mut config = Config::default();
    config.llm.auth.env = None;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    assert!(issues[0].to_string().starts_with("[WARN] llm.auth"));
    // The provider refuses to build without a key, so say so.
    assert!(issues[0].message.contains("cannot start without an API key"));
    assert!(!issues[0].message.contains("unauthenticated"));
}
