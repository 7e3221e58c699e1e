use config::Config;
use esia_mock::config::AppConfig;

fn from_yaml(yaml: &str) -> AppConfig {
    Config::builder()
        .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
        .build()
        .expect("Failed to build config")
        .try_deserialize()
        .expect("Failed to deserialize app config")
}

#[test]
fn test_app_config_deserialization() {
    let app_config = from_yaml(
        r#"
bind_address: "127.0.0.1:9000"
issuer_url: "https://esia-mock.internal"
access_token_lifetime: 120
debug_endpoints: false
"#,
    );

    assert_eq!(app_config.bind_address, "127.0.0.1:9000");
    assert_eq!(app_config.issuer_url, "https://esia-mock.internal");
    assert_eq!(app_config.access_token_lifetime, 120);
    assert!(!app_config.debug_endpoints);
    assert!(app_config.validate().is_ok());
}

#[test]
fn test_missing_keys_fall_back_to_defaults() {
    let app_config = from_yaml("access_token_lifetime: 60\n");

    assert_eq!(app_config.access_token_lifetime, 60);
    assert_eq!(app_config.bind_address, "0.0.0.0:8085");
    assert_eq!(app_config.issuer_url, "http://localhost:8085");
    assert!(app_config.debug_endpoints);
}

#[test]
fn test_invalid_values_fail_validation() {
    let app_config = from_yaml("access_token_lifetime: 0\n");
    assert!(app_config.validate().is_err());

    let app_config = from_yaml("bind_address: \"not-an-address\"\n");
    assert!(app_config.validate().is_err());
}
