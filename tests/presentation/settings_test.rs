use dfpwm_relay::presentation::config::Environment;
use dfpwm_relay::presentation::Settings;

#[test]
fn given_environment_names_when_parsing_then_known_values_are_accepted() {
    let parse = |s: &str| Environment::try_from(s.to_string());

    assert_eq!(parse("local"), Ok(Environment::Local));
    assert_eq!(parse("TEST"), Ok(Environment::Test));
    assert_eq!(parse("production"), Ok(Environment::Prod));
    assert!(parse("staging").is_err());
}

#[test]
fn given_no_api_key_when_loading_settings_then_loading_fails() {
    if std::env::var("APP_AUTH__API_KEY").is_ok() {
        return;
    }

    let result = Settings::load(Environment::Test);

    assert!(result.is_err());
}
