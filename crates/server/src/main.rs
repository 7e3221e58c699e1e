use esia_mock::api::start_webserver;
use esia_mock::config::load_config_or_panic;
use esia_mock::oauth2::OAuth2State;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let default_directives = "esia_mock=info,tower_http=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    initialize_standard_tracing();

    let config = load_config_or_panic();
    tracing::info!(
        access_token_lifetime = config.access_token_lifetime,
        debug_endpoints = config.debug_endpoints,
        "configuration loaded"
    );

    let state = OAuth2State::new(&config);
    start_webserver(state, &config).await?;
    Ok(())
}
