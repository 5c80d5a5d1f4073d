use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use notebot_agent_api::config::AgentApiConfig;
use notebot_agent_api::{build_cors, configure, AppState};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "notebot-agent-api", version, about = "Chat gateway for the notes agent")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, config_path) = AgentApiConfig::load(cli.config)?;
    info!("Loaded configuration from {}", config_path.display());

    let state = web::Data::new(AppState::from_config(&config)?);
    let jwt = state.jwt.clone();
    info!(
        model = %state.grammar_model,
        notes = %config.notes.base_url,
        "Agent initialised"
    );

    let bind_addr = (config.server.host.clone(), config.server.port);
    info!("Starting notebot-agent-api server at http://{}:{}", bind_addr.0, bind_addr.1);

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        let jwt = jwt.clone();
        App::new()
            .app_data(state.clone())
            .wrap(build_cors(cors_config.as_ref()))
            .wrap(Logger::default())
            .configure(|cfg| configure(cfg, jwt))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
