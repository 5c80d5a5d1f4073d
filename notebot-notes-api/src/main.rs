use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use notebot_notes_api::config::NotesApiConfig;
use notebot_notes_api::database::Database;
use notebot_notes_api::{build_cors, configure, AppState};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "notebot-notes-api", version, about = "Notes and authentication service")]
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

    let (config, config_path) = NotesApiConfig::load(cli.config)?;
    info!("Loaded configuration from {}", config_path.display());

    let database = Database::new(&config.database.path)?;
    info!("Database initialized at {:?}", config.database.path);

    let state = web::Data::new(AppState::new(database, config.auth.clone()));
    let jwt = state.jwt.clone();

    let bind_addr = (config.server.host.clone(), config.server.port);
    info!("Starting notebot-notes-api server at http://{}:{}", bind_addr.0, bind_addr.1);

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
