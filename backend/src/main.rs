use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

#[derive(Debug, Parser)]
#[command(about = "Receives CS2 game state integration pushes")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Rounds per regulation half
    #[arg(long, default_value_t = gsi::pipeline::DEFAULT_REGULATION_MAX_ROUNDS)]
    regulation_max_rounds: u32,

    /// Rounds per overtime half
    #[arg(long, default_value_t = gsi::pipeline::DEFAULT_OVERTIME_MAX_ROUNDS)]
    overtime_max_rounds: u32,

    #[arg(long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,

    #[arg(long, default_value_t = backend::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(args.log_level))
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("backend") || meta.target().contains("gsi")
        }));
    if let Err(e) = tracing::subscriber::set_global_default(registry) {
        eprintln!("Setting up logging: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Starting...");

    let gsi = Arc::new(gsi::Gsi::new(gsi::Config {
        regulation_max_rounds: args.regulation_max_rounds,
        overtime_max_rounds: args.overtime_max_rounds,
    }));
    backend::log_events(&gsi);

    let router = backend::router(gsi, args.max_body_bytes);

    let listener = match tokio::net::TcpListener::bind(&args.listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Binding to {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}", args.listen);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown())
        .await
    {
        tracing::error!("Serving: {}", e);
        std::process::exit(1);
    }
}

async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Waiting for ctrl-c: {}", e);
    }
    tracing::info!("Shutting down");
}
