use std::sync::Arc;
use tokio::sync::Notify;

mod assets;
mod config;
mod handler;
mod http;
mod logger;
mod server;

fn main() {
    if let Err(e) = run() {
        logger::log_error(&format!("Startup failed: {e}"));
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::from_env()?;
    logger::init(&cfg)?;

    // Everything is in memory before the first connection is accepted
    let assets = assets::load(&assets::EmbeddedAssets, &cfg.content)?;
    let addr = cfg.socket_addr()?;

    // Tokio runtime, worker count from WORKERS when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async move {
        let listener = server::bind_listener(addr)?;
        let bound = listener.local_addr()?;
        logger::log_server_start(&bound, &cfg, assets.len());

        let state = Arc::new(config::AppState::new(cfg, assets));
        let shutdown = Arc::new(Notify::new());
        server::start_signal_handler(Arc::clone(&shutdown));

        server::run_server_loop(listener, state, shutdown).await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
