mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg);

    // Tokio runtime sized by the workers setting, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers.get());
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr).inspect_err(|e| {
        logger::log_error(&format!("Failed to bind {addr}: {e}"));
    })?;

    logger::log_server_start(&listener.local_addr()?, &cfg);

    let state = config::AppState::shared(cfg, store::WidgetStore::new());
    server::run(listener, state, server::shutdown_signal()).await?;
    Ok(())
}
