use std::sync::Arc;

use arith_server::config::{self, AppState, Config};
use arith_server::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config::config_path_from_args(std::env::args().skip(1));
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Tokio runtime sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("Using {workers} worker threads"));
    } else {
        logger::log_info("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(AppState::new(cfg));
    server::start_signal_handler(state.shutdown.clone())?;

    logger::log_server_start(&addr, &state.config);
    println!("Server running on port {}...", addr.port());

    server::run_server(listener, state).await?;
    Ok(())
}
