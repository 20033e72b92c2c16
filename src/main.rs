// src/main.rs
use bloc_miner_control::config::FileConfigStore;
use bloc_miner_control::miner::detect_backend_kind;
use bloc_miner_control::{self, *};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{self, BufReader};
use tokio::runtime::Runtime;

/// Main entry point for the miner control plane
///
/// # Returns
/// - `Ok(())` on orderly exit
/// - `Err(MinerError)` if start-up or shutdown fails
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Run(opts) => run(opts),
        cli::Action::Detect(opts) => detect(opts),
    }
}

/// Serves the front-end until it closes, a signal arrives or a fatal
/// condition requests termination
///
/// # Arguments
/// * `opts` - Command line options
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads the persisted session, if any
/// 3. Builds the coordinator and starts the stats loops
/// 4. Serves the JSON-lines transport on stdin/stdout
/// 5. Shuts down (backend stop first) and exits with code 1 after a fatal error
fn run(opts: cli::RunOptions) -> Result<(), MinerError> {
    if opts.debug {
        utils::init_debug_logging(&opts.working_dir)?;
    } else {
        utils::init_logging();
    }

    if opts.api_endpoint.trim().is_empty() {
        return Err(MinerError::ConfigError(
            "The API endpoint must be specified".into(),
        ));
    }

    let settings = opts.settings();
    let store = FileConfigStore::new(&settings.session_file);
    let persisted = store.load()?;

    // A continuing session keeps talking to the service it was created with
    let endpoint = persisted
        .as_ref()
        .map(|session| session.api_endpoint.clone())
        .filter(|endpoint| !endpoint.is_empty())
        .unwrap_or_else(|| settings.defaults.api_endpoint.clone());
    log::info!("Using pool statistics service at {}", endpoint);

    let services = Services {
        pools: Arc::new(PoolClient::new(&endpoint)?),
        backends: Arc::new(DefaultBackendFactory),
        store: Arc::new(store),
    };

    let rt = Runtime::new()?;
    let fatal = rt.block_on(async {
        let (ui, events) = UiHandle::channel();
        let coordinator = Coordinator::new(settings, persisted, services, ui)?;
        let poller = coordinator.spawn_pollers();

        tokio::select! {
            served = ui::serve(
                coordinator.clone(),
                events,
                BufReader::new(io::stdin()),
                io::stdout(),
            ) => served?,
            _ = tokio::signal::ctrl_c() => log::info!("Interrupted"),
        }

        coordinator.shutdown(poller).await?;
        let fatal = *coordinator.termination().borrow();
        Ok::<bool, MinerError>(fatal)
    })?;

    if fatal {
        log::logger().flush();
        std::process::exit(1);
    }
    Ok(())
}

/// Prints the kind and path of the bundled miner
///
/// # Arguments
/// * `opts` - Detection options
fn detect(opts: cli::DetectOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let miner_dir = opts.working_dir.join(config::settings::MINER_DIR);
    let (kind, path) = detect_backend_kind(&miner_dir)?;
    println!("{} {}", kind, path.display());
    Ok(())
}
