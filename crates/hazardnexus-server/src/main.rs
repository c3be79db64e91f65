use anyhow::Result;
use clap::Parser;
use hazardnexus_server::cli::{Cli, Commands};
use hazardnexus_server::config::{ConfigOverrides, ServiceConfig};
use hazardnexus_server::cycle::{CYCLES_TOTAL, CYCLE_DURATION_MS, SOURCE_FAILURES_TOTAL};
use hazardnexus_server::{run_server, AppState};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve {
            listen,
            port,
            interval,
            bulletins,
            no_initial_run,
        } => {
            let overrides = ConfigOverrides {
                listen,
                port,
                interval_minutes: interval,
                collect_bulletins: bulletins,
                skip_initial_run: no_initial_run,
            };
            let config = ServiceConfig::load(&cli.config, &overrides)?;

            info!("Starting HazardNexus v{}", env!("CARGO_PKG_VERSION"));
            info!("Config: {}", cli.config);
            info!(
                "Collecting every {} minutes (bulletins: {})",
                config.collection.interval_minutes, config.collection.collect_bulletins
            );

            let metrics = init_metrics()?;
            let state = AppState::initialize(config, Some(metrics)).await?;
            info!("Rendering: {}", state.rendering);

            run_server(state, shutdown_signal()).await?;
        }

        Commands::Collect => {
            let overrides = ConfigOverrides {
                collect_bulletins: true,
                ..Default::default()
            };
            let config = ServiceConfig::load(&cli.config, &overrides)?;
            let state = AppState::initialize(config, None).await?;

            match state.orchestrator.run_once().await? {
                Some(snapshot) => {
                    println!("Snapshot written to {}", state.store.path().display());
                    println!("  Alerts:    {}", snapshot.alerts.len());
                    println!("  Cities:    {}", snapshot.key_metrics.len());
                    println!("  Bulletins: {}", snapshot.bulletins.len());
                    for (id, record) in &snapshot.bulletins {
                        if record.is_error() {
                            println!("    {id}: failed");
                        } else {
                            println!("    {id}: {} images", record.image_paths().map_or(0, |p| p.len()));
                        }
                    }
                }
                None => warn!("A collection cycle is already running"),
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("hazardnexus=debug,hazardnexus_server=debug,hazardnexus_collectors=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("hazardnexus=info,hazardnexus_server=info,hazardnexus_collectors=info,hazardnexus_store=info,hazardnexus_classifiers=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(CYCLES_TOTAL, "Collection cycles by outcome");
    metrics::describe_counter!(
        SOURCE_FAILURES_TOTAL,
        "Sources that failed and kept their previous value"
    );
    metrics::describe_histogram!(
        CYCLE_DURATION_MS,
        metrics::Unit::Milliseconds,
        "Collection cycle duration in milliseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
