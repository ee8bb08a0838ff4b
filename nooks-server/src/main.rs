use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use nooks_server::cache::CachedSearchClient;
use nooks_server::config::Config;
use nooks_server::llm::LlmClient;
use nooks_server::serp::SerpClient;
use nooks_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "nooks_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let serp = SerpClient::new(config.serp)?;
    let search = CachedSearchClient::new(serp, &config.cache);
    let llm = LlmClient::new(config.llm)?;
    info!(model = llm.model(), "completion client ready");

    let app = create_router(AppState::new(search, llm));

    let listener = TcpListener::bind(config.bind).await?;
    info!("Travel planner listening on http://{}", config.bind);
    info!("API Endpoints:");
    info!("  GET  /health                    - Health check");
    info!("  POST /api/flights/search        - Search flights");
    info!("  POST /api/flights/return        - Return flights for a departure token");
    info!("  POST /api/flights/next-segment  - Next multi-city leg");
    info!("  POST /api/hotels/search         - Search hotels");
    info!("  POST /api/hotels/details        - Hotel details");
    info!("  POST /api/expense-analysis      - Estimate trip expenses");
    info!("  POST /api/itinerary/retime      - Shift an itinerary");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
