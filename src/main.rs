use clap::Parser;
use std::sync::Arc;
use talon::agents::{
    AgentRegistry, AnalystWorker, GeoWorker, RedactorWorker, SearchWorker, Worker,
};
use talon::backends::{ArchiveStore, DaedraSearch, HttpArchiveStore, HttpHotspotService, NullArchive};
use talon::config::TalonConfig;
use talon::llm::LlmClientFactory;
use talon::orchestrate::{Orchestrator, Synthesizer};
use talon::types::WorkerRole;
use talon::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Parser, Debug)]
#[command(name = "talon-server", about = "OSINT-capable multi-agent reasoning server")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "talon.toml")]
    config: String,

    /// Bind address override
    #[arg(long, env = "TALON_HOST")]
    host: Option<String>,

    /// Port override
    #[arg(short, long, env = "TALON_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talon=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = TalonConfig::load(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let config = Arc::new(config);

    let factory = Arc::new(LlmClientFactory::new(config.clone()));
    let archive: Option<Arc<dyn ArchiveStore>> = if config.archive.endpoint.is_empty() {
        None
    } else {
        Some(Arc::new(HttpArchiveStore::new(config.archive.endpoint.clone())))
    };

    let registry = Arc::new(AgentRegistry::new());
    register_workers(&registry, &config, &factory, archive.clone());

    let synthesizer = Synthesizer::new(
        factory.client_for(WorkerRole::Orchestrator.as_str()),
        config.synthesis.clone(),
    );
    let orchestrator = Arc::new(Orchestrator::new(
        registry,
        synthesizer,
        archive,
        config.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        orchestrator,
    };

    let app = talon::api::routes::create_router()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "TALON server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn register_workers(
    registry: &AgentRegistry,
    config: &Arc<TalonConfig>,
    factory: &Arc<LlmClientFactory>,
    archive: Option<Arc<dyn ArchiveStore>>,
) {
    let max_results = config.search.max_results;
    registry.register(WorkerRole::Search, move || async move {
        Ok(Arc::new(SearchWorker::new(Arc::new(DaedraSearch::new()), max_results))
            as Arc<dyn Worker>)
    });

    let analyst_factory = factory.clone();
    let analyst_archive = archive.unwrap_or_else(|| Arc::new(NullArchive));
    let top_k = config.archive.top_k;
    registry.register(WorkerRole::Analyst, move || {
        let llm = analyst_factory.client_for(WorkerRole::Analyst.as_str());
        let archive = analyst_archive.clone();
        async move { Ok(Arc::new(AnalystWorker::new(archive, llm, top_k)) as Arc<dyn Worker>) }
    });

    // The geo worker depends on an external clustering service; without an
    // endpoint it stays unregistered and routes to it fail as NotAvailable.
    if !config.geo.endpoint.is_empty() {
        let geo_factory = factory.clone();
        let endpoint = config.geo.endpoint.clone();
        registry.register(WorkerRole::Geo, move || {
            let llm = geo_factory.client_for(WorkerRole::Geo.as_str());
            let endpoint = endpoint.clone();
            async move {
                Ok(Arc::new(GeoWorker::new(Arc::new(HttpHotspotService::new(endpoint)), llm))
                    as Arc<dyn Worker>)
            }
        });
    }

    let redactor_factory = factory.clone();
    registry.register(WorkerRole::Redactor, move || {
        let llm = redactor_factory.client_for(WorkerRole::Redactor.as_str());
        async move { Ok(Arc::new(RedactorWorker::new(llm)) as Arc<dyn Worker>) }
    });
}
