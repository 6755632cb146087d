//! DrReconcile HTTP server entrypoint.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use drreconcile::config::{Config, DEFAULT_PORT};
use drreconcile::embedding::{BertEmbedder, CachedEmbedder, EmbedderConfig, SharedProvider};
use drreconcile::gateway::{HandlerState, cors_layer, create_router_with_state};
use drreconcile::reconcile::{Manifest, Reconciler};
use drreconcile::scoring::SemanticScorer;
use drreconcile::sources::{DiagnosisSource, SexualOrientationSource};
use drreconcile::store::{MemoryStore, PgStore, ReferenceStore};
use drreconcile::terminology::{Icd11Client, TerminologyClient};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    // Checked before any runtime exists; the health check builds its own.
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        public_url = %config.public_url,
        "DrReconcile starting"
    );

    let sentence = load_provider(
        config.sentence_model_path.as_deref(),
        EmbedderConfig::sentence,
        config.embedding_cache_capacity,
    )?;
    let biomedical = load_provider(
        config.biomedical_model_path.as_deref(),
        EmbedderConfig::biomedical,
        config.embedding_cache_capacity,
    )?;

    let general_scorer = SemanticScorer::new(sentence.iter().cloned().collect());
    let diagnosis_scorer =
        SemanticScorer::new(sentence.into_iter().chain(biomedical).collect());

    let terminology = Icd11Client::new(config.terminology.clone())?;
    if !terminology.is_configured() {
        tracing::warn!("No ICD-11 client credentials configured, diagnosis lookups will fail");
    }

    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            tracing::info!("Connected to Postgres");
            serve(&config, store, terminology, general_scorer, diagnosis_scorer).await
        }
        None => {
            tracing::warn!(
                "No DRRECONCILE_DATABASE_URL configured, using in-memory reference vocabularies"
            );
            let store = MemoryStore::with_reference_vocabulary();
            serve(&config, store, terminology, general_scorer, diagnosis_scorer).await
        }
    }
}

fn load_provider(
    path: Option<&Path>,
    make_config: fn(PathBuf) -> EmbedderConfig,
    cache_capacity: u64,
) -> anyhow::Result<Option<SharedProvider>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let embedder_config = make_config(path.to_path_buf());
    let name = embedder_config.name.clone();
    let embedder = BertEmbedder::load(embedder_config)?;
    tracing::info!(provider = %name, path = %path.display(), "Embedding model loaded");

    Ok(Some(Arc::new(CachedEmbedder::new(embedder, cache_capacity))))
}

async fn serve<S, T>(
    config: &Config,
    store: S,
    terminology: T,
    general_scorer: SemanticScorer,
    diagnosis_scorer: SemanticScorer,
) -> anyhow::Result<()>
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    if general_scorer.is_empty() {
        tracing::warn!("No embedding model configured, scoring is lexical only");
    }

    let reconciler = Reconciler::new(
        store.clone(),
        SexualOrientationSource::new(general_scorer),
        DiagnosisSource::new(terminology, diagnosis_scorer),
        config.max_concurrent_queries,
    );
    let state = HandlerState::new(store, reconciler, Manifest::new(&config.public_url));

    let app = create_router_with_state(state).layer(cors_layer(config.cors_origin_header()?));

    let addr: SocketAddr = config.socket_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("DrReconcile shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return 1,
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
