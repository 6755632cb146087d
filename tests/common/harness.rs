//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use drreconcile::embedding::{BertEmbedder, SharedProvider};
use drreconcile::gateway::{HandlerState, cors_layer, create_router_with_state};
use drreconcile::reconcile::{Manifest, Reconciler};
use drreconcile::scoring::SemanticScorer;
use drreconcile::sources::{DiagnosisSource, SexualOrientationSource};
use drreconcile::store::MemoryStore;
use drreconcile::terminology::{MockTerminologyClient, TerminologyEntity};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub const TEST_CORS_ORIGIN: &str = "http://127.0.0.1:3333";

pub fn icd_entities() -> Vec<TerminologyEntity> {
    vec![
        TerminologyEntity::new(
            "http://id.who.int/icd/entity/1",
            "<em class='found'>Stroke</em>, not elsewhere classified",
        ),
        TerminologyEntity::new("http://id.who.int/icd/entity/2", "Cerebral ischaemic stroke"),
    ]
}

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    pub store: MemoryStore,
    pub terminology: Arc<MockTerminologyClient>,
    pub stub_embedders: bool,
    pub max_concurrent_queries: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            store: MemoryStore::with_reference_vocabulary(),
            terminology: Arc::new(MockTerminologyClient::new(icd_entities())),
            stub_embedders: false,
            max_concurrent_queries: 2,
        }
    }
}

impl TestServerConfig {
    pub fn with_terminology(mut self, client: MockTerminologyClient) -> Self {
        self.terminology = Arc::new(client);
        self
    }

    pub fn with_stub_embedders(mut self) -> Self {
        self.stub_embedders = true;
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

/// Spawns a server with every collaborator in memory.
///
/// The store is the seeded [`MemoryStore`], the terminology service is a
/// [`MockTerminologyClient`] and embedders are either absent or stubs.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let port = if config.port == 0 {
        find_available_port().await?
    } else {
        config.port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let (general, diagnosis) = if config.stub_embedders {
        let sentence: SharedProvider = Arc::new(BertEmbedder::stub("sentence"));
        let biomedical: SharedProvider = Arc::new(BertEmbedder::stub("biomedical"));
        (
            SemanticScorer::new(vec![sentence.clone()]),
            SemanticScorer::new(vec![sentence, biomedical]),
        )
    } else {
        (SemanticScorer::default(), SemanticScorer::default())
    };

    let reconciler = Reconciler::new(
        config.store.clone(),
        SexualOrientationSource::new(general),
        DiagnosisSource::new(config.terminology, diagnosis),
        config.max_concurrent_queries,
    );
    let manifest = Manifest::new(&format!("http://{local_addr}"));
    let state = HandlerState::new(config.store, reconciler, manifest);

    let app = create_router_with_state(state)
        .layer(cors_layer(HeaderValue::from_static(TEST_CORS_ORIGIN)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
