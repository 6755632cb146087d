//! Cross-cutting, shared constants.
//!
//! Scores everywhere in the crate are percentages in `[0, 100]`; the thresholds
//! below are expressed on that scale.

/// Fused score at or above which a candidate is flagged as a match.
pub const MATCH_THRESHOLD: f64 = 90.0;

/// Candidates returned per query when the client does not send a `limit`.
pub const DEFAULT_QUERY_LIMIT: usize = 5;

/// Maximum penalty applied to an exact substring match found at the end of the
/// candidate string.
pub const POSITIONAL_DECAY: f64 = 30.0;

/// Score adjustment for generic catch-all vocabulary entries.
pub const GENERALITY_BOOST: f64 = 5.0;

/// Upper bound on a single request to the terminology service.
pub const DEFAULT_TERMINOLOGY_TIMEOUT_SECS: u64 = 10;

/// Cached access tokens are discarded this long before their stated expiry.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Queries of one batch evaluated concurrently.
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 4;

/// Embeddings cached per provider.
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 10_000;

/// Token budget for the BERT-family embedders.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Dimension of stub embeddings (matches MiniLM-sized sentence models).
pub const STUB_EMBEDDING_DIM: usize = 384;

/// Service name advertised in the manifest.
pub const SERVICE_NAME: &str = "DrReconcile Reconciliation Service";

/// Reconciliation API versions advertised in the manifest.
pub const PROTOCOL_VERSIONS: &[&str] = &["0.2"];

/// Prefix under which every reconciliation route is mounted.
pub const API_PREFIX: &str = "/api";

/// Preview iframe size advertised in the manifest.
pub const PREVIEW_WIDTH: u32 = 300;
pub const PREVIEW_HEIGHT: u32 = 200;
