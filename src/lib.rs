//! DrReconcile library crate (used by the server binary and integration tests).
//!
//! Matches free-text clinical values (ethnicity, sexual orientation, admission
//! diagnosis) against controlled vocabularies for OpenRefine, and writes
//! reconciled corrections back to the registry database.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`TypeTag`], [`VocabularyEntry`], [`UpdateRow`] - Domain model
//! - [`Reconciler`], [`Candidate`], [`QueryResult`] - Reconciliation
//! - [`BatchUpdater`] - Correction write-back
//!
//! ## Scoring & Embedding
//! - [`lexical_score`] - Edit-distance similarity with positional decay
//! - [`SemanticScorer`] - Cosine similarity across [`EmbeddingProvider`]s
//! - [`BertEmbedder`], [`CachedEmbedder`] - Embedding generation
//!
//! ## Collaborators
//! - [`ReferenceStore`] with [`PgStore`] and [`MemoryStore`]
//! - [`TerminologyClient`] with [`Icd11Client`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod model;
pub mod reconcile;
pub mod scoring;
pub mod sources;
pub mod store;
pub mod terminology;
pub mod update;

pub use config::{Config, ConfigError};
pub use embedding::{
    BertEmbedder, CachedEmbedder, EmbedderConfig, EmbeddingError, EmbeddingProvider, Pooling,
    SharedProvider,
};
pub use gateway::{GatewayError, HandlerState, cors_layer, create_router_with_state};
pub use model::{TypeRef, TypeTag, UpdateRow, UpdateTarget, VocabularyEntry};
pub use reconcile::{
    Candidate, Manifest, Query, QueryBatch, QueryResult, QueryScope, ReconcileError, Reconciler,
    ReconciliationResult, SourceFailure, parse_queries, rank,
};
pub use scoring::{
    ScoringError, SemanticScorer, cosine_similarity, generality_boost, lexical_score,
    split_aliases,
};
pub use sources::{DiagnosisSource, SexualOrientationSource, SourceError};
pub use store::{MemoryStore, PgStore, ReferenceStore, StoreError};
#[cfg(any(test, feature = "mock"))]
pub use terminology::MockTerminologyClient;
pub use terminology::{
    Icd11Client, TerminologyClient, TerminologyConfig, TerminologyEntity, TerminologyError,
    strip_markup,
};
pub use update::{BatchUpdater, CorrectionRow, UpdateError, parse_corrections};
