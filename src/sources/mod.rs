//! Candidate sources, one per [`TypeTag`](crate::model::TypeTag).
//!
//! Each source returns `Ok(vec![])` when nothing matches and `Err` only when it
//! could not be consulted at all.

pub mod diagnosis;
pub mod error;
pub mod ethnicity;
pub mod sexual_orientation;


pub use diagnosis::DiagnosisSource;
pub use error::SourceError;
pub use sexual_orientation::SexualOrientationSource;
