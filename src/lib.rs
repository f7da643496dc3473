//! CreditWise: assigns customer records to precomputed K-Means segments
//!
//! The library turns a raw, mixed-type customer record into the numeric
//! vector a trained clustering model expects (categorical encoding, standard
//! scaling, canonical column order), finds the nearest centroid and resolves
//! it to a segment name.

pub mod artifacts;
pub mod assembler;
pub mod cli;
pub mod data;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod segments;

// Re-export public items for easier access
pub use artifacts::{ArtifactBundle, Artifacts};
pub use assembler::{assemble, FeatureOrder};
pub use cli::Args;
pub use data::{load_records, write_predictions, RecordTable};
pub use encoder::{CategoricalCodec, EncoderBank};
pub use error::{Error, Result};
pub use model::{assign, CentroidModel};
pub use normalizer::{NormalizationStats, Normalizer};
pub use pipeline::{Prediction, Segmenter, SharedSegmenter};
pub use record::{CustomerRecord, FieldValue};
pub use segments::{resolve, SegmentNames};
