pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::batched::compute_alignment_matrix_batched;
pub use alignment::reference::compute_alignment_matrix;
pub use config::{ComputeDType, EngineConfig};
pub use error::AlignmentError;
pub use pipeline::builder::AlignmentEngineBuilder;
pub use pipeline::runtime::AlignmentEngine;
pub use types::{AlignmentBatch, AlignmentMatrix, EmissionBatch};
