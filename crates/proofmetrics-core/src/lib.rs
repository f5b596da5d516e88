pub mod analyzer;
pub mod config;
pub mod integration;
pub mod metrics;
pub mod pipeline;
pub mod types;
pub mod verify;

pub use analyzer::LineClassifier;
pub use config::Config;
pub use integration::IntegrationClassifier;
pub use metrics::{ApplicationRecord, CollectionResult, ComponentSummary};
pub use pipeline::MetricsPipeline;
pub use types::*;
pub use verify::{ProcessVerifier, Verifier, VerifyError};
