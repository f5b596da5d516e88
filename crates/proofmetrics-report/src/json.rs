use serde::Serialize;

use proofmetrics_core::metrics::{ApplicationRecord, CollectionResult, ComponentSummary};

/// Per-application derived figures that are not stored on the record.
#[derive(Debug, Serialize)]
pub struct DerivedMetrics {
    pub reuse_percentage: Option<f64>,
    pub proof_spec_ratio: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationOutput<'a> {
    #[serde(flatten)]
    pub record: &'a ApplicationRecord,
    pub derived: DerivedMetrics,
}

/// JSON view of a collection run, with derived ratios added.
#[derive(Debug, Serialize)]
pub struct CollectionOutput<'a> {
    pub components: &'a ComponentSummary,
    pub kernel_proof_spec_ratio: Option<f64>,
    pub applications: Vec<ApplicationOutput<'a>>,
    pub usage_matrix: &'a [String],
    pub verification_ran: bool,
    pub total_verify_time: f64,
}

impl<'a> CollectionOutput<'a> {
    pub fn new(result: &'a CollectionResult) -> Self {
        Self {
            components: &result.components,
            kernel_proof_spec_ratio: result.components.proof_spec_ratio(),
            applications: result
                .applications
                .values()
                .map(|record| ApplicationOutput {
                    record,
                    derived: DerivedMetrics {
                        reuse_percentage: record.reuse_percentage(),
                        proof_spec_ratio: record.proof_spec_ratio(),
                    },
                })
                .collect(),
            usage_matrix: &result.usage_matrix,
            verification_ran: result.verification_ran,
            total_verify_time: result.total_verify_time(),
        }
    }
}

/// Format a collection run as JSON.
pub fn format_result(result: &CollectionResult, compact: bool) -> String {
    let output = CollectionOutput::new(result);
    if compact {
        serde_json::to_string(&output).expect("CollectionOutput should be serializable")
    } else {
        serde_json::to_string_pretty(&output).expect("CollectionOutput should be serializable")
    }
}
