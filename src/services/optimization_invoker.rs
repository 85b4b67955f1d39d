//! Hands the consensus constraints and process overview to the optimization driver.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::models::{AggregatedConstraintSet, ModelConfig, OptimizationConfig};
use crate::domain::ports::{OptimizationDriver, OptimizationRequest};
use crate::domain::PipelineResult;

pub struct OptimizationInvoker {
    driver: Arc<dyn OptimizationDriver>,
}

impl OptimizationInvoker {
    pub fn new(driver: Arc<dyn OptimizationDriver>) -> Self {
        Self { driver }
    }

    /// Package one driver request.
    ///
    /// The constraint text is the aggregated artifact exactly as written to disk.
    pub fn build_request(
        overview: &str,
        constraints: &AggregatedConstraintSet,
        model: &ModelConfig,
        optimization: &OptimizationConfig,
    ) -> OptimizationRequest {
        OptimizationRequest {
            context: overview.to_string(),
            constraint_text: constraints.to_artifact_text(),
            constraints: constraints.clone(),
            llm_config: model.clone(),
            optimization_config: optimization.clone(),
        }
    }

    /// Run the driver to completion and return the trace path it wrote.
    #[instrument(skip_all, fields(variables = constraints.len()))]
    pub async fn run(
        &self,
        overview: &str,
        constraints: &AggregatedConstraintSet,
        model: &ModelConfig,
        optimization: &OptimizationConfig,
    ) -> PipelineResult<PathBuf> {
        let request = Self::build_request(overview, constraints, model, optimization);
        info!(
            metric = %optimization.optimization_metric,
            trace = %request.trace_path().display(),
            "starting optimization"
        );
        self.driver.run(&request).await?;
        Ok(request.trace_path().clone())
    }
}
