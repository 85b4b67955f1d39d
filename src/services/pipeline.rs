//! End-to-end pipeline: sample, aggregate, optimize, extract.
//!
//! Stages run strictly in sequence and exchange data through the
//! constraint file store, so each one can also be run on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::{
    AggregatedConstraintSet, CandidateResult, Config, ExtractionOutcome, ExtractionStats,
    OptimizationMetric,
};
use crate::domain::ports::{ChatClient, OptimizationDriver};
use crate::domain::{PipelineError, PipelineResult};
use crate::infrastructure::config::PromptTemplates;
use crate::infrastructure::driver::SubprocessDriver;
use crate::infrastructure::llm::OpenAiChatClient;
use crate::infrastructure::store::ConstraintFileStore;
use crate::services::constraint_aggregator::{AggregationReport, ConstraintAggregator};
use crate::services::context_sampler::{ContextSampler, SamplingReport};
use crate::services::optimization_invoker::OptimizationInvoker;
use crate::services::result_extractor::ResultExtractor;

/// Aggregated artifacts that the sampling pass of this run did not write.
fn foreign_artifacts(sampling: &SamplingReport, aggregation: &AggregationReport) -> Vec<PathBuf> {
    aggregation
        .artifacts
        .iter()
        .filter(|path| {
            !sampling
                .constraint_paths
                .iter()
                .any(|own| own.file_name() == path.file_name())
        })
        .cloned()
        .collect()
}

/// Progress notifications emitted while the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sampling { iteration: u32, total: u32 },
    Aggregating,
    Optimizing,
    Extracting,
}

type ProgressFn = Box<dyn Fn(Stage) + Send + Sync>;

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub metric: OptimizationMetric,
    pub constraints: AggregatedConstraintSet,
    pub trace_path: PathBuf,
    pub best: CandidateResult,
    pub stats: ExtractionStats,
}

pub struct Pipeline {
    config: Config,
    store: ConstraintFileStore,
    client: Arc<dyn ChatClient>,
    driver: Arc<dyn OptimizationDriver>,
    progress: Option<ProgressFn>,
}

impl Pipeline {
    /// Wire the pipeline with its production adapters.
    pub fn from_config(config: Config) -> PipelineResult<Self> {
        let client = OpenAiChatClient::new(&config.model)
            .map_err(|e| PipelineError::Config(format!("Invalid model configuration: {e}")))?;
        let driver = SubprocessDriver::new(config.optimization.driver.clone());
        Ok(Self::with_adapters(config, Arc::new(client), Arc::new(driver)))
    }

    /// Wire the pipeline with caller-supplied adapters.
    pub fn with_adapters(
        config: Config,
        client: Arc<dyn ChatClient>,
        driver: Arc<dyn OptimizationDriver>,
    ) -> Self {
        let store = ConstraintFileStore::new(&config.context_agent);
        Self {
            config,
            store,
            client,
            driver,
            progress: None,
        }
    }

    /// Register a progress callback.
    #[must_use]
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(Stage) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn notify(&self, stage: Stage) {
        if let Some(ref progress) = self.progress {
            progress(stage);
        }
    }

    /// Context sampling stage.
    pub async fn sample(&self) -> PipelineResult<SamplingReport> {
        let agent = &self.config.context_agent;
        let templates = PromptTemplates::load(&agent.context_agent_prompt_path).await?;
        let total = agent.context_sampling_iterations;

        self.notify(Stage::Sampling { iteration: 0, total });
        ContextSampler::new(Arc::clone(&self.client), self.store.clone())
            .run(total, &templates.context_agent_prompt, |iteration| {
                self.notify(Stage::Sampling { iteration, total });
            })
            .await
    }

    /// Constraint aggregation stage.
    pub async fn aggregate(&self) -> PipelineResult<AggregationReport> {
        self.notify(Stage::Aggregating);
        ConstraintAggregator::new(self.store.clone()).run().await
    }

    /// Optimization stage, fed by a fresh aggregation of the stored artifacts.
    pub async fn optimize(&self) -> PipelineResult<(AggregationReport, PathBuf)> {
        let aggregation = self.aggregate().await?;
        let trace = self.invoke_driver(&aggregation).await?;
        Ok((aggregation, trace))
    }

    async fn invoke_driver(&self, aggregation: &AggregationReport) -> PipelineResult<PathBuf> {
        self.notify(Stage::Optimizing);
        OptimizationInvoker::new(Arc::clone(&self.driver))
            .run(
                &aggregation.overview,
                &aggregation.constraints,
                &self.config.model,
                &self.config.optimization,
            )
            .await
    }

    /// Extraction stage. Reads the configured trace unless `trace` is given.
    pub async fn extract(&self, trace: Option<&Path>) -> PipelineResult<ExtractionOutcome> {
        self.notify(Stage::Extracting);
        let optimization = &self.config.optimization;
        let path = trace.unwrap_or(optimization.optimization_save_path.as_path());
        ResultExtractor::new(optimization.optimization_metric, &optimization.trace)
            .extract_from_file(path)
            .await
    }

    /// Run every stage once, in order.
    pub async fn run(&self) -> PipelineResult<PipelineReport> {
        self.run_with(|_| {}).await
    }

    /// Like [`Pipeline::run`], handing the averaged constraints to
    /// `on_aggregated` before the optimization driver starts.
    #[instrument(skip(self, on_aggregated), fields(run_id = tracing::field::Empty))]
    pub async fn run_with<F>(&self, on_aggregated: F) -> PipelineResult<PipelineReport>
    where
        F: FnOnce(&AggregatedConstraintSet) + Send,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        info!("pipeline started");
        let sampling = self.sample().await?;
        let aggregation = self.aggregate().await?;
        let foreign = foreign_artifacts(&sampling, &aggregation);
        if !foreign.is_empty() || aggregation.artifacts.len() != sampling.constraint_paths.len() {
            warn!(
                sampled = sampling.constraint_paths.len(),
                aggregated = aggregation.artifacts.len(),
                ?foreign,
                "aggregated constraint artifacts differ from this run's samples"
            );
        }
        on_aggregated(&aggregation.constraints);
        let trace_path = self.invoke_driver(&aggregation).await?;
        let outcome = self.extract(Some(trace_path.as_path())).await?;
        let stats = outcome.stats;
        let best = outcome.into_best()?;

        let finished_at = Utc::now();
        info!(
            best = best.metric_value,
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "pipeline finished"
        );

        Ok(PipelineReport {
            run_id,
            started_at,
            finished_at,
            metric: self.config.optimization.optimization_metric,
            constraints: aggregation.constraints,
            trace_path,
            best,
            stats,
        })
    }
}
