use crate::core::Pipeline;
use crate::domain::model::AnalysisRun;
use crate::utils::error::Result;
use std::time::Instant;

pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<AnalysisRun> {
        let started = Instant::now();
        tracing::info!("Starting A/B analysis...");

        // Extract
        tracing::info!("Reading experiment data...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!("Read {} rows", dataset.len());

        // Transform
        tracing::info!("Comparing groups...");
        let report = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "Control {:.2}% vs treatment {:.2}% ({} of {} rows used), p = {:.5}",
            report.result.rate_control * 100.0,
            report.result.rate_treatment * 100.0,
            report.rows_used,
            report.rows_read,
            report.result.p_value
        );

        // Load
        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Report saved to: {} in {:?}", output_path, started.elapsed());

        Ok(AnalysisRun {
            output_path,
            recommendation: report.recommendation,
            warnings: report.warnings,
        })
    }
}
