use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct CleanerEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> CleanerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs read, clean and write in order; returns the output path.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting transcript cleaning process...");
        self.monitor.log_phase("Start");

        let transcript = self.pipeline.extract().await?;
        tracing::info!("Read {} characters", transcript.text.chars().count());
        self.monitor.log_phase("Read");

        tracing::info!("Cleaning transcript...");
        let cleaned = self.pipeline.transform(transcript).await?;
        let report = &cleaned.report;
        tracing::info!(
            "Cleaned {} chunks ({} kept original text), {} tokens used",
            report.chunks_total,
            report.chunks_failed,
            report.usage.total_tokens
        );
        if !report.speakers.is_empty() {
            tracing::info!("Speakers: {}", report.speakers.join(", "));
        }
        self.monitor.log_phase("Clean");

        let output_path = self.pipeline.load(cleaned).await?;
        self.monitor.log_phase("Write");
        self.monitor.log_totals();

        tracing::info!("Transcript cleaning completed successfully!");
        Ok(output_path)
    }
}
