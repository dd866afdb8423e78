use ab_insight::utils::error::{AnalysisError, ErrorSeverity};
use ab_insight::utils::{logger, validation::Validate};
use ab_insight::{AnalysisEngine, AnalysisPipeline, CliConfig, LocalStorage};
use clap::Parser;

fn exit_code(e: &AnalysisError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(e: &AnalysisError) {
    tracing::error!(
        "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting ab-insight CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::default();
    let pipeline = AnalysisPipeline::new(storage, config);
    let engine = AnalysisEngine::new(pipeline);

    match engine.run().await {
        Ok(run) => {
            for warning in &run.warnings {
                println!("⚠️ {}", warning);
            }
            println!("{}", run.recommendation.message);
            println!(
                "p-value = {:.5}, uplift = {:.2}%",
                run.recommendation.p_value,
                run.recommendation.uplift * 100.0
            );
            println!("📁 Report saved to: {}", run.output_path);
        }
        Err(e) => {
            report_failure(&e);
            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
