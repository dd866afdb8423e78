use ab_insight::core::ConfigProvider;
use ab_insight::utils::error::ErrorSeverity;
use ab_insight::utils::{logger, validation::Validate};
use ab_insight::{AnalysisEngine, AnalysisPipeline, LocalStorage, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-analyze")]
#[command(about = "A/B analysis driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ab-config.toml")]
    config: String,

    /// Override the input CSV from the config
    #[arg(short, long)]
    input: Option<String>,

    /// Override the significance level from the config
    #[arg(long)]
    alpha: Option<f64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be analysed without reading the data
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_logger(args.verbose || config.logging_verbose(), config.logging_json());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 套用命令列覆蓋設定
    if let Some(input) = args.input {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.source.input_path = Some(input);
    }
    if let Some(alpha) = args.alpha {
        tracing::info!("🔧 Alpha overridden to: {}", alpha);
        config.analysis.alpha = alpha;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        println!("🔍 Dry run: no data was read and no report was written.");
        return Ok(());
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
            println!("📁 Report saved to: {}", run.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    let policy = config.policy();

    println!("📋 Configuration Summary:");
    println!("  Analysis: {}", config.analysis.name);
    if let Some(description) = &config.analysis.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_path());
    println!(
        "  Alpha: {} ({:.0}% confidence)",
        config.alpha(),
        (1.0 - config.alpha()) * 100.0
    );
    println!(
        "  Groups: '{}' = {} vs {}",
        policy.group_column, policy.control_label, policy.treatment_label
    );
    println!(
        "  Conversion: '{}' (fallback '{}' >= 1)",
        policy.converted_column, policy.purchase_column
    );
    if policy.require_landing_page_consistency {
        println!(
            "  Landing page rule: '{}' must be {} / {}",
            policy.landing_page_column, policy.control_landing_page, policy.treatment_landing_page
        );
    }
    if let Some(key) = &policy.dedupe_by {
        println!("  De-duplicate by: {}", key);
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Archive: {}", config.archive());
    println!();
}
