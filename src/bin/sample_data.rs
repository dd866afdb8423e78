use ab_insight::core::dataset::{sample_csv, SampleSpec};
use ab_insight::core::Storage;
use ab_insight::utils::logger;
use ab_insight::LocalStorage;
use clap::Parser;

#[derive(Parser)]
#[command(name = "sample-data")]
#[command(about = "Write a sample A/B test CSV to try the analyzer with")]
struct Args {
    #[arg(short, long, default_value = "sample_ab_data.csv")]
    output: String,

    #[arg(long, default_value_t = 150)]
    rows_per_group: u64,

    #[arg(long, default_value_t = 30)]
    control_conversions: u64,

    #[arg(long, default_value_t = 45)]
    treatment_conversions: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let spec = SampleSpec {
        rows_per_group: args.rows_per_group,
        control_conversions: args.control_conversions,
        treatment_conversions: args.treatment_conversions,
    };
    let csv = sample_csv(&spec)?;

    LocalStorage::default()
        .write_file(&args.output, csv.as_bytes())
        .await?;

    tracing::info!("Wrote {} rows to {}", spec.rows_per_group * 2, args.output);
    println!("📁 Sample CSV saved to: {}", args.output);
    Ok(())
}
