use anyhow::Context;
use clap::Parser;
use registration_growth::adapters::export::render_summary;
use registration_growth::adapters::loader::pattern_matcher;
use registration_growth::core::pipeline::planned_outputs;
use registration_growth::core::{ConfigProvider, Storage};
use registration_growth::utils::error::ErrorSeverity;
use registration_growth::utils::{logger, validation::Validate};
use registration_growth::{EtlEngine, LocalStorage, ReportPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Registration growth report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - list the input files and outputs without computing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based registration report");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No report will be written");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }
    let preview_rows = config.preview_rows();

    let pipeline = ReportPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            println!("{}", render_summary(&outcome.report, preview_rows));
            tracing::info!("✅ Report completed successfully!");
            println!("📁 Output saved to: {}", outcome.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Report: {}", config.report.name);
    if let Some(description) = &config.report.description {
        println!("  Description: {}", description);
    }
    println!(
        "  Source: {}/{}",
        config.data_dir(),
        config.file_pattern()
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!(
        "  Granularity: {}",
        config
            .granularity()
            .map(|g| g.to_string())
            .unwrap_or_else(|| "detected from data".to_string())
    );
    println!("  Top manufacturers: {}", config.top_n());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 輸入檔案分析
    println!("📥 Input Files:");
    let matcher = pattern_matcher(config.file_pattern())?;
    let files: Vec<String> = LocalStorage::default()
        .list_files(config.data_dir())
        .await
        .with_context(|| format!("Cannot list '{}'", config.data_dir()))?
        .into_iter()
        .filter(|name| matcher.is_match(name))
        .collect();
    if files.is_empty() {
        println!("  ⚠️ No files match '{}'", config.file_pattern());
    }
    for file in &files {
        println!("  {}", file);
    }

    // 篩選條件分析
    let filter = config.filter();
    println!();
    println!("🔎 Filters:");
    if filter.categories.is_empty() && config.apply_default_selection() {
        println!("  Categories: default (2W/3W/4W)");
    } else {
        println!("  Categories: {:?}", filter.categories);
    }
    if filter.manufacturers.is_empty() && config.apply_default_selection() {
        println!("  Manufacturers: top {} by registrations", config.top_n());
    } else {
        println!("  Manufacturers: {:?}", filter.manufacturers);
    }
    if let Some(since) = filter.since {
        println!("  Since: {}", since);
    }
    if let Some(until) = filter.until {
        println!("  Until: {}", until);
    }

    // 輸出分析
    println!();
    println!("💾 Outputs:");
    for name in planned_outputs(config) {
        println!("  {}/{}", config.output_path(), name);
    }

    println!();
    println!("✅ Dry run analysis complete.");

    Ok(())
}
