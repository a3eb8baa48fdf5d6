use clap::Parser;
use erun::utils::error::{Result, SweepError};
use erun::utils::logger;
use erun::utils::validation::validate_existing_dir;
use erun::{GenerateArgs, JsonlLedger, LineSink, SweepGenerator};

fn main() {
    let args = GenerateArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting erun");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = run(&args) {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        report_failure(&e);
        std::process::exit(e.severity().exit_code());
    }
}

fn run(args: &GenerateArgs) -> Result<()> {
    let config = args.resolve()?;
    tracing::debug!("Resolved config: {:?}", config);

    if !args.dry_run {
        if args.mkdir {
            std::fs::create_dir_all(&config.output_dir)?;
        }
        validate_existing_dir("output_dir", &config.output_dir.to_string_lossy())?;
    } else {
        tracing::info!("🔍 DRY RUN MODE - metadata will not be recorded");
    }

    let ledger = JsonlLedger::new(&config.output_dir);
    let ledger_path = ledger.path().to_path_buf();
    let stdout = std::io::stdout();
    let sink = LineSink::new(stdout.lock());

    let mut generator = SweepGenerator::new(config, ledger, sink).with_dry_run(args.dry_run);
    let records = generator.run()?;

    if !args.dry_run {
        tracing::info!("✅ {} commands recorded in {}", records.len(), ledger_path.display());
    }
    Ok(())
}

fn report_failure(e: &SweepError) {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}
