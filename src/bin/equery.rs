use clap::Parser;
use erun::core::report;
use erun::utils::error::Result;
use erun::utils::logger;
use erun::{FilterSpec, JsonlLedger, QueryArgs, QueryEngine};

fn main() {
    let args = QueryArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(&args) {
        tracing::error!(
            "❌ Query failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.severity().exit_code());
    }
}

fn run(args: &QueryArgs) -> Result<()> {
    let config = args.resolve()?;
    let filter = FilterSpec::parse(&config.filter, &config.expansion)?;
    tracing::debug!("Filter: {:?}", filter);

    let engine = QueryEngine::new(JsonlLedger::new(&config.output_dir));
    let matches = engine.run(&filter)?;

    let stdout = std::io::stdout();
    report::render(
        stdout.lock(),
        config.format,
        &config.output_dir,
        &matches,
        &config.missing_marker,
    )
}
