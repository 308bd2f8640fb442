use anyhow::Context;
use clap::Parser;
use smart_charging::utils::{logger, validation::Validate};
use smart_charging::{
    ChargingEngine, CliConfig, CommandScript, EngineConfig, ErrorCategory, InMemoryStore,
    ScriptRunner,
};

fn exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Validation => 2,
        ErrorCategory::MissingDependency => 3,
        ErrorCategory::Conflict => 4,
        ErrorCategory::Capacity => 5,
        ErrorCategory::Infrastructure => 1,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut engine_config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading engine config from {}", path))?,
        None => EngineConfig::default(),
    };
    if cli.json {
        engine_config.logging.json = true;
    }

    logger::init_cli_logger(cli.verbose, &engine_config.logging);
    tracing::info!("Starting {}", engine_config.engine.name);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(exit_code(e.category()));
    }

    let script = CommandScript::from_file(&cli.script)
        .with_context(|| format!("loading command script from {}", cli.script))?;
    tracing::info!("Loaded {} commands from {}", script.len(), cli.script);

    let engine = ChargingEngine::new(InMemoryStore::new(), &engine_config);
    let runner = ScriptRunner::new(engine).with_fail_fast(cli.fail_fast);
    let summary = runner.run(script.into_commands()).await;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(category) = summary.first_failure {
        tracing::error!(
            "{} of {} commands failed",
            summary.failed,
            summary.failed + summary.succeeded
        );
        std::process::exit(exit_code(category));
    }

    Ok(())
}
