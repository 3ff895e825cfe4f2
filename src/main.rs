use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use sigcatch::domain::signals;
use sigcatch::utils::{logger, validation::Validate};
use sigcatch::{CliConfig, SignalSet, StdoutSink, WatchError, Watcher};
use std::io::Write;

#[derive(Serialize)]
struct CatalogEntry {
    number: i32,
    name: String,
    description: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if cli.list {
        return print_catalog(cli.json);
    }

    tracing::info!("🚀 Starting sigcatch");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let watcher = Watcher::new(config, StdoutSink::new());
    if let Err(e) = watcher.run_forever().await {
        exit_with(&e);
    }

    Ok(())
}

fn exit_with(e: &WatchError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code())
}

fn print_catalog(json: bool) -> anyhow::Result<()> {
    let entries: Vec<CatalogEntry> = SignalSet::catchable()
        .iter()
        .map(|number| CatalogEntry {
            number,
            name: signals::name_of(number),
            description: signals::describe(number),
        })
        .collect();

    let mut stdout = std::io::stdout().lock();
    if json {
        let encoded =
            serde_json::to_string_pretty(&entries).context("failed to encode signal catalog")?;
        writeln!(stdout, "{}", encoded).context("failed to write signal catalog")?;
    } else {
        for entry in &entries {
            writeln!(
                stdout,
                "{}\t{}\t{}",
                entry.number, entry.name, entry.description
            )
            .context("failed to write signal catalog")?;
        }
    }
    Ok(())
}
