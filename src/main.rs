use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cli = wut::cli::Cli::parse();
    let _guard = wut::logging::init_tracing(cli.log_filter.as_deref(), cli.log_file.clone())?;
    let config = wut::config::from_cli(&cli)?;

    match cli.command.clone() {
        Some(wut::cli::CliCommand::Tui) | None => {
            wut::tui::run(config)?;
        }
        Some(command) => {
            let client =
                wut::core::TodoClient::connect(&config).context("failed to build API client")?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            wut::commands::execute(&client, command, &mut handle)?;
        }
    }

    Ok(())
}
