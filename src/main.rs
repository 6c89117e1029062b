use anyhow::Result;
use clap::Parser;
use todos::cli::CliCommand;
use todos::model::StatusFilter;

fn main() -> Result<()> {
    let cli = todos::cli::Cli::parse();
    let config = todos::config::from_cli(&cli)?;
    let _log_guard = todos::logging::init_logging(&config, cli.log_filter.as_deref())?;
    tracing::debug!(command = ?cli.command, "dispatching");

    match cli.command {
        Some(CliCommand::Tui(args)) => todos::tui::run(config, args.filter)?,
        None => todos::tui::run(config, StatusFilter::default())?,
        Some(CliCommand::List(args)) => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            todos::commands::list(&config, &args, &mut handle)?;
        }
    }

    Ok(())
}
