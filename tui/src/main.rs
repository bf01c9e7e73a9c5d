use clap::Parser;
use color_eyre::eyre::Result;
use tagscope_tui::Cli;
use tagscope_tui::logging;
use tagscope_tui::run_main;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _log_guard = logging::init()?;
    run_main(cli).await
}
