use clap::Parser;

use potrans_cli::cli::Args;
use potrans_cli::cli::commands::translate;
use potrans_cli::config::ConfigManager;
use potrans_cli::output::{self, OutputConfig};
use potrans_cli::ui::Style;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    output::init(OutputConfig {
        quiet: args.quiet,
        no_color: args.no_color || std::env::var("NO_COLOR").is_ok(),
    });

    if let Err(err) = run(args).await {
        eprintln!("{} {err:#}", Style::error("Error:"));
        std::process::exit(exitcode::SOFTWARE);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = ConfigManager::new()?.load_or_default();
    translate::run(args.command, &config).await
}
