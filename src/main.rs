use clap::Parser;
use routecomb::cli::{run_cli, Cli};
use routecomb::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging_with_config(&LogConfig::from_env())?;
    let cli = Cli::parse();
    run_cli(&cli, &mut std::io::stdout().lock())
}
