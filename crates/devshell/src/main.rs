//! `devshell` entry point.

use clap::Parser as _;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = devshell::Cli::parse();
    cli.command.run()
}
