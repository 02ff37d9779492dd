mod cmd;
mod config;

use anyhow::Result;
use clap::Command;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("vaultsite")
        .about("Publish an Obsidian vault as a static website")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::rewrite::make_subcommand())
        .get_matches();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("rewrite", args)) => cmd::rewrite::execute(args),
        _ => unreachable!("subcommand is required"),
    }
}
