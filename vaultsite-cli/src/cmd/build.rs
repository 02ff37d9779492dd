use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::Path;
use vaultsite_core::build_site;
use crate::config::load_build_config;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Vault directory containing markdown files [default: .]")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site, deleted on every build [default: ./_site]")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./vaultsite.toml]")
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build"))
        .about("Build static site from the vault's markdown files")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let vaultsite_config = load_build_config(args)?;
    tracing::debug!("{vaultsite_config:#?}");
    let build_config = vaultsite_config.build_config();

    let source_dir = Path::new(&build_config.source);
    let output_dir = Path::new(&build_config.output);

    let report = build_site(vaultsite_config.site_config(), source_dir, output_dir)?;

    println!(
        "Build OK: {} pages, {} assets in {}",
        report.pages_written,
        report.assets_copied,
        output_dir.display()
    );

    Ok(())
}
