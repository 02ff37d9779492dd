use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use vaultsite_core::LinkRewriter;
use crate::config::load_rewrite_config;

pub fn make_subcommand() -> Command {
    Command::new("rewrite")
        .about("Root relative href/src links of a built site under the base path")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory of the built site [default: ./_site]")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./vaultsite.toml]")
        )
        .arg(
            Arg::new("base_path")
                .short('b')
                .long("base-path")
                .value_name("PATH")
                .help("Prefix for rewritten links [default: /]")
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let vaultsite_config = load_rewrite_config(args)?;
    let output_dir = &vaultsite_config.build_config().output;

    let rewriter = LinkRewriter::new(&vaultsite_config.site_config().site.base_path);
    let report = rewriter.rewrite_dir(output_dir)?;

    println!(
        "Links rewritten under {} in {} of {} pages",
        rewriter.base_path(),
        report.files_rewritten,
        report.files_scanned
    );

    Ok(())
}
