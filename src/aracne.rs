extern crate clap;
use clap::*;

mod cmd_aracne;

fn main() -> anyhow::Result<()> {
    let app = Command::new("aracne")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`aracne` - Gene network reconstruction by mutual information and DPI")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log progress and run statistics to stderr"),
        )
        .subcommand(cmd_aracne::build::make_subcommand())
        .subcommand(cmd_aracne::consensus::make_subcommand())
        .subcommand(cmd_aracne::dpi::make_subcommand())
        .subcommand(cmd_aracne::marker::make_subcommand())
        .subcommand(cmd_aracne::threshold::make_subcommand())
        .after_help(
            r###"Subcommands:

* build     - MI network from an expression table, with optional DPI
* consensus - Consensus network of bootstrap runs
* dpi       - DPI on an existing .adj file
* marker    - Probe variance, bandwidth and filter status
* threshold - MI threshold of a p-value

`RUST_LOG` overrides the log level set by `--verbose`.

"###,
        );

    let matches = app.get_matches();

    // global flags are recorded in the subcommand's matches
    let verbose = matches.get_flag("verbose")
        || matches
            .subcommand()
            .map(|(_, sub)| sub.get_flag("verbose"))
            .unwrap_or(false);
    let level = if verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("build", sub_matches)) => cmd_aracne::build::execute(sub_matches),
        Some(("consensus", sub_matches)) => cmd_aracne::consensus::execute(sub_matches),
        Some(("dpi", sub_matches)) => cmd_aracne::dpi::execute(sub_matches),
        Some(("marker", sub_matches)) => cmd_aracne::marker::execute(sub_matches),
        Some(("threshold", sub_matches)) => cmd_aracne::threshold::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
