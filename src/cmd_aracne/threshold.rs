use aracne::libs::config::{check_pvalue, find_threshold};
use clap::*;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("threshold")
        .about("Derive the MI threshold of a p-value")
        .after_help(
            r###"
Reads `alpha beta gamma` from `<home>/config_threshold.txt` (lines starting
with `>` are comments) and prints

    (alpha - ln(p)) / (-beta - gamma * n)

where n is the number of samples.

Examples:
1. aracne threshold -p 1e-7 -n 100 -H config/

"###,
        )
        .arg(
            Arg::new("pvalue")
                .short('p')
                .long("pvalue")
                .required(true)
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("P-value in (0,1]"),
        )
        .arg(
            Arg::new("samples")
                .short('n')
                .long("samples")
                .required(true)
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Number of samples"),
        )
        .arg(
            Arg::new("home")
                .short('H')
                .long("home")
                .num_args(1)
                .default_value(".")
                .help("Directory holding config_threshold.txt"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let pvalue = *args.get_one::<f64>("pvalue").unwrap();
    let n = *args.get_one::<usize>("samples").unwrap();
    let home = args.get_one::<String>("home").unwrap();
    check_pvalue(pvalue)?;

    let threshold = find_threshold(home, pvalue, n)?;
    println!("{}", aracne::format_g(threshold, 6));

    Ok(())
}
