use super::utils::*;
use aracne::format_g;
use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("marker")
        .about("Summarize the probes of an expression table")
        .after_help(
            r###"
Prints one line per probe:

    accession <TAB> label <TAB> active <TAB> variance <TAB> bandwidth

Variance and kernel bandwidth are computed over the samples selected by `-c`,
or over all samples.

Examples:
1. All probes:
   aracne marker expr.tsv

2. After filtering, on the lower 35% tail of a control probe:
   aracne marker expr.tsv -f 50 0.2 -c -24 0.35

"###,
        )
        .arg(arg_infile())
        .arg(arg_condition())
        .arg(arg_filter())
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let params = params_from_args(args)?;
    params.validate()?;

    let Dataset {
        mut data, samples, ..
    } = load_dataset(&params)?;
    data.compute_bandwidth(&samples);

    let mut writer = aracne::writer(&params.outfile())?;
    for m in data.markers() {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\t{}\n",
            m.accession,
            m.label,
            m.active,
            format_g(m.variance, 6),
            format_g(m.bandwidth, 6)
        ))?;
    }
    writer.flush()?;

    Ok(())
}
