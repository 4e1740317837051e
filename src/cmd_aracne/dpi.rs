use super::utils::*;
use anyhow::Context;
use aracne::libs::adj::{read_adj, write_adj};
use aracne::libs::dpi;
use aracne::libs::expr::ExprSet;
use aracne::libs::graph::GeneGraph;
use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("dpi")
        .about("Apply DPI to an existing .adj file")
        .after_help(
            r###"
Reads a network written by `aracne build` and marks indirect edges with the
data processing inequality.

Notes:
* The expression table supplies the probe names used in the .adj file
* Entries below `-t` are dropped while reading
* With `-l`, an edge touching a transcription factor is kept unless the
  mediating probe is a transcription factor too

Examples:
1. Reduce a full network:
   aracne dpi expr.tsv --adj expr.adj -e 0.1 -o expr_e0.1.adj

2. Protect transcription factors and keep the removed edges annotated:
   aracne dpi expr.tsv --adj expr.adj -e 0 -l tf.txt --write-reduced -o stdout

"###,
        )
        .arg(arg_infile())
        .arg(
            Arg::new("adj")
                .long("adj")
                .required(true)
                .num_args(1)
                .help("Input .adj file"),
        )
        .arg(arg_threshold())
        .arg(arg_eps())
        .arg(arg_hub())
        .arg(arg_subnet())
        .arg(arg_tf())
        .arg(arg_write_reduced())
        .arg(arg_write_empty())
        .arg(arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut params = params_from_args(args)?;
    params.adjfile = Some(args.get_one::<String>("adj").unwrap().to_string());
    params.validate()?;

    let mut data = ExprSet::from_path(&params.infile)
        .with_context(|| format!("Failed to read {}", params.infile))?;
    let ids = resolve_ids(&data, &params)?;
    let tfs = resolve_tfs(&data, &params)?;

    let adjfile = params.adjfile.as_deref().unwrap_or_default();
    let mut graph = GeneGraph::with_capacity(data.num_markers());
    let reader = aracne::reader(adjfile)?;
    read_adj(reader, &mut data, params.threshold, &mut graph)
        .with_context(|| format!("Failed to read {}", adjfile))?;

    let removed = dpi::reduce(&mut graph, params.eps, &ids, &tfs);
    log::info!("{} edges marked indirect", removed);

    let outfile = params.outfile();
    let mut writer = aracne::writer(&outfile)?;
    write_adj(&mut writer, &data, &graph, &ids, &params)?;
    writer.flush()?;

    Ok(())
}
