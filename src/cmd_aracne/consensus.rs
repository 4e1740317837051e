use anyhow::Context;
use aracne::libs::config::check_pvalue;
use aracne::libs::consensus::{write_table, Consensus};
use clap::*;
use std::io::Write;
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("consensus")
        .about("Consensus network of bootstrap runs")
        .after_help(
            r###"
Counts in how many .adj files each edge appears and keeps the edges whose
support is significant against the number of edges each run reports.

Notes:
* A directory argument stands for its `.adj` and `.adj.gz` files, sorted by name
* The p-value threshold defaults to 0.05 divided by the number of distinct edges
* The MI column is the mean over the runs containing the edge
* `--info` records the statistics and the parameter lines of the first run

Examples:
1. Runs collected in one directory:
   aracne consensus boot/ -o consensus.txt

2. Listed files, with a fixed threshold:
   aracne consensus r001.adj r002.adj r003.adj -p 1e-3 --info boot.info

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Bootstrap .adj files, or directories holding them"),
        )
        .arg(
            Arg::new("pvalue")
                .short('p')
                .long("pvalue")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("P-value threshold, Bonferroni corrected 0.05 when absent"),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .num_args(1)
                .help("Write run statistics and parameters to this file"),
        )
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
    let pvalue = args.get_one::<f64>("pvalue").copied();
    if let Some(p) = pvalue {
        check_pvalue(p)?;
    }

    let mut files = vec![];
    for infile in args.get_many::<String>("infiles").unwrap() {
        files.extend(expand_input(infile)?);
    }
    if files.is_empty() {
        return Err(anyhow::anyhow!("No .adj files found"));
    }

    let mut cons = Consensus::new();
    for file in &files {
        let reader = aracne::reader(file)?;
        let entries = cons
            .add_run(reader)
            .with_context(|| format!("Failed to read {}", file))?;
        log::info!("{}: {} edges", file, entries);
    }

    let alpha = cons.bonferroni_alpha();
    let threshold = pvalue.unwrap_or(alpha);
    let (mu, sigma) = cons.null_distribution();
    log::info!(
        "{} runs, {} edges tested, mu: {}, sigma: {}",
        cons.num_runs(),
        cons.num_edges(),
        mu,
        sigma
    );

    let edges = cons.significant(threshold);
    log::info!("{} edges kept at p < {}", edges.len(), threshold);

    let mut writer = aracne::writer(args.get_one::<String>("outfile").unwrap())?;
    write_table(&mut writer, &edges)?;
    writer.flush()?;

    if let Some(info) = args.get_one::<String>("info") {
        let mut writer = aracne::writer(info)?;
        writeln!(writer, "Total edge tested: {}", cons.num_edges())?;
        writeln!(writer, "Bonferroni corrected (0.05) alpha: {}", alpha)?;
        writeln!(writer, "P-value threshold: {}", threshold)?;
        writeln!(writer, "mu: {}", mu)?;
        writeln!(writer, "sigma: {}", sigma)?;
        writeln!(writer, "Edges kept: {}", edges.len())?;
        for line in cons.params() {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer, ">  Bootstrap No: {}", cons.num_runs())?;
        writeln!(writer, ">  Source: {}", files.join(" "))?;
        writer.flush()?;
    }

    Ok(())
}

// a directory expands to its .adj files
fn expand_input(infile: &str) -> anyhow::Result<Vec<String>> {
    let path = Path::new(infile);
    if !path.is_dir() {
        return Ok(vec![infile.to_string()]);
    }

    let mut files = vec![];
    for entry in std::fs::read_dir(path).with_context(|| format!("Failed to list {}", infile))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_file() && (name.ends_with(".adj") || name.ends_with(".adj.gz")) {
            files.push(entry.path().to_string_lossy().to_string());
        }
    }
    files.sort();

    Ok(files)
}
