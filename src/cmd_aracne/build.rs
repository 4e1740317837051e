use super::utils::*;
use anyhow::Context;
use aracne::libs::adj::write_adj;
use aracne::libs::config::find_threshold;
use aracne::libs::dpi;
use aracne::libs::graph::GeneGraph;
use aracne::libs::network::{build_network, validate_noise, MiParams};
use clap::*;
use rand::SeedableRng;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("build")
        .about("Reconstruct a gene network from an expression table")
        .after_help(
            r###"
Estimates the mutual information (MI) of every probe pair by adaptive
partitioning of the ranked values, then removes indirect edges with the
data processing inequality (DPI).

Input:
* Tab-separated table, header `ID Description sample...`
* One value per sample, or a value and a detection confidence per sample

Output `.adj` format:
* `>` header lines
* probe <TAB> neighbor <TAB> MI <TAB> neighbor <TAB> MI ...

Notes:
* The threshold comes from `-p` and `<home>/config_threshold.txt` when `-t` is 0
* `-e 1` (the default) skips DPI; try `-e 0.1`
* `--hub` and `--subnet` restrict the rows; without them every pair is computed once
* `-r N` draws a bootstrap replicate; the seed is set by `--seed`

Examples:
1. Full network with a p-value threshold and DPI:
   aracne build expr.tsv -p 1e-7 -e 0.1 -H config/

2. Network of one hub, output to screen:
   aracne build expr.tsv --hub 1973_s_at -t 0.05 -o stdout

3. Conditional network on the upper 35% tail of a control probe:
   aracne build expr.tsv -c +24 0.35 -t 0.05

"###,
        )
        .arg(arg_infile())
        .arg(arg_threshold())
        .arg(
            Arg::new("pvalue")
                .short('p')
                .long("pvalue")
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(f64))
                .help("P-value used to derive the MI threshold"),
        )
        .arg(arg_eps())
        .arg(
            Arg::new("home")
                .short('H')
                .long("home")
                .num_args(1)
                .default_value(".")
                .help("Directory holding config_threshold.txt"),
        )
        .arg(arg_hub())
        .arg(arg_subnet())
        .arg(arg_tf())
        .arg(arg_condition())
        .arg(arg_filter())
        .arg(
            Arg::new("npar")
                .short('N')
                .long("npar")
                .num_args(1)
                .default_value("20")
                .value_parser(value_parser!(usize))
                .help("Maximum number of simultaneously active partitions"),
        )
        .arg(
            Arg::new("seed")
                .short('S')
                .long("seed")
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(u64))
                .help("Random seed for bootstrapping and tie-breaking noise"),
        )
        .arg(
            Arg::new("noise")
                .short('n')
                .long("noise")
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(f64))
                .help("Array measurement noise level, 0 for no correction"),
        )
        .arg(
            Arg::new("sample")
                .short('r')
                .long("sample")
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(usize))
                .help("Bootstrap replicate number, 0 for no bootstrapping"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Number of threads"),
        )
        .arg(arg_write_reduced())
        .arg(arg_write_empty())
        .arg(arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut params = params_from_args(args)?;
    params.pvalue = *args.get_one::<f64>("pvalue").unwrap();
    params.home = args.get_one::<String>("home").unwrap().to_string();
    params.max_partitions = *args.get_one::<usize>("npar").unwrap();
    params.seed = *args.get_one::<u64>("seed").unwrap();
    params.noise = *args.get_one::<f64>("noise").unwrap();
    params.sample = *args.get_one::<usize>("sample").unwrap();
    params.validate()?;

    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;

    //----------------------------
    // Setup
    //----------------------------
    let Dataset {
        mut data,
        control,
        mut samples,
    } = load_dataset(&params)?;

    if params.needs_threshold_lookup() {
        params.threshold = find_threshold(&params.home, params.pvalue, samples.len())
            .with_context(|| format!("Failed to read the threshold file in {}", params.home))?;
        log::info!(
            "MI threshold determined for p={}: {}",
            params.pvalue,
            params.threshold
        );
    }

    data.compute_bandwidth(&samples);
    validate_noise(&data, params.noise)?;

    let ids = resolve_ids(&data, &params)?;
    let tfs = resolve_tfs(&data, &params)?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(params.seed);
    if params.sample > 0 {
        samples = data.bootstrap(&samples, &mut rng);
        log::info!("Bootstrap replicate {}", params.sample);
    }
    data.add_noise(&mut rng);

    //----------------------------
    // Network
    //----------------------------
    let mi_params = MiParams {
        threshold: params.threshold,
        noise: params.noise,
        max_partitions: params.max_partitions,
    };
    let mut graph = GeneGraph::new();
    build_network(&data, &mut graph, &ids, &samples, control, &mi_params)?;

    if params.eps < 1.0 {
        log::info!("Applying DPI with tolerance {}", params.eps);
        let removed = dpi::reduce(&mut graph, params.eps, &ids, &tfs);
        log::info!("{} edges marked indirect", removed);
    }

    //----------------------------
    // Output
    //----------------------------
    let outfile = params.outfile();
    log::info!("Writing matrix: {}", outfile);
    let mut writer = aracne::writer(&outfile)?;
    write_adj(&mut writer, &data, &graph, &ids, &params)?;
    writer.flush()?;

    Ok(())
}
