use anyhow::Context;
use aracne::libs::config::{read_probe_list, Condition, Params};
use aracne::libs::dpi::TfSet;
use aracne::libs::expr::ExprSet;
use aracne::NetError;
use clap::*;

pub fn arg_infile() -> Arg {
    Arg::new("infile")
        .required(true)
        .index(1)
        .help("Expression table. [stdin] for standard input")
}

pub fn arg_outfile() -> Arg {
    Arg::new("outfile")
        .short('o')
        .long("outfile")
        .num_args(1)
        .help("Output filename. [stdout] for screen. Named after the input and the options when absent")
}

pub fn arg_threshold() -> Arg {
    Arg::new("threshold")
        .short('t')
        .long("threshold")
        .num_args(1)
        .default_value("0")
        .value_parser(value_parser!(f64))
        .help("MI threshold")
}

pub fn arg_eps() -> Arg {
    Arg::new("eps")
        .short('e')
        .long("eps")
        .num_args(1)
        .default_value("1")
        .value_parser(value_parser!(f64))
        .help("DPI tolerance, 1 skips DPI")
}

pub fn arg_hub() -> Arg {
    Arg::new("hub")
        .long("hub")
        .num_args(1)
        .help("Compute the network of one hub probe")
}

pub fn arg_subnet() -> Arg {
    Arg::new("subnet")
        .short('s')
        .long("subnet")
        .num_args(1)
        .help("File listing the probes whose subnetwork is computed")
}

pub fn arg_tf() -> Arg {
    Arg::new("tf")
        .short('l')
        .long("tf")
        .num_args(1)
        .help("File listing transcription factor probes, protected in DPI")
}

pub fn arg_condition() -> Arg {
    Arg::new("condition")
        .short('c')
        .long("condition")
        .num_args(2)
        .value_names(["+-PROBE", "PERCENT"])
        .allow_hyphen_values(true)
        .help("Use the upper (+) or lower (-) tail of a control probe")
}

pub fn arg_filter() -> Arg {
    Arg::new("filter")
        .short('f')
        .long("filter")
        .num_args(2)
        .value_names(["MEAN", "CV"])
        .value_parser(value_parser!(f64))
        .help("Disable probes below a mean or a coefficient of variation")
}

pub fn arg_write_reduced() -> Arg {
    Arg::new("write_reduced")
        .long("write-reduced")
        .action(ArgAction::SetTrue)
        .help("Also write edges removed by DPI, as `probe.intermediate`")
}

pub fn arg_write_empty() -> Arg {
    Arg::new("write_empty")
        .long("write-empty")
        .action(ArgAction::SetTrue)
        .help("Also write active probes without edges")
}

/// Collects the options present in `args` into `Params`.
pub fn params_from_args(args: &ArgMatches) -> anyhow::Result<Params> {
    let mut params = Params {
        infile: args.get_one::<String>("infile").unwrap().to_string(),
        ..Params::default()
    };

    if let Ok(Some(outfile)) = args.try_get_one::<String>("outfile") {
        params.outfile = Some(outfile.to_string());
    }
    if let Ok(Some(v)) = args.try_get_one::<f64>("threshold") {
        params.threshold = *v;
    }
    if let Ok(Some(v)) = args.try_get_one::<f64>("eps") {
        params.eps = *v;
    }
    if let Ok(Some(v)) = args.try_get_one::<String>("hub") {
        params.hub = Some(v.to_string());
    }
    if let Ok(Some(v)) = args.try_get_one::<String>("subnet") {
        params.subnet_file = Some(v.to_string());
    }
    if let Ok(Some(v)) = args.try_get_one::<String>("tf") {
        params.tf_file = Some(v.to_string());
    }
    if let Ok(Some(v)) = args.try_get_one::<bool>("write_reduced") {
        params.write_reduced = *v;
    }
    if let Ok(Some(v)) = args.try_get_one::<bool>("write_empty") {
        params.write_empty = *v;
    }

    if let Ok(Some(mut vals)) = args.try_get_many::<f64>("filter") {
        params.filter_mean = *vals.next().unwrap();
        params.filter_cv = *vals.next().unwrap();
    }

    if let Ok(Some(vals)) = args.try_get_many::<String>("condition") {
        let vals: Vec<&String> = vals.collect();
        let percent = vals[1]
            .parse::<f64>()
            .with_context(|| format!("Invalid percentage: {}", vals[1]))?;
        params.condition = Some(Condition::parse(vals[0], percent)?);
    }

    Ok(params)
}

/// A loaded table with the control probe and the sample subset resolved.
pub struct Dataset {
    pub data: ExprSet,
    pub control: Option<usize>,
    pub samples: Vec<usize>,
}

/// Reads the table, applies the filter and the condition.
pub fn load_dataset(params: &Params) -> anyhow::Result<Dataset> {
    let mut data = ExprSet::from_path(&params.infile)
        .with_context(|| format!("Failed to read {}", params.infile))?;

    let control = match &params.condition {
        Some(cond) => {
            let id = data
                .probe_id(&cond.probe)
                .ok_or_else(|| NetError::UnknownMarker(cond.probe.clone()))?;
            data.set_control(id, true);
            Some(id)
        }
        None => None,
    };

    if params.filter_mean > 0.0 || params.filter_cv > 0.0 {
        let disabled = data.filter(params.filter_mean, params.filter_cv, control);
        log::info!("{} markers disabled due to lack of dynamic range", disabled);
    }

    let samples = match (&params.condition, control) {
        (Some(cond), Some(id)) => {
            let (lower, upper) = data.high_low_percent(cond.percent, id);
            if cond.upper {
                upper
            } else {
                lower
            }
        }
        _ => data.all_samples(),
    };
    if samples.len() < 2 {
        return Err(NetError::config(format!(
            "Only {} samples selected, at least 2 are needed!",
            samples.len()
        ))
        .into());
    }

    log::info!(
        "Marker No: {} ({} active), Array No: {}",
        data.num_markers(),
        data.num_active(),
        samples.len()
    );

    Ok(Dataset {
        data,
        control,
        samples,
    })
}

/// Row ids requested by `--hub` or `--subnet`; empty means every gene.
pub fn resolve_ids(data: &ExprSet, params: &Params) -> anyhow::Result<Vec<usize>> {
    let mut ids = vec![];

    if let Some(hub) = &params.hub {
        let id = data
            .probe_id(hub)
            .ok_or_else(|| NetError::UnknownMarker(hub.clone()))
            .with_context(|| "Nothing to be computed without the hub probe")?;
        ids.push(id);
    }

    if let Some(file) = &params.subnet_file {
        for probe in read_probe_list(file)? {
            match data.probe_id(&probe) {
                Some(id) => ids.push(id),
                None => log::warn!("Cannot find probe: {} in {} ... ignored", probe, file),
            }
        }
    }

    Ok(ids)
}

pub fn resolve_tfs(data: &ExprSet, params: &Params) -> anyhow::Result<TfSet> {
    let mut tfs = TfSet::new();

    if let Some(file) = &params.tf_file {
        for probe in read_probe_list(file)? {
            match data.probe_id(&probe) {
                Some(id) => {
                    tfs.insert(id);
                }
                None => log::warn!("Cannot find probe: {} in {} ... ignored", probe, file),
            }
        }
        log::info!("{} transcription factors loaded", tfs.len());
    }

    Ok(tfs)
}
