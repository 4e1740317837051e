use crate::libs::error::NetError;
use crate::libs::expr::ExprSet;
use crate::libs::graph::GeneGraph;
use crate::libs::mi::{adaptive_partition_mi, correct_noise, DEFAULT_MAX_PARTITIONS};
use rayon::prelude::*;
use std::time::Instant;

/// Knobs of a single pairwise MI estimation.
#[derive(Debug, Clone, Copy)]
pub struct MiParams {
    /// Estimates below this are reported as 0
    pub threshold: f64,
    /// Noise variance subtracted from both markers, 0 disables the correction
    pub noise: f64,
    pub max_partitions: usize,
}

impl Default for MiParams {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            noise: 0.0,
            max_partitions: DEFAULT_MAX_PARTITIONS,
        }
    }
}

/// Summary of an estimation run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Report {
    pub rows: usize,
    pub pairs: usize,
    pub edges: usize,
    /// Largest number of simultaneously active partitions
    pub peak: usize,
}

/// MI of two markers over `samples`, with the partition peak of the call.
///
/// Probes of the same gene, and estimates below the threshold, give 0.
pub fn pair_mi(
    data: &ExprSet,
    a: usize,
    b: usize,
    samples: &[usize],
    params: &MiParams,
) -> Result<(f64, usize), NetError> {
    if data.is_same_gene(a, b) {
        return Ok((0.0, 0));
    }

    let obs = data.ranked_pair(a, b, samples);
    let result = adaptive_partition_mi(&obs, params.max_partitions)?;

    if result.mi < params.threshold {
        return Ok((0.0, result.peak));
    }
    if params.noise <= 0.0 {
        return Ok((result.mi, result.peak));
    }

    let mi = correct_noise(
        result.mi,
        data.marker(a).variance,
        data.marker(b).variance,
        params.noise,
    )?;
    Ok((mi, result.peak))
}

/// Fails when the noise variance is not below the variance of every active
/// marker. Variances must already be computed.
pub fn validate_noise(data: &ExprSet, noise: f64) -> Result<(), NetError> {
    if noise <= 0.0 {
        return Ok(());
    }

    for m in data.markers().iter().filter(|m| m.active) {
        if m.variance <= noise {
            log::error!(
                "Marker {} has variance {} not above the noise level",
                m.accession,
                m.variance
            );
            return Err(NetError::NoiseDomain {
                variance: m.variance,
                noise,
            });
        }
    }

    Ok(())
}

/// Estimates MI for the rows of `ids`, or for every active marker pair when
/// `ids` is empty, and stores the non-zero results in `graph`.
///
/// Every pair is computed once in the full network and stored in both
/// directions. Listed rows are computed against all columns and stored one
/// way. The control marker is never a row or a column, and columns must be
/// active.
///
/// Rows run on the current `rayon` pool; edges are inserted afterwards in row
/// order, so the graph is the same for any thread count.
pub fn build_network(
    data: &ExprSet,
    graph: &mut GeneGraph,
    ids: &[usize],
    samples: &[usize],
    control: Option<usize>,
    params: &MiParams,
) -> Result<Report, NetError> {
    let start = Instant::now();
    let n = data.num_markers();
    let full = ids.is_empty();

    let rows: Vec<usize> = if full {
        (0..n)
            .filter(|&i| Some(i) != control && data.marker(i).active)
            .collect()
    } else {
        ids.iter().copied().filter(|&i| Some(i) != control).collect()
    };

    if full {
        graph.ensure_capacity(n.saturating_sub(1));
    } else {
        for &i in &rows {
            graph.ensure_capacity(i);
        }
    }

    log::info!(
        "Computing {} rows over {} samples",
        rows.len(),
        samples.len()
    );

    let results: Vec<(usize, Vec<(usize, f64)>, usize, usize)> = rows
        .par_iter()
        .map(|&i| {
            let first = if full { i + 1 } else { 0 };
            let mut edges = vec![];
            let mut peak = 0;
            let mut pairs = 0;

            for j in (first..n).filter(|&j| Some(j) != control && data.marker(j).active) {
                let (mi, p) = pair_mi(data, i, j, samples, params)?;
                pairs += 1;
                peak = peak.max(p);
                if mi != 0.0 {
                    edges.push((j, mi));
                }
            }

            Ok((i, edges, pairs, peak))
        })
        .collect::<Result<_, NetError>>()?;

    let mut report = Report {
        rows: rows.len(),
        ..Report::default()
    };
    for (i, edges, pairs, peak) in results {
        report.pairs += pairs;
        report.peak = report.peak.max(peak);
        report.edges += edges.len();
        for (j, mi) in edges {
            graph.insert(i, j, mi, full);
        }
    }

    log::info!(
        "Genes: {} Pairs: {} Edges: {} Time: {:.2?}",
        report.rows,
        report.pairs,
        report.edges,
        start.elapsed()
    );
    log::info!("Peak of active partitions: {}", report.peak);

    Ok(report)
}
