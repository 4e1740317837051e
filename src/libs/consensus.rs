//! Consensus of bootstrap networks.
//!
//! Each `.adj` replicate votes for the edges it contains. An edge is kept when
//! its support is significantly above what the per-run edge counts predict.

use crate::libs::error::NetError;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Family-wise error rate for the default Bonferroni threshold.
pub const FAMILY_ALPHA: f64 = 0.05;

/// Votes and summed MI of one directed edge over all runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Support {
    pub count: usize,
    pub mi_sum: f64,
}

/// An edge of the consensus network.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusEdge {
    pub source: String,
    pub target: String,
    pub support: usize,
    /// Mean MI over the runs containing the edge
    pub mi: f64,
    pub pvalue: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Consensus {
    // header lines of the first run
    params: Vec<String>,
    // edge entries seen in each run
    runs: Vec<usize>,
    edges: BTreeMap<(String, String), Support>,
}

impl Consensus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one bootstrap network in `.adj` format. Returns its number of
    /// edge entries.
    ///
    /// ```
    /// let mut cons = aracne::libs::consensus::Consensus::new();
    /// cons.add_run(">  header\nA\tB\t0.9\tC\t0.4\n".as_bytes()).unwrap();
    /// cons.add_run("A\tB\t0.7\n".as_bytes()).unwrap();
    /// assert_eq!(cons.num_runs(), 2);
    /// assert_eq!(cons.num_edges(), 2);
    /// assert_eq!(cons.support("A", "B").unwrap().count, 2);
    /// ```
    pub fn add_run<R: BufRead>(&mut self, reader: R) -> Result<usize, NetError> {
        let first = self.runs.is_empty();
        let mut entries = 0;

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line?;
            let line = line.trim_end_matches(&['\r', '\n'][..]);

            if line.starts_with('>') {
                if first {
                    self.params.push(line.to_string());
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() % 2 == 0 {
                return Err(NetError::format(
                    line_no,
                    "expected a gene followed by neighbor and MI pairs",
                ));
            }

            let source = fields[0];
            for pair in fields[1..].chunks(2) {
                let mi = parse_mi(pair[1], line_no)?;
                let support = self
                    .edges
                    .entry((source.to_string(), pair[0].to_string()))
                    .or_default();
                support.count += 1;
                support.mi_sum += mi;
                entries += 1;
            }
        }

        self.runs.push(entries);
        Ok(entries)
    }

    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    /// Number of distinct edges over all runs.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn support(&self, source: &str, target: &str) -> Option<&Support> {
        self.edges.get(&(source.to_string(), target.to_string()))
    }

    /// Bonferroni corrected alpha over all distinct edges.
    pub fn bonferroni_alpha(&self) -> f64 {
        FAMILY_ALPHA / self.num_edges().max(1) as f64
    }

    /// Mean and standard deviation of the support an edge gets by chance.
    ///
    /// Run `i` contains a given edge with probability `p_i = edges_i / total`,
    /// so the support is a sum of independent Bernoulli draws.
    pub fn null_distribution(&self) -> (f64, f64) {
        let total = self.num_edges();
        if total == 0 {
            return (0.0, 0.0);
        }

        let (mu, var) = self.runs.iter().fold((0.0, 0.0), |(mu, var), &e| {
            let p = e as f64 / total as f64;
            (mu + p, var + p * (1.0 - p))
        });
        (mu, var.sqrt())
    }

    /// Edges whose support has an upper-tail p-value below `threshold`,
    /// ordered by source then target.
    pub fn significant(&self, threshold: f64) -> Vec<ConsensusEdge> {
        let (mu, sigma) = self.null_distribution();

        self.edges
            .iter()
            .filter_map(|((source, target), s)| {
                let z = if sigma != 0.0 {
                    (s.count as f64 - mu) / sigma
                } else {
                    100.0
                };
                let pvalue = upper_tail_probability(z);

                (pvalue < threshold).then(|| ConsensusEdge {
                    source: source.clone(),
                    target: target.clone(),
                    support: s.count,
                    mi: s.mi_sum / s.count as f64,
                    pvalue,
                })
            })
            .collect()
    }
}

fn parse_mi(tok: &str, line_no: usize) -> Result<f64, NetError> {
    tok.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NetError::format(line_no, format!("could not read MI '{}'", tok)))
}

/// `P(Z > z)` of the standard normal distribution.
///
/// Uses the polynomial of Abramowitz and Stegun 26.2.19 below 1.9 and a
/// continued fraction up to 100; beyond that the probability is 0.
///
/// ```
/// use aracne::libs::consensus::upper_tail_probability;
/// assert_eq!(upper_tail_probability(0.0), 0.5);
/// assert!((upper_tail_probability(1.96) - 0.025).abs() < 1e-5);
/// ```
pub fn upper_tail_probability(z: f64) -> f64 {
    let a = z.abs();

    let p = if a < 1.9 {
        let poly = 1.0
            + a * (0.049867347
                + a * (0.0211410061
                    + a * (0.0032776263
                        + a * (0.0000380036 + a * (0.0000488906 + a * 0.000005383)))));
        poly.powi(-16) / 2.0
    } else if a <= 100.0 {
        let mut frac = 0.0;
        for i in (1..=18).rev() {
            frac = i as f64 / (a + frac);
        }
        (-0.5 * a * a).exp() / (2.0 * std::f64::consts::PI).sqrt() / (a + frac)
    } else {
        0.0
    };

    if z < 0.0 {
        1.0 - p
    } else {
        p
    }
}

/// Writes the `source target MI` table, MI with four decimals.
pub fn write_table<W: Write>(writer: &mut W, edges: &[ConsensusEdge]) -> Result<(), NetError> {
    writeln!(writer, "source\ttarget\tMI")?;
    for e in edges {
        writeln!(writer, "{}\t{}\t{:.4}", e.source, e.target, e.mi)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // A-B in every run, A-C in two of three
    fn three_runs() -> Consensus {
        let mut cons = Consensus::new();
        cons.add_run(">  Input file      expr.tsv\nA\tB\t0.9\tC\t0.5\nB\tA\t0.9\n".as_bytes())
            .unwrap();
        cons.add_run(">  Input file      other.tsv\nA\tB\t0.8\nB\tA\t0.8\n".as_bytes())
            .unwrap();
        cons.add_run("A\tB\t0.7\tC\t0.1\nB\tA\t0.7\n".as_bytes())
            .unwrap();
        cons
    }

    #[test]
    fn test_support_counts() {
        let cons = three_runs();
        assert_eq!(cons.num_runs(), 3);
        assert_eq!(cons.num_edges(), 3);
        assert_eq!(cons.params(), &[">  Input file      expr.tsv".to_string()]);

        let ab = cons.support("A", "B").unwrap();
        assert_eq!(ab.count, 3);
        assert_relative_eq!(ab.mi_sum, 2.4, epsilon = 1e-12);
        assert_eq!(cons.support("A", "C").unwrap().count, 2);
        assert!(cons.support("C", "A").is_none());
    }

    #[test]
    fn test_null_distribution() {
        let cons = three_runs();
        let (mu, sigma) = cons.null_distribution();

        // run probabilities 1, 2/3, 1
        assert_relative_eq!(mu, 8.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(sigma, (2.0f64 / 9.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(cons.bonferroni_alpha(), 0.05 / 3.0);

        assert_eq!(Consensus::new().null_distribution(), (0.0, 0.0));
    }

    #[test]
    fn test_significant() {
        let cons = three_runs();
        assert!(cons.significant(cons.bonferroni_alpha()).is_empty());

        let edges = cons.significant(0.3);
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].source.as_str(), edges[0].target.as_str()), ("A", "B"));
        assert_eq!((edges[1].source.as_str(), edges[1].target.as_str()), ("B", "A"));
        assert_relative_eq!(edges[0].mi, 0.8, epsilon = 1e-12);
        assert_relative_eq!(edges[0].pvalue, 0.2397501508845441, epsilon = 1e-9);

        let mut out = vec![];
        write_table(&mut out, &edges).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "source\ttarget\tMI\nA\tB\t0.8000\nB\tA\t0.8000\n"
        );
    }

    #[test]
    fn test_single_run_has_no_spread() {
        // every p is 1, sigma is 0, so each edge gets z = 100
        let mut cons = Consensus::new();
        cons.add_run("A\tB\t0.5\n".as_bytes()).unwrap();
        let edges = cons.significant(cons.bonferroni_alpha());
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].pvalue, 0.0);
    }

    #[test]
    fn test_upper_tail_probability() {
        assert_eq!(upper_tail_probability(0.0), 0.5);
        assert_relative_eq!(upper_tail_probability(1.0), 0.158655, epsilon = 1e-6);
        assert_relative_eq!(upper_tail_probability(-1.0), 0.841345, epsilon = 1e-6);
        assert_relative_eq!(upper_tail_probability(3.0), 0.001350, epsilon = 1e-6);
        assert_eq!(upper_tail_probability(150.0), 0.0);
        assert_eq!(upper_tail_probability(-150.0), 1.0);
    }

    #[test]
    fn test_malformed_runs() {
        let mut cons = Consensus::new();
        assert!(matches!(
            cons.add_run("A\tB\n".as_bytes()),
            Err(NetError::Format { line: 1, .. })
        ));
        assert!(matches!(
            cons.add_run("A\tB\t0.5\nA\tC\tnan\n".as_bytes()),
            Err(NetError::Format { line: 2, .. })
        ));
    }
}
