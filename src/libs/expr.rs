use crate::libs::error::NetError;
use crate::libs::mi::{rank_pairs, RankedObservation};
use crate::libs::stat;
use indexmap::IndexMap;
use rand::Rng;
use std::io::BufRead;

/// Placeholder label that never identifies a gene.
pub const NO_LABEL: &str = "---";

/// A measured gene (probe set), identified by its line position.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: usize,
    pub accession: String,
    pub label: String,
    pub variance: f64,
    pub bandwidth: f64,
    pub active: bool,
    pub control: bool,
}

impl Marker {
    pub fn new(id: usize, accession: &str, label: &str) -> Self {
        Self {
            id,
            accession: accession.to_string(),
            label: label.to_string(),
            variance: 0.0,
            bandwidth: 0.0,
            active: true,
            control: false,
        }
    }
}

/// One expression measurement and its detection confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Probe {
    pub value: f64,
    pub confidence: f64,
}

/// An expression table: markers by samples.
#[derive(Debug, Clone, Default)]
pub struct ExprSet {
    header: Vec<String>,
    markers: Vec<Marker>,
    // values[marker][sample]
    values: Vec<Vec<Probe>>,
    index: IndexMap<String, usize>,
    has_confidence: bool,
}

impl ExprSet {
    /// Reads a tab-separated table from a file, `.gz` file or `stdin`.
    pub fn from_path(input: &str) -> Result<Self, NetError> {
        let reader = crate::reader(input)?;
        Self::from_reader(reader)
    }

    /// Reads a table whose first line is `ID, Description, sample...`.
    ///
    /// Data lines hold one value per sample, or a value and a detection
    /// confidence per sample; the first data line decides which.
    ///
    /// ```
    /// let text = "ID\tDesc\ts1\ts2\ts3\nA\tgeneA\t1\t2\t3\nB\tgeneB\t3\t2\t1\n";
    /// let data = aracne::libs::expr::ExprSet::from_reader(text.as_bytes()).unwrap();
    /// assert_eq!(data.num_markers(), 2);
    /// assert_eq!(data.num_samples(), 3);
    /// assert_eq!(data.value(1, 0), 3.0);
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, NetError> {
        let mut set = ExprSet::default();
        let mut num_samples = 0;
        let mut layout: Option<bool> = None;
        let mut bypassed = 0;

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line?;
            let line = line.trim_end_matches(&['\r', '\n'][..]);

            if line_no == 1 {
                set.header = line.split('\t').map(|s| s.to_string()).collect();
                if set.header.len() < 3 {
                    return Err(NetError::format(
                        line_no,
                        "the header needs an ID, a description and at least one sample column",
                    ));
                }
                num_samples = set.header.len() - 2;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            if set.markers.is_empty() && line.starts_with("Description") {
                bypassed += 1;
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            let num_values = fields.len().saturating_sub(2);

            let with_confidence = match layout {
                Some(l) => l,
                None => {
                    let l = if num_values == num_samples {
                        false
                    } else if num_values == 2 * num_samples {
                        true
                    } else {
                        return Err(NetError::format(
                            line_no,
                            "header line doesn't match the rest of the data",
                        ));
                    };
                    layout = Some(l);
                    l
                }
            };

            let expected = if with_confidence {
                2 * num_samples
            } else {
                num_samples
            };
            if num_values != expected {
                return Err(NetError::format(
                    line_no,
                    format!("expected {} values, found {}", expected, num_values),
                ));
            }

            let mut probes = Vec::with_capacity(num_samples);
            if with_confidence {
                for pair in fields[2..].chunks(2) {
                    probes.push(Probe {
                        value: parse_value(pair[0], line_no)?,
                        confidence: parse_confidence(pair[1], line_no)?,
                    });
                }
            } else {
                for tok in &fields[2..] {
                    probes.push(Probe {
                        value: parse_value(tok, line_no)?,
                        confidence: 0.0,
                    });
                }
            }

            let id = set.markers.len();
            set.index.entry(fields[0].to_string()).or_insert(id);
            set.markers.push(Marker::new(id, fields[0], fields[1]));
            set.values.push(probes);
        }

        if set.header.is_empty() {
            return Err(NetError::format(1, "empty expression table"));
        }
        set.has_confidence = layout.unwrap_or(false);

        if bypassed > 0 {
            log::info!("{} Description lines bypassed", bypassed);
        }
        if set.has_confidence {
            log::info!("(value, p-value) pairs found");
        } else {
            log::info!("P-value columns not found");
        }

        Ok(set)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn has_confidence(&self) -> bool {
        self.has_confidence
    }

    pub fn num_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn num_samples(&self) -> usize {
        self.header.len().saturating_sub(2)
    }

    pub fn num_active(&self) -> usize {
        self.markers.iter().filter(|m| m.active).count()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: usize) -> &Marker {
        &self.markers[id]
    }

    pub fn set_active(&mut self, id: usize, active: bool) {
        self.markers[id].active = active;
    }

    pub fn set_control(&mut self, id: usize, control: bool) {
        self.markers[id].control = control;
    }

    pub fn probe(&self, marker: usize, sample: usize) -> &Probe {
        &self.values[marker][sample]
    }

    pub fn value(&self, marker: usize, sample: usize) -> f64 {
        self.values[marker][sample].value
    }

    /// Values of a marker over a sample subset, in subset order.
    pub fn values(&self, marker: usize, samples: &[usize]) -> Vec<f64> {
        samples.iter().map(|&s| self.values[marker][s].value).collect()
    }

    /// Every sample index, in file order.
    pub fn all_samples(&self) -> Vec<usize> {
        (0..self.num_samples()).collect()
    }

    /// Same marker, or two probes with the same non-placeholder label.
    pub fn is_same_gene(&self, i: usize, j: usize) -> bool {
        i == j || (self.markers[i].label == self.markers[j].label && self.markers[i].label != NO_LABEL)
    }

    /// Id of the first marker with this accession.
    pub fn accession_id(&self, accession: &str) -> Option<usize> {
        self.index.get(accession).copied()
    }

    /// Resolves an accession, or a bare marker index when no accession matches.
    pub fn probe_id(&self, name: &str) -> Option<usize> {
        self.accession_id(name).or_else(|| {
            if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                name.parse::<usize>()
                    .ok()
                    .filter(|&id| id < self.num_markers())
            } else {
                None
            }
        })
    }

    /// Keeps markers whose mean is at least `min_mean` and whose standard
    /// deviation is at least `min_cv` times the mean. The control marker is
    /// always disabled. Returns the number of disabled markers.
    pub fn filter(&mut self, min_mean: f64, min_cv: f64, control: Option<usize>) -> usize {
        let mut disabled = 0;

        for i in 0..self.markers.len() {
            let values: Vec<f64> = self.values[i].iter().map(|p| p.value).collect();
            let mean = stat::mean(&values);
            let stdev = stat::population_stdev(&values);

            let keep = Some(i) != control && mean >= min_mean && stdev >= mean * min_cv;
            self.markers[i].active = keep;
            if !keep {
                disabled += 1;
            }
        }

        disabled
    }

    /// Sample variance of a marker over a subset.
    pub fn variance(&self, marker: usize, samples: &[usize]) -> f64 {
        stat::sample_variance(&self.values(marker, samples))
    }

    pub fn compute_variance(&mut self, samples: &[usize]) {
        for i in 0..self.markers.len() {
            self.markers[i].variance = self.variance(i, samples);
        }
    }

    /// Sets variance and smoothing bandwidth of every marker.
    pub fn compute_bandwidth(&mut self, samples: &[usize]) {
        self.compute_variance(samples);

        for i in 0..self.markers.len() {
            let mut data = self.values(i, samples);
            data.sort_by(|a, b| a.total_cmp(b));

            let iqr = stat::interquartile_range(&data);
            let stdev = self.markers[i].variance.sqrt();
            self.markers[i].bandwidth = stat::bandwidth(stdev, iqr, data.len());
        }
    }

    /// Samples in the lower and upper `percent` tails of a marker's values,
    /// each listed from low to high.
    pub fn high_low_percent(&self, percent: f64, marker: usize) -> (Vec<usize>, Vec<usize>) {
        let n = self.num_samples();
        let mut order = self.all_samples();
        order.sort_by(|&a, &b| {
            self.value(marker, a)
                .total_cmp(&self.value(marker, b))
                .then(a.cmp(&b))
        });

        let k = ((n as f64 * percent) as usize).min(n);
        let lower = order[..k].to_vec();
        let upper = order[n - k..].to_vec();

        (lower, upper)
    }

    /// Draws `samples.len()` samples with replacement.
    pub fn bootstrap<R: Rng>(&self, samples: &[usize], rng: &mut R) -> Vec<usize> {
        if samples.is_empty() {
            return vec![];
        }
        (0..samples.len())
            .map(|_| samples[rng.gen_range(0..samples.len())])
            .collect()
    }

    /// Adds uniform noise below 1e-10 to every value, so that ties are broken
    /// at random.
    pub fn add_noise<R: Rng>(&mut self, rng: &mut R) {
        for s in 0..self.num_samples() {
            for row in self.values.iter_mut() {
                row[s].value += rng.gen::<f64>() * 1e-10;
            }
        }
    }

    /// Ranked observations of two markers over a sample subset.
    pub fn ranked_pair(&self, a: usize, b: usize, samples: &[usize]) -> Vec<RankedObservation> {
        rank_pairs(&self.values(a, samples), &self.values(b, samples))
    }
}

fn parse_value(tok: &str, line_no: usize) -> Result<f64, NetError> {
    let value = tok
        .trim()
        .parse::<f64>()
        .map_err(|_| NetError::format(line_no, format!("could not read value '{}'", tok)))?;
    if !value.is_finite() {
        return Err(NetError::format(
            line_no,
            format!("non-finite value '{}'", tok),
        ));
    }
    Ok(value)
}

fn parse_confidence(tok: &str, line_no: usize) -> Result<f64, NetError> {
    match tok.trim().chars().next() {
        Some('A') => Ok(0.7),
        Some('M') => Ok(0.5),
        Some('P') => Ok(0.1),
        _ => parse_value(tok, line_no),
    }
}
