use crate::libs::error::NetError;
use crate::libs::mi::DEFAULT_MAX_PARTITIONS;
use indexmap::IndexSet;
use std::io::BufRead;
use std::path::Path;

/// Name of the p-value to threshold lookup file in the home directory.
pub const THRESHOLD_FILE: &str = "config_threshold.txt";

/// Restricts the computation to the samples in one tail of a control marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// `true` for the upper tail (`+`), `false` for the lower one (`-`)
    pub upper: bool,
    pub probe: String,
    /// Fraction of samples in the tail, in (0, 1)
    pub percent: f64,
}

impl Condition {
    /// Parses `+probe` / `-probe` and a percentage.
    pub fn parse(arg: &str, percent: f64) -> Result<Self, NetError> {
        let mut chars = arg.chars();
        let upper = match chars.next() {
            Some('+') => true,
            Some('-') => false,
            _ => return Err(NetError::config("Condition must be '+' or '-'!")),
        };
        let probe = chars.as_str().to_string();
        if probe.is_empty() {
            return Err(NetError::config(
                "Control gene ID must be specified using '-c'!",
            ));
        }

        Ok(Self {
            upper,
            probe,
            percent,
        })
    }
}

/// Parameters of a reconstruction run.
#[derive(Debug, Clone)]
pub struct Params {
    pub infile: String,
    pub outfile: Option<String>,
    pub adjfile: Option<String>,
    /// MI threshold; 0 lets the p-value decide
    pub threshold: f64,
    pub pvalue: f64,
    /// DPI tolerance
    pub eps: f64,
    pub home: String,
    pub hub: Option<String>,
    pub subnet_file: Option<String>,
    pub tf_file: Option<String>,
    pub condition: Option<Condition>,
    pub filter_mean: f64,
    pub filter_cv: f64,
    /// Array measurement noise level
    pub noise: f64,
    pub max_partitions: usize,
    pub seed: u64,
    /// Bootstrap replicate number, 0 for none
    pub sample: usize,
    pub write_reduced: bool,
    pub write_empty: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            infile: String::new(),
            outfile: None,
            adjfile: None,
            threshold: 0.0,
            pvalue: 1.0,
            eps: 1.0,
            home: ".".to_string(),
            hub: None,
            subnet_file: None,
            tf_file: None,
            condition: None,
            filter_mean: 0.0,
            filter_cv: 0.0,
            noise: 0.0,
            max_partitions: DEFAULT_MAX_PARTITIONS,
            seed: 1,
            sample: 0,
            write_reduced: false,
            write_empty: false,
        }
    }
}

impl Params {
    /// Checks ranges and option conflicts before anything is read.
    pub fn validate(&self) -> Result<(), NetError> {
        if self.infile.is_empty() {
            return Err(NetError::config("No input file specified!"));
        }
        if self.hub.is_some() && self.subnet_file.is_some() {
            return Err(NetError::config(
                "Either supply one hub gene by '--hub' or multiple genes in a file by '-s', but not both!",
            ));
        }
        if self.threshold < 0.0 {
            return Err(NetError::config("MI threshold '-t' must be nonnegative!"));
        }
        check_pvalue(self.pvalue)?;
        if !(0.0..=1.0).contains(&self.eps) {
            return Err(NetError::config("DPI tolerance '-e' must be within [0,1]!"));
        }
        if let Some(cond) = &self.condition {
            if cond.percent <= 0.0 || cond.percent >= 1.0 {
                return Err(NetError::config(
                    "Percentage microarray must be within (0,1)!",
                ));
            }
        }
        if self.filter_mean < 0.0 {
            return Err(NetError::config("Gene filter mean must be nonnegative!"));
        }
        if self.filter_cv < 0.0 {
            return Err(NetError::config(
                "Gene filter cv (coefficient of variance) must be nonnegative!",
            ));
        }
        if self.noise < 0.0 {
            return Err(NetError::config(
                "Array measurement noise level '-n' must be nonnegative!",
            ));
        }
        if self.max_partitions < 1 {
            return Err(NetError::config(
                "Maximum allowed value of npar must be positive!",
            ));
        }

        if self.threshold > 0.0 && self.pvalue != 1.0 {
            log::warn!("P-value will not be used, since a threshold has been specified.");
        }

        Ok(())
    }

    /// Whether the threshold has to come from the p-value table.
    pub fn needs_threshold_lookup(&self) -> bool {
        self.threshold == 0.0 && self.pvalue != 1.0
    }

    /// Output path derived from the input path and the parameters.
    ///
    /// ```
    /// let mut p = aracne::libs::config::Params::default();
    /// p.infile = "data/expr.exp".to_string();
    /// p.threshold = 0.05;
    /// p.eps = 0.1;
    /// assert_eq!(p.default_outfile(), "data/expr_t0.05_e0.1.adj");
    /// ```
    pub fn default_outfile(&self) -> String {
        let path = Path::new(&self.infile);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut name = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => format!("{}/{}", dir.display(), stem),
            None => stem,
        };

        if let Some(hub) = &self.hub {
            name += &format!("_h{}", hub);
        }
        if let Some(cond) = &self.condition {
            name += &format!("_c{}{}", cond.probe, if cond.upper { "H" } else { "L" });
        }
        if self.threshold > 0.0 {
            name += &format!("_t{}", crate::format_g(self.threshold, 2));
        }
        if self.eps < 1.0 {
            name += &format!("_e{}", crate::format_g(self.eps, 2));
        }
        if self.sample > 0 {
            name += &format!("_r{:03}", self.sample);
        }

        name + ".adj"
    }

    pub fn outfile(&self) -> String {
        self.outfile
            .clone()
            .unwrap_or_else(|| self.default_outfile())
    }
}

pub fn check_pvalue(pvalue: f64) -> Result<(), NetError> {
    if pvalue <= 0.0 || pvalue > 1.0 {
        return Err(NetError::config("P-value '-p' must be in the range (0,1]!"));
    }
    Ok(())
}

/// MI threshold for a p-value over `n` samples, from the coefficients in
/// `<home>/config_threshold.txt`.
pub fn find_threshold(home: &str, pvalue: f64, n: usize) -> Result<f64, NetError> {
    let path = Path::new(home).join(THRESHOLD_FILE);
    let reader = crate::reader(&path.to_string_lossy())?;
    threshold_from_reader(reader, pvalue, n)
}

/// Parses `alpha beta gamma` from the first line not starting with `>`,
/// and returns `(alpha - ln p) / (-beta - gamma * n)`.
pub fn threshold_from_reader<R: BufRead>(reader: R, pvalue: f64, n: usize) -> Result<f64, NetError> {
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('>') {
            continue;
        }

        let coef: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .map(|t| t.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| NetError::format(i + 1, "threshold coefficients must be numbers"))?;
        if coef.len() < 3 {
            return Err(NetError::format(
                i + 1,
                "expected alpha, beta and gamma in the threshold file",
            ));
        }

        let (alpha, beta, gamma) = (coef[0], coef[1], coef[2]);
        return Ok((alpha - pvalue.ln()) / (-beta - gamma * n as f64));
    }

    Err(NetError::format(0, "no coefficients in the threshold file"))
}

/// Reads one accession per line, keeping the first tab field.
/// Blank lines and repeats are dropped.
pub fn read_probe_list(infile: &str) -> Result<IndexSet<String>, NetError> {
    let reader = crate::reader(infile)?;

    let mut probes = IndexSet::new();
    for line in reader.lines() {
        let line = line?;
        let id = line.split('\t').next().unwrap_or("").trim();
        if !id.is_empty() {
            probes.insert(id.to_string());
        }
    }

    Ok(probes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> Params {
        Params {
            infile: "expr.exp".to_string(),
            ..Params::default()
        }
    }

    #[test]
    fn test_defaults_validate() {
        let p = params();
        assert!(p.validate().is_ok());
        assert_eq!(p.max_partitions, 20);
        assert!(!p.needs_threshold_lookup());
        assert_eq!(p.outfile(), "expr.adj");
    }

    #[test]
    fn test_ranges() {
        let cases: Vec<Box<dyn Fn(&mut Params)>> = vec![
            Box::new(|p| p.infile.clear()),
            Box::new(|p| p.threshold = -0.1),
            Box::new(|p| p.pvalue = 0.0),
            Box::new(|p| p.pvalue = 1.5),
            Box::new(|p| p.eps = 1.1),
            Box::new(|p| p.eps = -0.1),
            Box::new(|p| p.filter_mean = -1.0),
            Box::new(|p| p.filter_cv = -1.0),
            Box::new(|p| p.noise = -0.5),
            Box::new(|p| p.max_partitions = 0),
            Box::new(|p| {
                p.hub = Some("A".to_string());
                p.subnet_file = Some("list.txt".to_string());
            }),
            Box::new(|p| p.condition = Some(Condition::parse("+A", 1.0).unwrap())),
        ];

        for (i, modify) in cases.iter().enumerate() {
            let mut p = params();
            modify(&mut p);
            assert!(
                matches!(p.validate(), Err(NetError::Config(_))),
                "case {} should be rejected",
                i
            );
        }
    }

    #[test]
    fn test_condition() {
        let c = Condition::parse("-1973_s_at", 0.4).unwrap();
        assert!(!c.upper);
        assert_eq!(c.probe, "1973_s_at");

        assert!(Condition::parse("+24", 0.35).unwrap().upper);
        assert!(Condition::parse("24", 0.35).is_err());
        assert!(Condition::parse("+", 0.35).is_err());
    }

    #[test]
    fn test_outfile_name() {
        let mut p = params();
        p.infile = "/tmp/run/expr.tsv".to_string();
        p.hub = Some("1000_at".to_string());
        p.condition = Some(Condition::parse("+24", 0.35).unwrap());
        p.eps = 0.15;
        p.sample = 7;
        assert_eq!(p.outfile(), "/tmp/run/expr_h1000_at_c24H_e0.15_r007.adj");

        p.outfile = Some("stdout".to_string());
        assert_eq!(p.outfile(), "stdout");
    }

    #[test]
    fn test_threshold_from_reader() {
        let text = "> alpha beta gamma\n> fitted\n1.062 -48.7 -0.634\n";
        let t = threshold_from_reader(text.as_bytes(), 1e-7, 100).unwrap();
        let expected = (1.062 - 1e-7f64.ln()) / (48.7 + 0.634 * 100.0);
        assert_relative_eq!(t, expected, epsilon = 1e-12);

        assert!(threshold_from_reader("> only comments\n".as_bytes(), 0.01, 10).is_err());
        assert!(threshold_from_reader("1 2\n".as_bytes(), 0.01, 10).is_err());
        assert!(threshold_from_reader("a b c\n".as_bytes(), 0.01, 10).is_err());
    }
}
