use super::rank::RankedObservation;
use crate::libs::error::NetError;

/// Default bound on simultaneously active partitions.
pub const DEFAULT_MAX_PARTITIONS: usize = 20;

/// Chi-square critical value, 3 degrees of freedom, p = 0.05.
const CHI_SQUARE_CRITICAL: f64 = 7.8;

/// Result of one estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionMi {
    pub mi: f64,
    /// Largest number of partitions that were active at the same time
    pub peak: usize,
}

/// A rectangle of the joint rank space and the observations inside it.
#[derive(Debug, Clone)]
struct Partition {
    x_lo: usize,
    x_hi: usize,
    y_lo: usize,
    y_hi: usize,
    members: Vec<usize>,
}

impl Partition {
    fn midpoints(&self) -> (usize, usize) {
        ((self.x_lo + self.x_hi) / 2, (self.y_lo + self.y_hi) / 2)
    }

    /// Rank rectangles of the four quadrants, indexed like `quadrant_of`.
    fn quadrant_bounds(&self) -> [(usize, usize, usize, usize); 4] {
        let (ave_x, ave_y) = self.midpoints();
        [
            (self.x_lo, ave_x, self.y_lo, ave_y),
            (self.x_lo, ave_x, ave_y + 1, self.y_hi),
            (ave_x + 1, self.x_hi, self.y_lo, ave_y),
            (ave_x + 1, self.x_hi, ave_y + 1, self.y_hi),
        ]
    }

    fn quadrant_of(&self, obs: &RankedObservation) -> usize {
        let (ave_x, ave_y) = self.midpoints();
        (if obs.rank_x <= ave_x { 0 } else { 2 }) + (if obs.rank_y <= ave_y { 0 } else { 1 })
    }
}

/// Inclusive width of a rank range; empty ranges are 0.
fn extent(lo: usize, hi: usize) -> f64 {
    if hi >= lo {
        (hi - lo + 1) as f64
    } else {
        0.0
    }
}

/// Contribution of a terminal cell holding `count` observations.
fn cell_term(count: usize, ext_x: f64, ext_y: f64) -> f64 {
    if count == 0 || ext_x <= 0.0 || ext_y <= 0.0 {
        return 0.0;
    }
    let c = count as f64;
    c * (c / (ext_x * ext_y)).ln()
}

/// Estimates mutual information from ranked observations.
///
/// The rank grid is split into quadrants recursively. A partition is split
/// when its quadrant counts fail a chi-square uniformity test; the first
/// partition is always split. Quadrants with more than two observations
/// become new partitions, smaller ones and uniform partitions are terminal
/// cells contributing `n ln(n / area)`. The estimate is
/// `sum / N + ln N`.
///
/// Partitions live on an explicit stack; needing more than `max_partitions`
/// of them at once is an error.
///
/// ```
/// use aracne::libs::mi::{adaptive_partition_mi, rank_pairs};
/// let xs: Vec<f64> = (0..64).map(|i| i as f64).collect();
/// let res = adaptive_partition_mi(&rank_pairs(&xs, &xs), 20).unwrap();
/// assert!((res.mi - 16f64.ln()).abs() < 1e-12);
/// ```
pub fn adaptive_partition_mi(
    obs: &[RankedObservation],
    max_partitions: usize,
) -> Result<PartitionMi, NetError> {
    let n = obs.len();
    if n == 0 {
        return Ok(PartitionMi { mi: 0.0, peak: 0 });
    }
    if max_partitions == 0 {
        return Err(NetError::PartitionLimit {
            limit: max_partitions,
        });
    }

    let mut stack = vec![Partition {
        x_lo: 1,
        x_hi: n,
        y_lo: 1,
        y_hi: n,
        members: (0..n).collect(),
    }];
    let mut peak = 1;
    let mut first = true;
    let mut sum = 0.0;

    while let Some(part) = stack.pop() {
        let count = part.members.len();

        let mut cells: [Vec<usize>; 4] = Default::default();
        for &m in &part.members {
            cells[part.quadrant_of(&obs[m])].push(m);
        }

        let expected = count as f64 / 4.0;
        let stat = 4.0
            * cells
                .iter()
                .map(|c| (c.len() as f64 - expected).powi(2))
                .sum::<f64>()
            / count as f64;

        if stat > CHI_SQUARE_CRITICAL || first {
            first = false;

            for (cell, (x_lo, x_hi, y_lo, y_hi)) in cells.into_iter().zip(part.quadrant_bounds()) {
                if cell.len() > 2 {
                    if stack.len() >= max_partitions {
                        return Err(NetError::PartitionLimit {
                            limit: max_partitions,
                        });
                    }
                    stack.push(Partition {
                        x_lo,
                        x_hi,
                        y_lo,
                        y_hi,
                        members: cell,
                    });
                    peak = peak.max(stack.len());
                } else if !cell.is_empty() {
                    sum += cell_term(cell.len(), extent(x_lo, x_hi), extent(y_lo, y_hi));
                }
            }
        } else {
            sum += cell_term(
                count,
                extent(part.x_lo, part.x_hi),
                extent(part.y_lo, part.y_hi),
            );
        }
    }

    Ok(PartitionMi {
        mi: sum / n as f64 + (n as f64).ln(),
        peak,
    })
}
