/// One sample of a gene pair together with its ranks in both dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedObservation {
    pub x: f64,
    pub y: f64,
    /// Position of the sample within the subset used for this computation
    pub slot: usize,
    /// 1-based rank of `x`
    pub rank_x: usize,
    /// 1-based rank of `y`
    pub rank_y: usize,
}

/// Assigns dense ranks to paired values. Ties are broken by slot.
///
/// ```
/// use aracne::libs::mi::rank_pairs;
/// let obs = rank_pairs(&[3.0, 1.0, 2.0], &[0.5, 0.5, 0.1]);
/// assert_eq!(obs.iter().map(|o| o.rank_x).collect::<Vec<_>>(), vec![3, 1, 2]);
/// assert_eq!(obs.iter().map(|o| o.rank_y).collect::<Vec<_>>(), vec![2, 3, 1]);
/// ```
pub fn rank_pairs(xs: &[f64], ys: &[f64]) -> Vec<RankedObservation> {
    let n = xs.len().min(ys.len());

    let mut obs: Vec<RankedObservation> = (0..n)
        .map(|slot| RankedObservation {
            x: xs[slot],
            y: ys[slot],
            slot,
            rank_x: 0,
            rank_y: 0,
        })
        .collect();

    let mut order: Vec<usize> = (0..n).collect();

    order.sort_by(|&a, &b| obs[a].x.total_cmp(&obs[b].x).then(a.cmp(&b)));
    for (pos, &i) in order.iter().enumerate() {
        obs[i].rank_x = pos + 1;
    }

    order.sort_by(|&a, &b| obs[a].y.total_cmp(&obs[b].y).then(a.cmp(&b)));
    for (pos, &i) in order.iter().enumerate() {
        obs[i].rank_y = pos + 1;
    }

    obs
}
