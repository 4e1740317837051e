use crate::libs::graph::{EdgeState, GeneGraph};
use std::collections::BTreeSet;

/// Gene ids annotated as transcription factors.
#[derive(Debug, Clone, Default)]
pub struct TfSet {
    ids: BTreeSet<usize>,
}

impl TfSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: usize) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// A connection of a TF may not be explained away by a non-TF mediator.
    pub fn protects(&self, node: usize, neighbor: usize, mediator: usize) -> bool {
        !self.is_empty()
            && (self.contains(node) || self.contains(neighbor))
            && !self.contains(mediator)
    }
}

impl FromIterator<usize> for TfSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Applies the data processing inequality to the listed rows, or to every row
/// when `ids` is empty. Returns the number of edges marked indirect.
///
/// `eps` is the tolerance in [0, 1]; 1 leaves the graph untouched.
pub fn reduce(graph: &mut GeneGraph, eps: f64, ids: &[usize], tfs: &TfSet) -> usize {
    if eps >= 1.0 {
        return 0;
    }

    if ids.is_empty() {
        (0..graph.len())
            .map(|i| reduce_node(graph, i, eps, tfs))
            .sum()
    } else {
        ids.iter()
            .map(|&i| reduce_node(graph, i, eps, tfs))
            .sum()
    }
}

/// Reduces the edges of one node.
///
/// Edges are visited from strongest to weakest. An edge `(i, a)` is indirect
/// through `b` when both `(i, b)` and `(a, b)` exceed `mi(i, a) / (1 - eps)`.
pub fn reduce_node(graph: &mut GeneGraph, i: usize, eps: f64, tfs: &TfSet) -> usize {
    if eps >= 1.0 {
        return 0;
    }
    graph.clear_intermediates(i);

    let mut order: Vec<(usize, f64)> = match graph.neighbors(i) {
        Some(row) => row.iter().map(|(&id, e)| (id, e.mi)).collect(),
        None => return 0,
    };
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut marks = vec![];
    for (k, &(a, v_ia)) in order.iter().enumerate() {
        let min_mi = v_ia / (1.0 - eps);

        for &(b, v_ib) in &order[..k] {
            if v_ib <= min_mi {
                break;
            }

            if let EdgeState::Weight(v_ab) = graph.state(a, b) {
                if v_ab > min_mi && !tfs.protects(i, a, b) {
                    marks.push((a, b));
                    break;
                }
            }
        }
    }

    for &(a, b) in &marks {
        graph.set_intermediate(i, a, b);
    }

    marks.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    // A-B and B-C are strong, A-C is explained by B
    fn triangle() -> GeneGraph {
        let mut graph = GeneGraph::new();
        graph.set_edge_symmetric(0, 1, 0.9);
        graph.set_edge_symmetric(1, 2, 0.8);
        graph.set_edge_symmetric(0, 2, 0.5);
        graph
    }

    fn via(graph: &GeneGraph, a: usize, b: usize) -> Option<usize> {
        graph.edge(a, b).and_then(|e| e.intermediate)
    }

    #[test]
    fn test_triangle() {
        let mut graph = triangle();
        let n = reduce(&mut graph, 0.1, &[], &TfSet::new());

        assert_eq!(n, 2);
        assert_eq!(via(&graph, 0, 2), Some(1));
        assert_eq!(via(&graph, 2, 0), Some(1));
        assert_eq!(via(&graph, 0, 1), None);
        assert_eq!(via(&graph, 1, 2), None);
    }

    #[test]
    fn test_tolerance_keeps_close_edges() {
        // 0.5 / (1 - 0.5) = 1.0 exceeds every other weight
        let mut graph = triangle();
        assert_eq!(reduce(&mut graph, 0.5, &[], &TfSet::new()), 0);

        let mut graph = triangle();
        assert_eq!(reduce(&mut graph, 1.0, &[], &TfSet::new()), 0);
    }

    #[test]
    fn test_tf_protection() {
        for tf in [0, 2] {
            let mut graph = triangle();
            let tfs: TfSet = [tf].into_iter().collect();
            reduce(&mut graph, 0.1, &[], &tfs);
            assert_eq!(via(&graph, 0, 2), None);
            assert_eq!(via(&graph, 2, 0), None);
        }

        // a TF mediator may still explain a TF edge
        let mut graph = triangle();
        let tfs: TfSet = [0, 1].into_iter().collect();
        reduce(&mut graph, 0.1, &[], &tfs);
        assert_eq!(via(&graph, 0, 2), Some(1));
    }

    #[test]
    fn test_protection_invariant() {
        let tfs: TfSet = [0].into_iter().collect();
        for node in 0..4 {
            for a in 0..4 {
                for b in 0..4 {
                    if (node == 0 || a == 0) && b != 0 {
                        assert!(tfs.protects(node, a, b));
                    }
                }
            }
        }
        assert!(!TfSet::new().protects(0, 1, 2));
    }

    #[test]
    fn test_idempotent() {
        let mut graph = triangle();
        graph.set_edge_symmetric(2, 3, 0.95);
        graph.set_edge_symmetric(1, 3, 0.6);

        reduce(&mut graph, 0.05, &[], &TfSet::new());
        let once: Vec<_> = (0..4)
            .flat_map(|i| (0..4).map(move |j| (i, j)))
            .map(|(i, j)| via(&graph, i, j))
            .collect();

        reduce(&mut graph, 0.05, &[], &TfSet::new());
        let twice: Vec<_> = (0..4)
            .flat_map(|i| (0..4).map(move |j| (i, j)))
            .map(|(i, j)| via(&graph, i, j))
            .collect();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_mediator_edge() {
        // hub rows only: neighbors have no rows of their own
        let mut graph = GeneGraph::new();
        graph.set_edge(0, 1, 0.9);
        graph.set_edge(0, 2, 0.5);

        assert_eq!(reduce(&mut graph, 0.1, &[0], &TfSet::new()), 0);
        assert_eq!(via(&graph, 0, 2), None);
    }

    #[test]
    fn test_restricted_ids() {
        let mut graph = triangle();
        assert_eq!(reduce(&mut graph, 0.1, &[2], &TfSet::new()), 1);
        assert_eq!(via(&graph, 2, 0), Some(1));
        assert_eq!(via(&graph, 0, 2), None);
    }
}
