use std::collections::BTreeMap;

/// A stored connection from one gene to a neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub mi: f64,
    /// Gene through which DPI explains this connection
    pub intermediate: Option<usize>,
}

impl Edge {
    pub fn new(mi: f64) -> Self {
        Self {
            mi,
            intermediate: None,
        }
    }
}

/// What the graph knows about a gene pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeState {
    /// Neither gene has any stored edge, so the pair was never computed
    Unknown,
    /// The pair was computed but did not survive the threshold
    Pruned,
    /// The stored MI
    Weight(f64),
}

impl EdgeState {
    /// The numeric convention of `.adj` era code: -1 unknown, 0 pruned.
    pub fn legacy(&self) -> f64 {
        match self {
            EdgeState::Unknown => -1.0,
            EdgeState::Pruned => 0.0,
            EdgeState::Weight(mi) => *mi,
        }
    }
}

/// Sparse adjacency rows indexed by gene id.
///
/// A pair can be stored in one direction (rows of a hub or subnetwork) or in
/// both directions (full network). Rows are created on demand and never
/// removed.
#[derive(Debug, Clone, Default)]
pub struct GeneGraph {
    rows: Vec<BTreeMap<usize, Edge>>,
}

impl GeneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        let mut graph = Self::new();
        graph.rows.resize_with(n, BTreeMap::new);
        graph
    }

    /// Grows the row vector so that `id` has a row.
    pub fn ensure_capacity(&mut self, id: usize) {
        if self.rows.len() <= id {
            self.rows.resize_with(id + 1, BTreeMap::new);
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of stored directed entries.
    pub fn num_entries(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Stores `mi` for `a -> b`, and for `b -> a` when `symmetric`.
    /// An existing entry keeps its annotation and gets the new weight.
    pub fn insert(&mut self, a: usize, b: usize, mi: f64, symmetric: bool) {
        self.save(a, b, mi);
        if symmetric {
            self.save(b, a, mi);
        }
    }

    pub fn set_edge(&mut self, a: usize, b: usize, mi: f64) {
        self.insert(a, b, mi, false);
    }

    pub fn set_edge_symmetric(&mut self, a: usize, b: usize, mi: f64) {
        self.insert(a, b, mi, true);
    }

    fn save(&mut self, a: usize, b: usize, mi: f64) {
        self.ensure_capacity(a.max(b));
        self.rows[a]
            .entry(b)
            .and_modify(|e| e.mi = mi)
            .or_insert_with(|| Edge::new(mi));
    }

    pub fn neighbors(&self, id: usize) -> Option<&BTreeMap<usize, Edge>> {
        self.rows.get(id)
    }

    pub fn edge(&self, a: usize, b: usize) -> Option<&Edge> {
        self.rows.get(a).and_then(|r| r.get(&b))
    }

    /// MI stored for `a -> b`, else for `b -> a`.
    ///
    /// ```
    /// let mut graph = aracne::libs::graph::GeneGraph::new();
    /// assert_eq!(graph.lookup(0, 1), None);
    /// graph.set_edge(0, 1, 0.0);
    /// assert_eq!(graph.lookup(1, 0), Some(0.0));
    /// ```
    pub fn lookup(&self, a: usize, b: usize) -> Option<f64> {
        self.edge(a, b).or_else(|| self.edge(b, a)).map(|e| e.mi)
    }

    /// Tri-state lookup. A non-empty row of `a`, or else of `b`, counts as
    /// computed: the entry's weight if present, `Pruned` otherwise.
    pub fn state(&self, a: usize, b: usize) -> EdgeState {
        for (row, other) in [(a, b), (b, a)] {
            if let Some(map) = self.rows.get(row).filter(|m| !m.is_empty()) {
                return match map.get(&other) {
                    Some(e) => EdgeState::Weight(e.mi),
                    None => EdgeState::Pruned,
                };
            }
        }
        EdgeState::Unknown
    }

    /// `state` collapsed to -1 / 0 / mi.
    pub fn legacy_mi(&self, a: usize, b: usize) -> f64 {
        self.state(a, b).legacy()
    }

    /// Annotates `a -> b` with `via`. Returns false when no such entry exists.
    pub fn set_intermediate(&mut self, a: usize, b: usize, via: usize) -> bool {
        match self.rows.get_mut(a).and_then(|r| r.get_mut(&b)) {
            Some(e) => {
                e.intermediate = Some(via);
                true
            }
            None => false,
        }
    }

    pub fn clear_intermediates(&mut self, id: usize) {
        if let Some(row) = self.rows.get_mut(id) {
            row.values_mut().for_each(|e| e.intermediate = None);
        }
    }

    /// Entries of the row that carry an intermediate.
    pub fn num_indirect(&self, id: usize) -> usize {
        self.rows
            .get(id)
            .map(|r| r.values().filter(|e| e.intermediate.is_some()).count())
            .unwrap_or(0)
    }
}
