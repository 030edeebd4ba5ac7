//! Index-addressed adjacency and bond-order matrices.
//!
//! Both matrices are square, symmetric, and share one index space: position `k` is the
//! `k`-th member of the molecule they were derived from. Nodes never reference each other;
//! all graph queries are row scans.

use nalgebra::DMatrix;
use std::fmt;

/// Symmetric 0/1 adjacency matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGraph {
    matrix: DMatrix<u8>,
}

impl ConnectivityGraph {
    /// Creates an edgeless graph over `n` atoms.
    pub fn new(n: usize) -> Self {
        Self {
            matrix: DMatrix::zeros(n, n),
        }
    }

    /// Builds a graph from an explicit edge list.
    ///
    /// # Panics
    ///
    /// Panics if an edge references an index `>= n`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut graph = Self::new(n);
        for &(i, j) in edges {
            graph.connect(i, j);
        }
        graph
    }

    /// Adds the undirected edge `i`–`j`. Self-loops are ignored.
    pub fn connect(&mut self, i: usize, j: usize) {
        if i != j {
            self.matrix[(i, j)] = 1;
            self.matrix[(j, i)] = 1;
        }
    }

    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_connected(&self, i: usize, j: usize) -> bool {
        self.matrix[(i, j)] != 0
    }

    /// Number of neighbors of atom `i` (its row sum).
    pub fn degree(&self, i: usize) -> usize {
        self.matrix.row(i).iter().filter(|&&v| v != 0).count()
    }

    /// All edges `(i, j)` with `i < j`, in row-major order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let n = self.size();
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.is_connected(i, j) {
                    edges.push((i, j));
                }
            }
        }
        edges
    }

    pub fn as_matrix(&self) -> &DMatrix<u8> {
        &self.matrix
    }
}

/// Symmetric matrix of integer bond orders; zero where no bond exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondOrderMatrix {
    matrix: DMatrix<u8>,
}

impl BondOrderMatrix {
    /// Starts every bonded pair of `graph` at order one.
    pub fn from_connectivity(graph: &ConnectivityGraph) -> Self {
        Self {
            matrix: graph.matrix.clone(),
        }
    }

    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn order(&self, i: usize, j: usize) -> u8 {
        self.matrix[(i, j)]
    }

    /// Sets the order of the `i`–`j` bond on both triangles.
    pub fn set_order(&mut self, i: usize, j: usize, order: u8) {
        self.matrix[(i, j)] = order;
        self.matrix[(j, i)] = order;
    }

    /// Total bond order carried by atom `i` (its row sum).
    pub fn valence(&self, i: usize) -> u32 {
        self.matrix.row(i).iter().map(|&v| v as u32).sum()
    }

    /// Row sums for every atom.
    pub fn valences(&self) -> Vec<u32> {
        (0..self.size()).map(|i| self.valence(i)).collect()
    }

    /// Number of order-one bonds on atom `i`.
    pub fn single_bond_count(&self, i: usize) -> usize {
        self.matrix.row(i).iter().filter(|&&v| v == 1).count()
    }

    /// Sum of all bond orders, each bond counted once.
    pub fn total_order(&self) -> u32 {
        self.matrix.iter().map(|&v| v as u32).sum::<u32>() / 2
    }

    /// Bonded pairs `(i, j, order)` with `i < j`.
    pub fn bonds(&self) -> Vec<(usize, usize, u8)> {
        let n = self.size();
        let mut bonds = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let order = self.order(i, j);
                if order > 0 {
                    bonds.push((i, j, order));
                }
            }
        }
        bonds
    }

    /// Checks that no atom carries more total bond order than `valences` allows.
    pub fn valences_not_too_large(&self, valences: &[u8]) -> bool {
        valences
            .iter()
            .enumerate()
            .all(|(i, &max)| self.valence(i) <= max as u32)
    }

    pub fn as_matrix(&self) -> &DMatrix<u8> {
        &self.matrix
    }
}

impl fmt::Display for BondOrderMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.size() {
            let row: Vec<String> = (0..self.size())
                .map(|j| self.order(i, j).to_string())
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_is_symmetric_and_ignores_self_loops() {
        let mut graph = ConnectivityGraph::new(3);
        graph.connect(0, 2);
        graph.connect(1, 1);

        assert!(graph.is_connected(0, 2));
        assert!(graph.is_connected(2, 0));
        assert!(!graph.is_connected(1, 1));
        assert_eq!(graph.edges(), vec![(0, 2)]);
    }

    #[test]
    fn degree_counts_neighbors() {
        let graph = ConnectivityGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(graph.degree(0), 3);
        assert_eq!(graph.degree(3), 1);
    }

    #[test]
    fn bond_order_matrix_tracks_valence_and_singles() {
        let graph = ConnectivityGraph::from_edges(3, &[(0, 1), (1, 2)]);
        let mut bo = BondOrderMatrix::from_connectivity(&graph);
        bo.set_order(0, 1, 2);

        assert_eq!(bo.order(1, 0), 2);
        assert_eq!(bo.valences(), vec![2, 3, 1]);
        assert_eq!(bo.single_bond_count(1), 1);
        assert_eq!(bo.total_order(), 3);
        assert_eq!(bo.bonds(), vec![(0, 1, 2), (1, 2, 1)]);
    }

    #[test]
    fn valences_not_too_large_detects_overflow() {
        let graph = ConnectivityGraph::from_edges(2, &[(0, 1)]);
        let mut bo = BondOrderMatrix::from_connectivity(&graph);
        bo.set_order(0, 1, 3);

        assert!(bo.valences_not_too_large(&[4, 3]));
        assert!(!bo.valences_not_too_large(&[4, 2]));
    }
}
