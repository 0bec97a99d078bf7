//! Undirected site lattices with shortest-path distance queries.

use std::collections::{BTreeSet, VecDeque};

use nqs_core::errors::{ErrorInfo, NqsError};
use serde::{Deserialize, Serialize};

/// Undirected graph over sites `0..size`.
///
/// Lattice-aware samplers only need adjacency and shortest-path distances,
/// so edges are stored both as a sorted list (for hashing and serialization)
/// and as per-site adjacency sets (for queries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    size: usize,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<BTreeSet<usize>>,
}

impl Lattice {
    /// Builds a lattice from an explicit edge list.
    pub fn from_edges(size: usize, edges: &[(usize, usize)]) -> Result<Self, NqsError> {
        if size == 0 {
            return Err(NqsError::Graph(ErrorInfo::new(
                "empty-graph",
                "lattice requires at least one site",
            )));
        }
        let mut adjacency = vec![BTreeSet::new(); size];
        let mut canonical = BTreeSet::new();
        for &(a, b) in edges {
            if a >= size || b >= size {
                return Err(NqsError::Graph(
                    ErrorInfo::new("site-out-of-range", "edge endpoint beyond lattice size")
                        .with_context("edge", format!("({a}, {b})"))
                        .with_context("size", size.to_string()),
                ));
            }
            if a == b {
                return Err(NqsError::Graph(
                    ErrorInfo::new("self-loop", "self loops are not allowed")
                        .with_context("site", a.to_string()),
                ));
            }
            adjacency[a].insert(b);
            adjacency[b].insert(a);
            canonical.insert((a.min(b), a.max(b)));
        }
        Ok(Self {
            size,
            edges: canonical.into_iter().collect(),
            adjacency,
        })
    }

    /// Builds a hypercube lattice of the given side length and dimension.
    ///
    /// With `pbc` the lattice wraps around in every dimension; edges that
    /// would duplicate under wrapping (side length 2) are deduplicated.
    pub fn hypercube(length: usize, n_dim: usize, pbc: bool) -> Result<Self, NqsError> {
        if length < 1 || n_dim < 1 {
            return Err(NqsError::Graph(
                ErrorInfo::new("bad-extent", "hypercube needs length >= 1 and n_dim >= 1")
                    .with_context("length", length.to_string())
                    .with_context("n_dim", n_dim.to_string()),
            ));
        }
        let mut size: usize = 1;
        for _ in 0..n_dim {
            size = size.checked_mul(length).ok_or_else(|| {
                NqsError::Graph(ErrorInfo::new(
                    "lattice-overflow",
                    "hypercube site count overflows usize",
                ))
            })?;
        }
        let mut edges = Vec::new();
        for site in 0..size {
            let coords = decode(site, length, n_dim);
            for dim in 0..n_dim {
                let mut next = coords.clone();
                if coords[dim] + 1 < length {
                    next[dim] += 1;
                } else if pbc && length > 1 {
                    next[dim] = 0;
                } else {
                    continue;
                }
                edges.push((site, encode(&next, length)));
            }
        }
        Self::from_edges(size, &edges)
    }

    /// One-dimensional chain, the common test lattice.
    pub fn chain(length: usize, pbc: bool) -> Result<Self, NqsError> {
        Self::hypercube(length, 1, pbc)
    }

    /// Number of sites.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sorted canonical edge list.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Neighbours of a site.
    pub fn neighbours(&self, site: usize) -> Result<&BTreeSet<usize>, NqsError> {
        self.adjacency.get(site).ok_or_else(|| {
            NqsError::Graph(
                ErrorInfo::new("site-out-of-range", "no such site")
                    .with_context("site", site.to_string())
                    .with_context("size", self.size.to_string()),
            )
        })
    }

    /// All-pairs shortest path distances via per-site BFS. `None` marks an
    /// unreachable pair.
    pub fn distances(&self) -> Vec<Vec<Option<usize>>> {
        (0..self.size).map(|site| self.bfs(site)).collect()
    }

    /// Pairs `(i, j)` with `i < j` and shortest-path distance at most
    /// `d_max`. This is the cluster set lattice-aware move kernels draw
    /// from.
    pub fn clusters_within(&self, d_max: usize) -> Vec<(usize, usize)> {
        let distances = self.distances();
        let mut clusters = Vec::new();
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if let Some(distance) = distances[i][j] {
                    if distance <= d_max {
                        clusters.push((i, j));
                    }
                }
            }
        }
        clusters
    }

    /// Returns true when every site can reach every other site.
    pub fn is_connected(&self) -> bool {
        self.bfs(0).iter().all(|distance| distance.is_some())
    }

    fn bfs(&self, start: usize) -> Vec<Option<usize>> {
        let mut distances = vec![None; self.size];
        let mut queue = VecDeque::new();
        distances[start] = Some(0);
        queue.push_back(start);
        while let Some(site) = queue.pop_front() {
            let next = distances[site].unwrap_or(0) + 1;
            for &neighbour in &self.adjacency[site] {
                if distances[neighbour].is_none() {
                    distances[neighbour] = Some(next);
                    queue.push_back(neighbour);
                }
            }
        }
        distances
    }
}

fn decode(site: usize, length: usize, n_dim: usize) -> Vec<usize> {
    let mut coords = vec![0usize; n_dim];
    let mut rest = site;
    for coord in coords.iter_mut() {
        *coord = rest % length;
        rest /= length;
    }
    coords
}

fn encode(coords: &[usize], length: usize) -> usize {
    let mut site = 0usize;
    for &coord in coords.iter().rev() {
        site = site * length + coord;
    }
    site
}

/// Serializes a lattice to canonical JSON.
pub fn lattice_to_json(lattice: &Lattice) -> Result<String, NqsError> {
    serde_json::to_string(lattice).map_err(|err| {
        NqsError::Serde(ErrorInfo::new("lattice-serialize", err.to_string()))
    })
}

/// Restores a lattice from its JSON form, revalidating the edge list.
pub fn lattice_from_json(payload: &str) -> Result<Lattice, NqsError> {
    let raw: Lattice = serde_json::from_str(payload).map_err(|err| {
        NqsError::Serde(ErrorInfo::new("lattice-parse", err.to_string()))
    })?;
    Lattice::from_edges(raw.size, &raw.edges)
}
