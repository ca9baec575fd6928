// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Chaining of directed edges into closed loops

use super::predicates::left_turn;
use nalgebra::Point2;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Closed loops recovered from a set of directed edges
#[derive(Debug, Default)]
pub(crate) struct TracedLoops {
    pub loops: Vec<Vec<usize>>,
    /// Edges that could not be closed into a loop
    pub open_edges: usize,
}

/// Drop zero-length and repeated edges, then cancel each edge against its reverse
pub(crate) fn normalize_edges(edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    let unique: Vec<(usize, usize)> = edges
        .iter()
        .copied()
        .filter(|&(a, b)| a != b && seen.insert((a, b)))
        .collect();
    unique
        .iter()
        .copied()
        .filter(|&(a, b)| !seen.contains(&(b, a)))
        .collect()
}

/// Walk directed edges into loops.
///
/// At a vertex with several unused outgoing edges the sharpest left turn is
/// taken, which keeps regions touching at a single vertex in separate loops.
/// Revisiting a vertex closes the cycle found so far.
pub(crate) fn trace_loops(edges: &[(usize, usize)], coords: &[Point2<f64>]) -> TracedLoops {
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &(a, _)) in edges.iter().enumerate() {
        outgoing.entry(a).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut result = TracedLoops::default();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let mut ring: Vec<usize> = vec![edges[start].0];
        let mut position: HashMap<usize, usize> = HashMap::from([(edges[start].0, 0)]);
        let mut current = start;

        loop {
            let (a, v) = edges[current];
            if let Some(&j) = position.get(&v) {
                let cycle = ring.split_off(j);
                for vertex in &cycle {
                    position.remove(vertex);
                }
                result.loops.push(cycle);
                if ring.is_empty() {
                    break;
                }
            }

            let incoming = coords[v] - coords[a];
            let next = outgoing.get(&v).and_then(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .filter(|&e| !used[e])
                    .max_by(|&x, &y| {
                        let tx = left_turn(&incoming, &(coords[edges[x].1] - coords[v]));
                        let ty = left_turn(&incoming, &(coords[edges[y].1] - coords[v]));
                        tx.partial_cmp(&ty).unwrap_or(Ordering::Equal)
                    })
            });

            match next {
                Some(e) => {
                    used[e] = true;
                    position.insert(v, ring.len());
                    ring.push(v);
                    current = e;
                }
                None => {
                    result.open_edges += ring.len();
                    break;
                }
            }
        }
    }

    result
}
