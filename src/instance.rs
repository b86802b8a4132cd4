use std::collections::BTreeSet;

use anyhow::{Result, bail};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::proto::{Family, LitTranslator, ProtoEncoding, ProtoLit, Var1, Var2};
use crate::solver::Solution;

/// `edges` distinct undirected edges over `0..nodes`, as `(low, high)` pairs.
pub fn random_graph(nodes: usize, edges: usize, seed: u64) -> Result<Vec<(usize, usize)>> {
    let max_edges = nodes.saturating_mul(nodes.saturating_sub(1)) / 2;
    if edges > max_edges {
        bail!("{} nodes allow at most {} edges, asked for {}", nodes, max_edges, edges);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut picked = BTreeSet::new();
    while picked.len() < edges {
        let a = rng.random_range(0..nodes);
        let b = rng.random_range(0..nodes);
        if a != b {
            picked.insert((a.min(b), a.max(b)));
        }
    }
    Ok(picked.into_iter().collect())
}

/// Graph coloring over `color[node, c]`. With `minimize`, `used[c]` tracks
/// whether a color appears and each used color costs 1.
#[derive(Debug, Clone)]
pub struct Coloring {
    pub encoding: ProtoEncoding,
    pub nodes: usize,
    pub colors: usize,
    color: Var2,
    used: Option<Var1>,
}

pub fn coloring(nodes: usize, edges: &[(usize, usize)], colors: usize, minimize: bool) -> Result<Coloring> {
    if colors == 0 {
        bail!("need at least one color");
    }
    if let Some(&(a, b)) = edges.iter().find(|&&(a, b)| a >= nodes || b >= nodes) {
        bail!("edge ({}, {}) references a node outside 0..{}", a, b, nodes);
    }

    let mut enc = ProtoEncoding::new();
    enc.comment(format!("coloring nodes={nodes} edges={} colors={colors}", edges.len()))?;
    let mut color = enc.var2(colors, false)?;
    let mut used = if minimize { Some(enc.var1()?) } else { None };

    for n in 0..nodes {
        enc.comment_hard(format!("node {n} gets exactly one color"))?;
        let mut row = Vec::with_capacity(colors);
        for c in 0..colors {
            row.push(color.named(&mut enc, "color", [n, c])?);
        }
        enc.add_hard(row.iter().cloned())?;
        for (i, a) in row.iter().enumerate() {
            for b in &row[i + 1..] {
                enc.add_hard([a.neg(), b.neg()])?;
            }
        }
    }

    if !edges.is_empty() {
        enc.comment_hard("adjacent nodes differ")?;
    }
    for &(a, b) in edges {
        for c in 0..colors {
            let x = color.lit(&mut enc, [a, c])?;
            let y = color.lit(&mut enc, [b, c])?;
            enc.add_hard([x.neg(), y.neg()])?;
        }
    }

    if let Some(used) = used.as_mut() {
        enc.comment_hard("a color is used if any node takes it")?;
        for c in 0..colors {
            let u = used.named(&mut enc, "used", c)?;
            for n in 0..nodes {
                let x = color.lit(&mut enc, [n, c])?;
                enc.add_hard([x.neg(), u.clone()])?;
            }
            enc.add_soft(1, [u.neg()])?;
        }
    }

    Ok(Coloring {
        encoding: enc,
        nodes,
        colors,
        color,
        used,
    })
}

impl Coloring {
    pub fn minimizes(&self) -> bool {
        self.used.is_some()
    }

    /// The color of each node under `solution`, `None` where no color is set.
    pub fn decode(&self, solution: &Solution, translator: &LitTranslator) -> Result<Vec<Option<usize>>> {
        let mut color = self.color;
        let mut out = Vec::with_capacity(self.nodes);
        for n in 0..self.nodes {
            let mut picked = None;
            for c in 0..self.colors {
                let lit = ProtoLit::new(color.variable(), color.index_of(&[n, c])?)?;
                if solution.value_of(translator, &lit)? == Some(true) {
                    picked = Some(c);
                    break;
                }
            }
            out.push(picked);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_is_deterministic_per_seed() {
        let a = random_graph(10, 15, 3).expect("graph");
        let b = random_graph(10, 15, 3).expect("graph");
        assert_eq!(a, b);
        assert_eq!(a.len(), 15);
        assert!(a.iter().all(|&(x, y)| x < y && y < 10));
    }

    #[test]
    fn too_many_edges() {
        assert!(random_graph(3, 4, 0).is_err());
        assert_eq!(random_graph(3, 3, 0).expect("graph").len(), 3);
    }

    #[test]
    fn clause_counts() {
        let col = coloring(3, &[(0, 1), (1, 2)], 2, true).expect("coloring");
        // per node: 1 at-least-one + 1 at-most-one pair
        // per edge: 2 conflicts; used links: 3 * 2
        assert_eq!(col.encoding.hard().len(), 3 * 2 + 2 * 2 + 6);
        assert_eq!(col.encoding.soft().len(), 2);
        assert_eq!(col.encoding.registered_count(), 3 * 2 + 2);
    }
}
