use std::collections::HashMap;

use crate::math::polygon_2d::{
    classify_point, rotate_to_canonical_start, signed_area, simplify_loop, PointClassification,
};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::select::KeepDecision;
use super::split::EdgeFragment;

/// One connected piece of a boolean result.
///
/// `outer` is counter-clockwise; each hole is clockwise and lies inside `outer`.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Region {
    /// Area enclosed by the outer loop minus the holes.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area(&self.outer) + self.holes.iter().map(|h| signed_area(h)).sum::<f64>()
    }
}

/// Assembles kept fragments into closed loops and groups them into regions.
///
/// Loops are traced by always taking the most counter-clockwise turn, so
/// regions that touch at a single vertex come out as separate loops.
#[must_use]
pub fn assemble_regions(fragments: &[(EdgeFragment, KeepDecision)]) -> Vec<Region> {
    let mut merger = VertexMerger::new(TOLERANCE * 1000.0);
    let mut edges: Vec<(usize, usize)> = Vec::new();

    for (frag, decision) in fragments {
        let (from, to) = match decision {
            KeepDecision::Discard => continue,
            KeepDecision::Keep => (frag.start, frag.end),
            KeepDecision::KeepFlipped => (frag.end, frag.start),
        };
        let a = merger.get_or_create(&from);
        let b = merger.get_or_create(&to);
        if a != b && !edges.contains(&(a, b)) {
            edges.push((a, b));
        }
    }

    let loops = trace_loops(&merger.points, &edges);

    let mut outers: Vec<Vec<Point2>> = Vec::new();
    let mut holes: Vec<Vec<Point2>> = Vec::new();
    for lp in loops {
        let lp = simplify_loop(&lp);
        if lp.len() < 3 {
            continue;
        }
        let area = signed_area(&lp);
        if area > TOLERANCE {
            outers.push(rotate_to_canonical_start(&lp));
        } else if area < -TOLERANCE {
            holes.push(rotate_to_canonical_start(&lp));
        }
    }

    let mut regions: Vec<Region> = outers
        .into_iter()
        .map(|outer| Region {
            outer,
            holes: Vec::new(),
        })
        .collect();
    for hole in holes {
        if let Some(idx) = containing_region(&regions, &hole) {
            regions[idx].holes.push(hole);
        }
    }
    regions
}

fn trace_loops(points: &[Point2], edges: &[(usize, usize)]) -> Vec<Vec<Point2>> {
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &(from, _)) in edges.iter().enumerate() {
        outgoing.entry(from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        let start_vertex = edges[start].0;
        let mut current = start;
        let mut lp = Vec::new();
        let closed = loop {
            used[current] = true;
            let (from, to) = edges[current];
            lp.push(points[from]);
            if to == start_vertex {
                break true;
            }
            let dir_in = points[to] - points[from];
            let next = outgoing.get(&to).and_then(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .filter(|&e| !used[e])
                    .max_by(|&x, &y| {
                        let tx = turn_angle(&dir_in, &(points[edges[x].1] - points[to]));
                        let ty = turn_angle(&dir_in, &(points[edges[y].1] - points[to]));
                        tx.total_cmp(&ty)
                    })
            });
            match next {
                Some(e) => current = e,
                None => break false,
            }
        };
        if closed {
            loops.push(lp);
        }
    }
    loops
}

fn turn_angle(dir_in: &Vector2, dir_out: &Vector2) -> f64 {
    let cross = dir_in.x * dir_out.y - dir_in.y * dir_out.x;
    cross.atan2(dir_in.dot(dir_out))
}

fn containing_region(regions: &[Region], hole: &[Point2]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, region) in regions.iter().enumerate() {
        let inside = hole
            .iter()
            .map(|p| classify_point(p, &region.outer))
            .find(|c| *c != PointClassification::OnBoundary)
            .is_none_or(|c| c == PointClassification::Inside);
        let area = signed_area(&region.outer);
        if inside && best.is_none_or(|(_, a)| area < a) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

/// Spatial hash-based vertex merger.
///
/// Groups points by grid cell and merges points that are within `cell_size`
/// of each other.
struct VertexMerger {
    cell_size: f64,
    map: HashMap<(i64, i64), Vec<usize>>,
    points: Vec<Point2>,
}

impl VertexMerger {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            map: HashMap::new(),
            points: Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point2) -> (i64, i64) {
        let inv = 1.0 / self.cell_size;
        ((p.x * inv).floor() as i64, (p.y * inv).floor() as i64)
    }

    fn get_or_create(&mut self, point: &Point2) -> usize {
        let key = self.cell_key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(entries) = self.map.get(&(key.0 + dx, key.1 + dy)) {
                    for &idx in entries {
                        if (point - self.points[idx]).norm() < self.cell_size {
                            return idx;
                        }
                    }
                }
            }
        }
        let idx = self.points.len();
        self.points.push(*point);
        self.map.entry(key).or_default().push(idx);
        idx
    }
}
