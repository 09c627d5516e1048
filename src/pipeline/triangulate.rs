use std::collections::BTreeSet;

use super::topology::Connector;
use crate::types::LandmarkList;

#[derive(Clone, Copy, Debug)]
struct Vertex {
    x: f64,
    y: f64,
}

#[derive(Clone, Copy, Debug)]
struct Triangle {
    corners: [usize; 3],
    center: Vertex,
    radius_sq: f64,
}

impl Triangle {
    fn new(corners: [usize; 3], vertices: &[Vertex]) -> Self {
        let [a, b, c] = corners.map(|i| vertices[i]);
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < f64::EPSILON {
            // Collinear corners: any later point evicts the sliver.
            return Self {
                corners,
                center: a,
                radius_sq: f64::INFINITY,
            };
        }
        let (a2, b2, c2) = (
            a.x * a.x + a.y * a.y,
            b.x * b.x + b.y * b.y,
            c.x * c.x + c.y * c.y,
        );
        let center = Vertex {
            x: (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            y: (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        };
        let radius_sq = (a.x - center.x).powi(2) + (a.y - center.y).powi(2);
        Self {
            corners,
            center,
            radius_sq,
        }
    }

    fn encloses(&self, p: Vertex) -> bool {
        (p.x - self.center.x).powi(2) + (p.y - self.center.y).powi(2) < self.radius_sq
    }

    fn edges(&self) -> [Connector; 3] {
        let [a, b, c] = self.corners;
        [ordered(a, b), ordered(b, c), ordered(c, a)]
    }

    fn is_degenerate(&self, vertices: &[Vertex]) -> bool {
        let [a, b, c] = self.corners.map(|i| vertices[i]);
        ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs() < f64::EPSILON
    }
}

fn ordered(a: usize, b: usize) -> Connector {
    if a <= b { (a, b) } else { (b, a) }
}

/// Delaunay edges over the present landmarks, using their normalized x/y.
/// Connectors carry list indices, so holes keep their numbering. Duplicate
/// and non-finite points are left out.
pub fn delaunay_connectors(landmarks: &LandmarkList) -> Vec<Connector> {
    let mut indices = Vec::new();
    let mut vertices = Vec::new();
    let mut seen = BTreeSet::new();
    for (index, landmark) in landmarks.slots().enumerate() {
        let Some(landmark) = landmark else {
            continue;
        };
        if !(landmark.x.is_finite() && landmark.y.is_finite()) {
            continue;
        }
        if !seen.insert((landmark.x.to_bits(), landmark.y.to_bits())) {
            continue;
        }
        indices.push(index);
        vertices.push(Vertex {
            x: landmark.x as f64,
            y: landmark.y as f64,
        });
    }
    if vertices.len() < 3 {
        return Vec::new();
    }

    let count = vertices.len();
    push_super_triangle(&mut vertices);
    let mut triangles = vec![Triangle::new([count, count + 1, count + 2], &vertices)];

    for point in 0..count {
        let p = vertices[point];
        let (bad, kept): (Vec<Triangle>, Vec<Triangle>) =
            triangles.into_iter().partition(|tri| tri.encloses(p));
        triangles = kept;

        // The hole's outline is every edge used by exactly one evicted triangle.
        let mut outline: Vec<Connector> = Vec::new();
        for edge in bad.iter().flat_map(Triangle::edges) {
            if let Some(pos) = outline.iter().position(|e| *e == edge) {
                outline.swap_remove(pos);
            } else {
                outline.push(edge);
            }
        }
        triangles.extend(
            outline
                .into_iter()
                .map(|(a, b)| Triangle::new([a, b, point], &vertices)),
        );
    }

    triangles
        .iter()
        .filter(|tri| tri.corners.iter().all(|&c| c < count))
        .filter(|tri| !tri.is_degenerate(&vertices))
        .flat_map(Triangle::edges)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|(a, b)| (indices[a], indices[b]))
        .collect()
}

fn push_super_triangle(vertices: &mut Vec<Vertex>) {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for v in vertices.iter() {
        min_x = min_x.min(v.x);
        min_y = min_y.min(v.y);
        max_x = max_x.max(v.x);
        max_y = max_y.max(v.y);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    vertices.extend([
        Vertex {
            x: mid_x - 20.0 * span,
            y: mid_y - span,
        },
        Vertex {
            x: mid_x,
            y: mid_y + 20.0 * span,
        },
        Vertex {
            x: mid_x + 20.0 * span,
            y: mid_y - span,
        },
    ]);
}
