use std::collections::HashMap;

use crate::error::{Result, TopologyError};
use crate::mesh::{EditableMesh, Edge, Face, FaceId, VertexId};

/// Orders a face's boundary edges into one head-to-tail loop.
///
/// The walk starts at the first boundary edge in triangle order, so repeated
/// calls on an unmodified face return the same sequence.
pub struct SortEdgesByAdjacency {
    face: FaceId,
}

impl SortEdgesByAdjacency {
    /// Creates a new `SortEdgesByAdjacency` query.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self { face }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist, and `InvalidTopology`
    /// if its boundary is not a single closed loop of at least 3 edges.
    pub fn execute(&self, mesh: &EditableMesh) -> Result<Vec<Edge>> {
        sorted_boundary(mesh.face(self.face)?)
    }
}

/// Single boundary loop of `face`.
pub(crate) fn sorted_boundary(face: &Face) -> Result<Vec<Edge>> {
    let mut loops = boundary_loops(face.boundary_edges())?;
    if loops.len() != 1 {
        return Err(TopologyError::InvalidTopology(format!(
            "face boundary has {} loops",
            loops.len()
        ))
        .into());
    }
    let ring = loops.remove(0);
    if ring.len() < 3 {
        return Err(TopologyError::InvalidTopology(format!(
            "boundary loop has {} edges",
            ring.len()
        ))
        .into());
    }
    Ok(ring)
}

/// Splits unordered directed edges into closed head-to-tail loops.
///
/// Loops are discovered in the order their first edge appears.
pub(crate) fn boundary_loops(edges: &[Edge]) -> Result<Vec<Vec<Edge>>> {
    if edges.is_empty() {
        return Err(TopologyError::InvalidTopology("face has no boundary".into()).into());
    }

    let mut outgoing: HashMap<VertexId, usize> = HashMap::with_capacity(edges.len());
    for (i, e) in edges.iter().enumerate() {
        if outgoing.insert(e.a, i).is_some() {
            return Err(TopologyError::InvalidTopology(format!(
                "boundary branches at vertex {}",
                e.a
            ))
            .into());
        }
    }

    let mut visited = vec![false; edges.len()];
    let mut loops = Vec::new();
    for start in 0..edges.len() {
        if visited[start] {
            continue;
        }
        let mut ring = Vec::new();
        let mut current = start;
        loop {
            visited[current] = true;
            ring.push(edges[current]);
            let next = *outgoing.get(&edges[current].b).ok_or_else(|| {
                TopologyError::InvalidTopology(format!(
                    "boundary is open at vertex {}",
                    edges[current].b
                ))
            })?;
            if next == start {
                break;
            }
            if visited[next] {
                return Err(
                    TopologyError::InvalidTopology("boundary loops intersect".into()).into(),
                );
            }
            current = next;
        }
        loops.push(ring);
    }
    Ok(loops)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::mesh::MaterialId;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn v(i: usize) -> VertexId {
        VertexId::new(i)
    }

    fn chains(ring: &[Edge]) -> bool {
        (0..ring.len()).all(|i| ring[i].b == ring[(i + 1) % ring.len()].a)
    }

    #[test]
    fn hexagon_loop_chains_and_covers_every_vertex() {
        let positions: Vec<Point3> = (0..6)
            .map(|i| {
                let a = f64::from(i) * std::f64::consts::FRAC_PI_3;
                p(a.cos(), a.sin())
            })
            .collect();
        let mesh = EditableMesh::from_polygons(&positions, &[(0..6).collect()]).unwrap();
        let face = mesh.face_ids()[0];
        let ring = SortEdgesByAdjacency::new(face).execute(&mesh).unwrap();

        assert_eq!(ring.len(), 6);
        assert!(chains(&ring));
        let mut starts: Vec<VertexId> = ring.iter().map(|e| e.a).collect();
        starts.sort_unstable();
        starts.dedup();
        assert_eq!(starts.len(), 6);
    }

    #[test]
    fn repeated_calls_agree() {
        let positions = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let mesh = EditableMesh::from_polygons(&positions, &[vec![0, 1, 2, 3]]).unwrap();
        let face = mesh.face_ids()[0];
        let first = SortEdgesByAdjacency::new(face).execute(&mesh).unwrap();
        let second = SortEdgesByAdjacency::new(face).execute(&mesh).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn two_disjoint_triangles_are_invalid() {
        let face = Face::new(
            vec![[v(0), v(1), v(2)], [v(3), v(4), v(5)]],
            MaterialId::default(),
            false,
        );
        assert!(sorted_boundary(&face).unwrap_err().is_invalid_topology());
    }

    #[test]
    fn annulus_yields_two_loops() {
        // Square ring: outer 0..4, inner 4..8.
        let t = |a, b, c| [v(a), v(b), v(c)];
        let face = Face::new(
            vec![
                t(0, 1, 5),
                t(0, 5, 4),
                t(1, 2, 6),
                t(1, 6, 5),
                t(2, 3, 7),
                t(2, 7, 6),
                t(3, 0, 4),
                t(3, 4, 7),
            ],
            MaterialId::default(),
            false,
        );
        let loops = boundary_loops(face.boundary_edges()).unwrap();
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.len() == 4 && chains(l)));
        assert!(sorted_boundary(&face).unwrap_err().is_invalid_topology());
    }

    #[test]
    fn missing_face_is_not_found() {
        let mut mesh = EditableMesh::from_polygons(
            &[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)],
            &[vec![0, 1, 2]],
        )
        .unwrap();
        let face = mesh.face_ids()[0];
        mesh.remove_face(face).unwrap();
        assert!(SortEdgesByAdjacency::new(face).execute(&mesh).unwrap_err().is_not_found());
    }
}
