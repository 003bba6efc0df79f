use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};
use tracing::debug;

use crate::error::{Result, TessellationError};
use crate::math::polygon_3d::triangle_normal;
use crate::math::projection::ProjectionAxis;
use crate::math::{Point3, Vector3};
use crate::mesh::{EditableMesh, VertexId};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates a polygon with holes given by mesh vertex ids.
///
/// The rings are projected along the dominant axis of `normal` and fed to a
/// constrained Delaunay triangulation. Triangles come back wound
/// counter-clockwise around `normal`.
pub struct TriangulatePolygon {
    outer: Vec<VertexId>,
    holes: Vec<Vec<VertexId>>,
    normal: Vector3,
}

impl TriangulatePolygon {
    /// Creates a new `TriangulatePolygon` operation.
    #[must_use]
    pub fn new(outer: Vec<VertexId>, holes: Vec<Vec<VertexId>>, normal: Vector3) -> Self {
        Self {
            outer,
            holes,
            normal,
        }
    }

    /// Executes the triangulation against the mesh's effective positions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown vertex ids and `TriangulationFailure`
    /// if a ring is degenerate, rings cross, or no interior triangle remains.
    pub fn execute(&self, mesh: &EditableMesh) -> Result<Vec<[VertexId; 3]>> {
        let mut ids: Vec<VertexId> = Vec::new();
        let mut local: HashMap<VertexId, usize> = HashMap::new();
        let mut intern = |id: VertexId| {
            *local.entry(id).or_insert_with(|| {
                ids.push(id);
                ids.len() - 1
            })
        };

        let mut rings = Vec::with_capacity(1 + self.holes.len());
        for ring in std::iter::once(&self.outer).chain(&self.holes) {
            let mut r: Vec<usize> = ring.iter().map(|&id| intern(id)).collect();
            r.dedup();
            if r.len() > 1 && r.first() == r.last() {
                r.pop();
            }
            rings.push(r);
        }

        let points = ids
            .iter()
            .map(|&id| mesh.position(id))
            .collect::<Result<Vec<_>>>()?;

        let triangles = triangulate(&points, &rings, &[], &self.normal)?;
        Ok(triangles
            .into_iter()
            .map(|t| t.map(|i| ids[i]))
            .collect())
    }
}

/// Triangulates rings of indices into `points`.
///
/// The first ring is the outer boundary, the remaining rings are holes.
/// `extra` lists additional indices inserted as Steiner points. Coincident
/// points collapse to the first index that named them.
///
/// # Errors
///
/// Returns `TriangulationFailure` if a ring has fewer than 3 distinct points,
/// constraints intersect, or nothing lies inside the outer ring.
pub(crate) fn triangulate(
    points: &[Point3],
    rings: &[Vec<usize>],
    extra: &[usize],
    normal: &Vector3,
) -> Result<Vec<[usize; 3]>> {
    let axis = ProjectionAxis::from_normal(normal);
    let mut cdt = Cdt::new();

    // Handle index -> first local index that produced it.
    let mut owner: HashMap<usize, usize> = HashMap::new();
    let mut handles: Vec<Option<FixedVertexHandle>> = vec![None; points.len()];

    let used = rings.iter().flatten().chain(extra).copied();
    for i in used {
        if handles.get(i).copied().flatten().is_some() {
            continue;
        }
        let p = points.get(i).ok_or_else(|| {
            TessellationError::TriangulationFailure(format!("point index {i} out of range"))
        })?;
        let q = axis.project(p);
        let h = cdt.insert(SpadePoint2::new(q.x, q.y)).map_err(|e: InsertionError| {
            TessellationError::TriangulationFailure(format!("CDT insert: {e}"))
        })?;
        owner.entry(h.index()).or_insert(i);
        handles[i] = Some(h);
    }

    let mut constrained: HashSet<(usize, usize)> = HashSet::new();
    for ring in rings {
        let ring_handles: Vec<FixedVertexHandle> = ring.iter().filter_map(|&i| handles[i]).collect();
        let distinct: HashSet<usize> = ring_handles.iter().map(|h| h.index()).collect();
        if distinct.len() < 3 {
            return Err(TessellationError::TriangulationFailure(format!(
                "ring needs at least 3 distinct points, got {}",
                distinct.len()
            ))
            .into());
        }
        add_constraint_loop(&mut cdt, &ring_handles, &mut constrained)?;
    }

    let interior = interior_faces(&cdt);
    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(interior.len());
    for face in cdt.inner_faces() {
        if !interior.contains(&face.fix().index()) {
            continue;
        }
        let mut tri = [0usize; 3];
        for (slot, vh) in tri.iter_mut().zip(face.vertices()) {
            *slot = owner[&vh.fix().index()];
        }
        triangles.push(tri);
    }

    if triangles.is_empty() {
        return Err(TessellationError::TriangulationFailure("no interior triangles".into()).into());
    }

    let facing: Vector3 = triangles
        .iter()
        .map(|&[a, b, c]| triangle_normal(&points[a], &points[b], &points[c]))
        .sum();
    if facing.dot(normal) < 0.0 {
        for tri in &mut triangles {
            tri.swap(1, 2);
        }
    }

    debug!(
        rings = rings.len(),
        steiner = extra.len(),
        triangles = triangles.len(),
        "triangulated polygon"
    );
    Ok(triangles)
}

fn add_constraint_loop(
    cdt: &mut Cdt,
    ring: &[FixedVertexHandle],
    constrained: &mut HashSet<(usize, usize)>,
) -> Result<()> {
    for (i, &from) in ring.iter().enumerate() {
        let to = ring[(i + 1) % ring.len()];
        if from == to {
            continue;
        }
        let key = (from.index().min(to.index()), from.index().max(to.index()));
        if !constrained.insert(key) {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::TriangulationFailure(
                "boundary segments intersect".into(),
            )
            .into());
        }
        cdt.add_constraint(from, to);
    }
    Ok(())
}

/// Inner faces with odd constraint-crossing depth from the hull.
fn interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut depth: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    for edge in cdt.convex_hull() {
        let inner = edge.face().as_inner().or_else(|| edge.rev().face().as_inner());
        let Some(inner) = inner else { continue };
        let d = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
        if depth.insert(inner.fix().index(), d).is_none() {
            queue.push_back((inner.fix(), d));
        }
    }

    while let Some((fix, d)) = queue.pop_front() {
        for edge in cdt.face(fix).adjacent_edges() {
            let Some(next) = edge.rev().face().as_inner() else {
                continue;
            };
            let crossed = cdt.is_constraint_edge(edge.as_undirected().fix());
            let nd = d + u32::from(crossed);
            if let std::collections::hash_map::Entry::Vacant(slot) = depth.entry(next.fix().index()) {
                slot.insert(nd);
                queue.push_back((next.fix(), nd));
            }
        }
    }

    depth
        .into_iter()
        .filter_map(|(face, d)| (d % 2 == 1).then_some(face))
        .collect()
}
