#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use facecut::cut::{CutKind, CutSession, CutSettings, CutVertexDescriptor, FaceCutPlanner, VertexKind};
use facecut::math::{Point3, Vector3};
use facecut::mesh::{EditableMesh, FaceId, VertexId};
use facecut::operations::{FaceNormal, SortEdgesByAdjacency, ValidateMesh};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn p(x: f64, y: f64) -> Point3 {
    Point3::new(x, y, 0.0)
}

fn cut_point(x: f64, y: f64, kind: VertexKind) -> CutVertexDescriptor {
    CutVertexDescriptor::new(p(x, y), Vector3::z(), kind)
}

fn single_face(positions: &[Point3]) -> (EditableMesh, FaceId) {
    let polygon: Vec<usize> = (0..positions.len()).collect();
    let mesh = EditableMesh::from_polygons(positions, &[polygon]).unwrap();
    let face = mesh.face_ids()[0];
    (mesh, face)
}

fn unit_square() -> (EditableMesh, FaceId) {
    single_face(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)])
}

fn hexagon() -> (EditableMesh, FaceId) {
    let corners: Vec<Point3> = (0..6_i32)
        .map(|i| {
            let angle = f64::from(i) * std::f64::consts::FRAC_PI_3;
            p(angle.cos(), angle.sin())
        })
        .collect();
    single_face(&corners)
}

fn face_ids_of(mesh: &EditableMesh, faces: &[FaceId]) -> HashSet<VertexId> {
    faces
        .iter()
        .flat_map(|&f| mesh.face(f).unwrap().distinct_indices().to_vec())
        .collect()
}

fn total_area(mesh: &EditableMesh, faces: &[FaceId]) -> f64 {
    faces
        .iter()
        .flat_map(|&f| mesh.face(f).unwrap().triangles().to_vec())
        .map(|[a, b, c]| {
            let (pa, pb, pc) = (
                mesh.position(a).unwrap(),
                mesh.position(b).unwrap(),
                mesh.position(c).unwrap(),
            );
            (pb - pa).cross(&(pc - pa)).z / 2.0
        })
        .sum()
}

#[test]
fn interior_loop_cuts_a_hole() {
    init_tracing();
    let (mut mesh, face) = single_face(&[p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)]);
    let before = FaceNormal::new(face).execute(&mesh).unwrap();

    let path = vec![
        cut_point(0.5, 0.5, VertexKind::NEW_VERTEX),
        cut_point(1.5, 0.5, VertexKind::NEW_VERTEX),
        cut_point(1.0, 1.5, VertexKind::NEW_VERTEX),
        cut_point(0.5, 0.5, VertexKind::NEW_VERTEX | VertexKind::VERTEX_IN_SHAPE),
    ];
    let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();

    assert_eq!(result.kind, CutKind::Hole);
    assert_eq!(result.faces.len(), 1);
    let after = FaceNormal::new(result.faces[0]).execute(&mesh).unwrap();
    assert!(before.dot(&after) > 0.0);
    assert!((total_area(&mesh, &result.faces) - 3.5).abs() < 1e-9);
    ValidateMesh::new().with_boundary_loops().execute(&mesh).unwrap();
}

#[test]
fn filled_hole_keeps_the_inner_face() {
    let (mut mesh, face) = unit_square();
    let path = vec![
        cut_point(0.2, 0.2, VertexKind::NEW_VERTEX),
        cut_point(0.8, 0.2, VertexKind::NEW_VERTEX),
        cut_point(0.8, 0.8, VertexKind::NEW_VERTEX),
        cut_point(0.2, 0.8, VertexKind::NEW_VERTEX),
    ];
    let result = FaceCutPlanner::new(face, path)
        .with_settings(CutSettings::default().with_fill_hole(true))
        .execute(&mut mesh)
        .unwrap();

    assert_eq!(result.kind, CutKind::Hole);
    assert_eq!(result.faces.len(), 2);
    assert!((total_area(&mesh, &result.faces) - 1.0).abs() < 1e-9);
}

#[test]
fn edge_to_edge_path_splits_square_in_two() {
    init_tracing();
    let (mut mesh, face) = unit_square();
    let path = vec![
        cut_point(0.5, 0.0, VertexKind::ADDED_ON_EDGE),
        cut_point(0.5, 1.0, VertexKind::ADDED_ON_EDGE),
    ];
    let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();

    assert_eq!(result.faces.len(), 2);
    let counts: usize = result
        .faces
        .iter()
        .map(|&f| mesh.face(f).unwrap().distinct_indices().len())
        .sum();
    assert_eq!(counts, 4 + 2 + 2);
    for &f in &result.faces {
        assert_eq!(SortEdgesByAdjacency::new(f).execute(&mesh).unwrap().len(), 4);
    }
    assert!((total_area(&mesh, &result.faces) - 1.0).abs() < 1e-9);
}

#[test]
fn three_touches_on_hexagon_give_three_faces() {
    init_tracing();
    let (mut mesh, face) = hexagon();
    let boundary: HashSet<VertexId> = mesh.face(face).unwrap().distinct_indices().iter().copied().collect();

    let corner = |i: i32| {
        let angle = f64::from(i) * std::f64::consts::FRAC_PI_3;
        cut_point(angle.cos(), angle.sin(), VertexKind::EXISTING_VERTEX)
    };
    let path = vec![corner(0), corner(2), corner(4)];
    let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();

    assert_eq!(result.kind, CutKind::MultiSplit);
    assert_eq!(result.faces.len(), 3);
    let expected: HashSet<VertexId> = boundary.union(&result.cut_vertices.iter().copied().collect()).copied().collect();
    assert_eq!(face_ids_of(&mesh, &result.faces), expected);
}

#[test]
fn loop_through_opposite_edges_keeps_its_inside() {
    init_tracing();
    let (mut mesh, face) = unit_square();
    let path = vec![
        cut_point(0.5, 0.0, VertexKind::ADDED_ON_EDGE),
        cut_point(0.7, 0.5, VertexKind::NEW_VERTEX),
        cut_point(0.5, 1.0, VertexKind::ADDED_ON_EDGE),
        cut_point(0.3, 0.5, VertexKind::NEW_VERTEX),
        cut_point(0.5, 0.0, VertexKind::ADDED_ON_EDGE | VertexKind::VERTEX_IN_SHAPE),
    ];
    let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();

    assert_eq!(result.kind, CutKind::MultiSplit);
    assert_eq!(result.faces.len(), 3);
    assert!((total_area(&mesh, &result.faces) - 1.0).abs() < 1e-9);
    let diamond = result
        .faces
        .iter()
        .map(|&f| total_area(&mesh, &[f]))
        .filter(|a| (a - 0.2).abs() < 1e-9)
        .count();
    assert_eq!(diamond, 1);
    for &f in &result.faces {
        assert!(total_area(&mesh, &[f]) > 0.0);
    }
    ValidateMesh::new().execute(&mesh).unwrap();
}

#[test]
fn session_bisection_closes_back_to_start() {
    let (mut mesh, face) = unit_square();
    let mut session = CutSession::begin(face);
    session.add_vertex(&mesh, p(0.02, 0.01), Vector3::z()).unwrap();
    session.add_vertex(&mesh, p(0.5, 0.25), Vector3::z()).unwrap();
    session.add_vertex(&mesh, p(0.25, 0.5), Vector3::z()).unwrap();
    assert!(session.preview().closing.is_some());

    let result = session.commit(&mut mesh).unwrap();
    assert_eq!(result.kind, CutKind::Bisection);
    assert_eq!(result.faces.len(), 2);
    assert!((total_area(&mesh, &result.faces) - 1.0).abs() < 1e-9);
    ValidateMesh::new().execute(&mesh).unwrap();
}

#[test]
fn too_few_points_is_no_selection() {
    let (mut mesh, face) = unit_square();
    let (vertices, faces) = (mesh.vertex_count(), mesh.face_count());

    let mut session = CutSession::begin(face);
    assert!(session.commit(&mut mesh).unwrap_err().is_no_selection());
    session.add_vertex(&mesh, p(0.5, 0.5), Vector3::z()).unwrap();
    assert!(session.commit(&mut mesh).unwrap_err().is_no_selection());

    assert_eq!(mesh.vertex_count(), vertices);
    assert_eq!(mesh.face_count(), faces);
}

#[test]
fn unmatched_existing_vertex_leaves_mesh_unchanged() {
    let (mut mesh, face) = unit_square();
    let path = vec![
        cut_point(0.5, 0.0, VertexKind::ADDED_ON_EDGE),
        cut_point(0.7, 0.7, VertexKind::EXISTING_VERTEX),
    ];
    let err = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face_ids(), vec![face]);
}
