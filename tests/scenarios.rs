#![allow(clippy::unwrap_used)]

use approx::assert_abs_diff_eq;
use boxjoint::error::{BoxError, StructuralViolation};
use boxjoint::math::polygon_2d::is_axis_aligned_loop;
use boxjoint::math::{Axis, Point2};
use boxjoint::model::{AxisCut, BoxConfig, FaceId, Faces, VoidId};
use boxjoint::panels::{EdgeStatus, JointKind, PanelCollection, PanelId};
use boxjoint::tessellation::tessellate_panel;
use boxjoint::{Action, DispatchOptions, SceneEngine};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn enclosed() -> SceneEngine {
    init_tracing();
    let mut config = BoxConfig::new(100.0, 80.0, 60.0);
    config.material_thickness = 3.0;
    config.finger_width = 8.0;
    SceneEngine::new(config, Faces::all_solid()).unwrap()
}

fn subdivide(engine: &mut SceneEngine, axis: Axis, positions: Vec<f64>) -> Result<(), BoxError> {
    let void_id = engine.main_scene().primary.root;
    engine.dispatch(
        &Action::AddSubdivisions {
            void_id,
            axis,
            positions,
        },
        DispatchOptions::COMMIT,
    )
}

#[test]
fn single_divider_splits_root_in_two() {
    let mut engine = enclosed();
    subdivide(&mut engine, Axis::X, vec![50.0]).unwrap();
    assert_eq!(engine.main_scene().leaves().unwrap().len(), 2);

    let panels = engine.generate_panels().unwrap();
    let dividers: Vec<_> = panels.dividers().collect();
    assert_eq!(dividers.len(), 1);
    assert!(dividers[0].outline.len() >= 4);
}

#[test]
fn two_dividers_make_three_compartments() {
    let mut engine = enclosed();
    subdivide(&mut engine, Axis::X, vec![33.0, 66.0]).unwrap();
    assert_eq!(engine.main_scene().leaves().unwrap().len(), 3);
    assert_eq!(engine.generate_panels().unwrap().dividers().count(), 2);
}

#[test]
fn grid_subdivision_makes_four_cells() {
    let mut engine = enclosed();
    let void_id = engine.main_scene().primary.root;
    engine
        .dispatch(
            &Action::AddGridSubdivision {
                void_id,
                cuts: vec![AxisCut::new(Axis::X, vec![50.0]), AxisCut::new(Axis::Z, vec![30.0])],
            },
            DispatchOptions::COMMIT,
        )
        .unwrap();
    assert_eq!(engine.main_scene().leaves().unwrap().len(), 4);

    let panels = engine.generate_panels().unwrap();
    assert_eq!(panels.dividers().count(), 2);
    for divider in panels.dividers() {
        assert!(is_axis_aligned_loop(&divider.outline));
    }
}

#[test]
fn subdividing_a_parent_again_is_rejected() {
    let mut engine = enclosed();
    subdivide(&mut engine, Axis::X, vec![50.0]).unwrap();
    let err = subdivide(&mut engine, Axis::Y, vec![20.0]).unwrap_err();
    assert!(matches!(err, BoxError::Structural(StructuralViolation::NotALeaf(_))));
    assert_eq!(engine.main_scene().leaves().unwrap().len(), 2);
}

/// Dispatches `action`, expects `expected` and checks nothing changed.
fn assert_rejected(engine: &mut SceneEngine, action: &Action, expected: fn(&StructuralViolation) -> bool) {
    let panels = engine.generate_panels().unwrap();
    let leaves = engine.main_scene().leaves().unwrap();
    let err = engine.dispatch(action, DispatchOptions::COMMIT).unwrap_err();
    match &err {
        BoxError::Structural(violation) => assert!(expected(violation), "{err}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(engine.generate_panels().unwrap(), panels);
    assert_eq!(engine.main_scene().leaves().unwrap(), leaves);
}

fn host_nested_box(engine: &mut SceneEngine, void_id: VoidId) -> Action {
    let action = Action::CreateSubAssembly {
        void_id,
        clearance: 1.0,
        axis: Axis::Y,
        material_thickness: None,
    };
    engine.dispatch(&action, DispatchOptions::COMMIT).unwrap();
    action
}

#[test]
fn axis_between_two_open_faces_is_blocked() {
    init_tracing();
    let mut engine = SceneEngine::new(
        BoxConfig::new(100.0, 80.0, 60.0),
        Faces::with_open(&[FaceId::Left, FaceId::Right]),
    )
    .unwrap();
    let void_id = engine.main_scene().primary.root;
    let split = Action::AddSubdivisions {
        void_id,
        axis: Axis::X,
        positions: vec![40.0],
    };
    assert_rejected(&mut engine, &split, |v| {
        matches!(v, StructuralViolation::AxisBlocked(Axis::X))
    });
}

#[test]
fn grid_with_one_blocked_axis_creates_nothing() {
    init_tracing();
    let mut engine = SceneEngine::new(
        BoxConfig::new(100.0, 80.0, 60.0),
        Faces::with_open(&[FaceId::Front, FaceId::Back]),
    )
    .unwrap();
    let root = engine.main_scene().primary.root;
    let grid = Action::AddGridSubdivision {
        void_id: root,
        cuts: vec![AxisCut::new(Axis::X, vec![50.0]), AxisCut::new(Axis::Z, vec![30.0])],
    };
    assert_rejected(&mut engine, &grid, |v| {
        matches!(v, StructuralViolation::AxisBlocked(Axis::Z))
    });
    let node = engine.main_scene().voids.node(root).unwrap();
    assert!(node.is_leaf());
    assert!(node.partition.is_none());
}

#[test]
fn inset_lid_cap_accepts_no_structure() {
    init_tracing();
    let mut config = BoxConfig::new(100.0, 80.0, 60.0);
    config.assembly.positive_lid.inset = 5.0;
    let mut engine = SceneEngine::new(config, Faces::all_solid()).unwrap();
    let cap = engine.main_scene().primary.lid_caps[0];

    let split = Action::AddSubdivisions {
        void_id: cap,
        axis: Axis::X,
        positions: vec![40.0],
    };
    assert_rejected(&mut engine, &split, |v| matches!(v, StructuralViolation::LidInset(_)));

    let nested = Action::CreateSubAssembly {
        void_id: cap,
        clearance: 0.5,
        axis: Axis::Y,
        material_thickness: None,
    };
    assert_rejected(&mut engine, &nested, |v| matches!(v, StructuralViolation::LidInset(_)));
}

#[test]
fn hosting_void_stays_a_leaf() {
    let mut engine = enclosed();
    let root = engine.main_scene().primary.root;
    let nested = host_nested_box(&mut engine, root);

    let split = Action::AddSubdivisions {
        void_id: root,
        axis: Axis::X,
        positions: vec![50.0],
    };
    assert_rejected(&mut engine, &split, |v| {
        matches!(v, StructuralViolation::HostsSubAssembly(_))
    });
    assert_rejected(&mut engine, &nested, |v| {
        matches!(v, StructuralViolation::HostsSubAssembly(_))
    });
}

#[test]
fn nested_box_needs_a_leaf() {
    let mut engine = enclosed();
    subdivide(&mut engine, Axis::X, vec![50.0]).unwrap();
    let root = engine.main_scene().primary.root;
    let nested = Action::CreateSubAssembly {
        void_id: root,
        clearance: 1.0,
        axis: Axis::Y,
        material_thickness: None,
    };
    assert_rejected(&mut engine, &nested, |v| matches!(v, StructuralViolation::NotALeaf(_)));
}

#[test]
fn free_corner_reaches_twenty_millimetres() {
    init_tracing();
    let engine = SceneEngine::new(
        BoxConfig::new(23.0, 23.0, 23.0),
        Faces::with_open(&[FaceId::Top, FaceId::Left]),
    )
    .unwrap();
    let panels = engine.generate_panels().unwrap();
    let front = panels.panel(&PanelId::Face(FaceId::Front)).unwrap();
    let corner = front
        .corners
        .iter()
        .find(|c| c.position == Point2::new(-11.5, 11.5))
        .unwrap();
    assert!(corner.eligible);
    assert_abs_diff_eq!(corner.max_radius, 20.0, epsilon = 1e-9);
}

#[test]
fn fillet_rounds_the_free_corner() {
    init_tracing();
    let mut engine = SceneEngine::new(
        BoxConfig::new(23.0, 23.0, 23.0),
        Faces::with_open(&[FaceId::Top, FaceId::Left]),
    )
    .unwrap();
    let panel = PanelId::Face(FaceId::Front);
    let panels = engine.generate_panels().unwrap();
    let corner = panels
        .panel(&panel)
        .unwrap()
        .corners
        .iter()
        .find(|c| c.position == Point2::new(-11.5, 11.5))
        .unwrap()
        .id;

    let too_big = Action::SetCornerFillet {
        panel,
        corner,
        radius: 25.0,
    };
    assert!(engine.dispatch(&too_big, DispatchOptions::COMMIT).is_err());

    let action = Action::SetCornerFillet {
        panel,
        corner,
        radius: 5.0,
    };
    engine.dispatch(&action, DispatchOptions::COMMIT).unwrap();
    let panels = engine.generate_panels().unwrap();
    let front = panels.panel(&panel).unwrap();
    assert!(!is_axis_aligned_loop(&front.outline));
    assert!(!front.outline.contains(&Point2::new(-11.5, 11.5)));
}

#[test]
fn moving_a_divider_moves_its_panel() {
    let mut engine = enclosed();
    subdivide(&mut engine, Axis::X, vec![33.0, 66.0]).unwrap();
    let panels = engine.generate_panels().unwrap();
    let subdivision = panels
        .dividers()
        .find_map(|p| match p.id {
            PanelId::Divider(id) if id.index == 0 => Some(id),
            _ => None,
        })
        .unwrap();
    let id = PanelId::Divider(subdivision);

    let move_to = |position| Action::SetDividerPosition {
        subdivision,
        position,
    };
    engine.dispatch(&move_to(20.0), DispatchOptions::COMMIT).unwrap();
    let moved = engine.generate_panels().unwrap();
    let x = moved.panel(&id).unwrap().position().x;
    assert_abs_diff_eq!(x, 3.0 + 20.0 + 1.5, epsilon = 1e-9);

    // Past its neighbour at 66.
    let err = engine.dispatch(&move_to(70.0), DispatchOptions::COMMIT).unwrap_err();
    assert!(matches!(err, BoxError::Structural(_)));
}

fn assert_mating(panels: &PanelCollection) {
    for panel in panels.iter() {
        for edge in &panel.edges {
            let Some(joint) = edge.joint.filter(|j| j.kind == JointKind::Finger) else {
                continue;
            };
            let mate = panels.panel(&joint.mate).unwrap();
            let back = mate
                .edges
                .iter()
                .find_map(|e| e.joint.filter(|j| j.mate == panel.id))
                .unwrap();
            assert_eq!(back.kind, JointKind::Finger);
            assert_ne!(joint.tabs_out, back.tabs_out, "{} / {}", panel.id, mate.id);
        }
    }
}

#[test]
fn mating_edges_are_complementary() {
    let engine = enclosed();
    let panels = engine.generate_panels().unwrap();
    assert_mating(&panels);
    for panel in panels.iter() {
        assert!(panel.edges.iter().all(|e| e.status == EdgeStatus::Locked));
    }
}

#[test]
fn nested_box_is_placed_inside_its_host() {
    let mut engine = enclosed();
    subdivide(&mut engine, Axis::X, vec![50.0]).unwrap();
    let host = engine.main_scene().leaves().unwrap()[0];
    engine
        .dispatch(
            &Action::CreateSubAssembly {
                void_id: host,
                clearance: 1.0,
                axis: Axis::Y,
                material_thickness: None,
            },
            DispatchOptions::COMMIT,
        )
        .unwrap();
    let panels = engine.generate_panels().unwrap();
    let nested: Vec<_> = panels
        .iter()
        .filter(|p| matches!(p.id, PanelId::SubAssemblyFace { .. }))
        .collect();
    assert_eq!(nested.len(), 6);
    for panel in nested {
        let p = panel.position();
        assert!(p.x > 3.0 && p.x < 53.0, "{}", panel.id);
        let mesh = tessellate_panel(panel).unwrap();
        assert!(mesh.volume() > 0.0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn outlines_stay_axis_aligned(
        width in 60.0..200.0_f64,
        height in 60.0..200.0_f64,
        depth in 60.0..200.0_f64,
        frac in 0.2..0.8_f64,
        open_top in any::<bool>(),
    ) {
        let faces = if open_top { Faces::with_open(&[FaceId::Top]) } else { Faces::all_solid() };
        let mut engine = SceneEngine::new(BoxConfig::new(width, height, depth), faces).unwrap();
        let interior = width - 6.0;
        subdivide(&mut engine, Axis::X, vec![(interior - 3.0) * frac]).unwrap();
        let panels = engine.generate_panels().unwrap();
        for panel in panels.iter() {
            prop_assert!(is_axis_aligned_loop(&panel.outline), "{}", panel.id);
            for hole in &panel.holes {
                prop_assert!(is_axis_aligned_loop(&hole.points));
            }
        }
        assert_mating(&panels);
    }
}
