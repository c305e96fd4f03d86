//! Property-based tests for pointer picking
//!
//! Validates the picking loop against the three-sphere demo scene:
//! - Empty screen regions produce no hits and no highlight
//! - A pointer over one object reports and highlights exactly that object
//! - Overlapping candidates resolve to the nearer one in any order
//! - Hover edges fire once per transition
//! - Clicks dispatch by the hovered object's tag
//! - Model picking waits for the model and yields to primary hits

use glam::{Mat4, Vec2, Vec3};
use pickscene_common::{Color, Transform};
use pickscene_input::{Action, ActionMap};
use pickscene_pick::{intersect_objects, PickGroup, PickingSession, Ray};
use pickscene_scene::{Model, PickableObject, SceneConfig, Scene, Shape};
use proptest::prelude::*;

const EYE: Vec3 = Vec3::new(0.0, 0.0, 3.0);

fn view_projection() -> Mat4 {
    let view = Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(75.0_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    proj * view
}

fn ray_at(ndc: Vec2) -> Ray {
    Ray::from_ndc(ndc, EYE, view_projection())
}

fn ndc_of(world: Vec3) -> Vec2 {
    let p = view_projection().project_point3(world);
    Vec2::new(p.x, p.y)
}

fn card() -> Model {
    Model::new("card", Transform::default()).with_part(
        PickableObject::new(
            "model/body",
            Shape::Box {
                half_extents: Vec3::new(6.0, 4.0, 0.1),
            },
        )
        .at(Vec3::new(0.0, 0.0, -2.0)),
    )
}

proptest! {
    /// Property: the upper band of the screen is empty
    ///
    /// The demo spheres sit on y = 0, so pointers high on the screen miss
    /// everything and nothing stays highlighted.
    #[test]
    fn empty_region_has_no_hits(x in -1.5f32..1.5, y in 0.6f32..1.5) {
        let mut scene = Scene::demo();
        let mut session = PickingSession::default();
        let report = session.frame(&mut scene, &ray_at(Vec2::new(x, y)));

        prop_assert!(report.primary_hits.is_empty());
        prop_assert!(session.current_primary().is_none());
        prop_assert!(scene.objects().iter().all(|o| o.color == Color::RED));
    }

    /// Property: a pointer inside one silhouette picks that object only
    #[test]
    fn single_object_is_nearest_and_highlighted(
        index in 0usize..3,
        dx in -0.2f32..0.2,
        dy in -0.2f32..0.2,
    ) {
        let mut scene = Scene::demo();
        let center = scene.objects()[index].transform.position;
        let target_tag = scene.objects()[index].tag.clone();
        let mut session = PickingSession::default();

        let report = session.frame(&mut scene, &ray_at(ndc_of(center + Vec3::new(dx, dy, 0.0))));

        prop_assert_eq!(report.primary_hits.len(), 1);
        prop_assert_eq!(&report.primary_hits[0].tag, &target_tag);
        for object in scene.objects() {
            let expected = if object.tag == target_tag { Color::BLUE } else { Color::RED };
            prop_assert_eq!(object.color, expected);
        }
    }

    /// Property: overlapping candidates resolve to the nearer one
    ///
    /// Candidate order must not matter.
    #[test]
    fn nearest_wins_regardless_of_order(
        near_z in -4.0f32..1.0,
        gap in 1.1f32..5.0,
        near_first in any::<bool>(),
    ) {
        let near = PickableObject::new("near", Shape::Sphere { radius: 0.5 })
            .at(Vec3::new(0.0, 0.0, near_z));
        let far = PickableObject::new("far", Shape::Sphere { radius: 0.5 })
            .at(Vec3::new(0.0, 0.0, near_z - gap));
        let near_id = near.id;
        let objects = if near_first { vec![near, far] } else { vec![far, near] };

        let hits = intersect_objects(&Ray::new(EYE, Vec3::NEG_Z), &objects, Mat4::IDENTITY);

        prop_assert_eq!(hits.len(), 2);
        prop_assert_eq!(hits[0].object, near_id);
        prop_assert!(hits[0].distance < hits[1].distance);
    }

    /// Property: enter and leave fire exactly once per transition
    #[test]
    fn edges_fire_once_per_transition(pattern in prop::collection::vec(any::<bool>(), 1..40)) {
        let mut scene = Scene::demo();
        let mut session = PickingSession::default();
        let hit_ray = Ray::new(EYE, Vec3::NEG_Z);
        let miss_ray = ray_at(Vec2::new(0.0, 0.9));

        let mut previous = false;
        for hovering in pattern {
            let ray = if hovering { &hit_ray } else { &miss_ray };
            let report = session.frame(&mut scene, ray);

            let enters = report.events.iter().filter(|e| e.edge.is_enter()).count();
            let leaves = report.events.len() - enters;
            prop_assert_eq!(enters, usize::from(hovering && !previous));
            prop_assert_eq!(leaves, usize::from(!hovering && previous));
            prop_assert_eq!(session.current_primary(), report.primary_hits.first());
            previous = hovering;
        }
    }

    /// Property: click dispatch follows the hovered object's tag
    #[test]
    fn click_dispatches_by_tag(index in 0usize..4) {
        let config = SceneConfig::default();
        let mut actions = ActionMap::new();
        for (tag, label) in config.click_bindings() {
            actions.bind(tag, label);
        }
        let mut scene = Scene::demo();
        let mut session = PickingSession::default();

        let ray = match scene.objects().get(index) {
            Some(object) => ray_at(ndc_of(object.transform.position)),
            None => ray_at(Vec2::new(0.0, 0.9)),
        };
        session.frame(&mut scene, &ray);

        let action = actions.dispatch(session.clicked_tag());
        if index < 3 {
            let expected = format!("click on object {}", index + 1);
            prop_assert!(
                matches!(&action, Action::Activate { label, .. } if *label == expected),
                "unexpected action {:?}",
                action
            );
        } else {
            prop_assert_eq!(action, Action::NoSelection);
        }
    }

    /// Property: model picking waits for the model and yields to primaries
    #[test]
    fn model_picking_is_gated(
        points in prop::collection::vec((-1.0f32..1.0, -1.0f32..1.0), 1..20),
        install_after in 0usize..20,
    ) {
        let mut scene = Scene::demo();
        let mut session = PickingSession::default();

        for (i, (x, y)) in points.into_iter().enumerate() {
            if i == install_after {
                scene.install_model(card()).unwrap();
            }
            let report = session.frame(&mut scene, &ray_at(Vec2::new(x, y)));

            prop_assert_eq!(report.model_tested, i >= install_after);
            if !report.model_tested {
                prop_assert!(report.model_hits.is_empty());
                prop_assert!(session.current_model().is_none());
                prop_assert!(report.events.iter().all(|e| e.group == PickGroup::Primary));
            }
            let expected = if report.primary_hits.is_empty() {
                report.model_hits.first()
            } else {
                None
            };
            prop_assert_eq!(session.current_model(), expected);
        }
    }
}
