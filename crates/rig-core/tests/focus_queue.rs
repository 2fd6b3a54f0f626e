use std::cell::RefCell;
use std::rc::Rc;

use camrig_rig_core::{CameraRig, RigEvent};
use camrig_rig_model::focus::FocusPoint;
use camrig_rig_model::node::Node;
use camrig_rig_model::pov::{Pov, PovTable};
use camrig_rig_model::settings::RigSettings;
use glam::{Quat, Vec3};
use proptest::prelude::*;

const DT: f32 = 1.0 / 60.0;

fn rig() -> CameraRig {
    let povs = PovTable::new(vec![
        Pov::new("run", Vec3::new(0.0, 4.0, -8.0), Quat::IDENTITY),
        Pov::new("close", Vec3::new(0.0, 2.0, -3.0), Quat::IDENTITY).with_fov(45.0),
        Pov::new("top", Vec3::new(0.0, 10.0, 0.0), Quat::from_rotation_x(1.2)),
    ])
    .expect("valid POV table");
    CameraRig::new(RigSettings::new(povs)).expect("valid settings")
}

proptest! {
    #[test]
    fn focus_points_are_visited_fifo(
        points in prop::collection::vec((0.05f32..0.5, 0.0f32..0.3, 0usize..20), 1..8)
    ) {
        let mut rig = rig();
        let player = Node::at("player", Vec3::ZERO);
        rig.change_target(&player, 0.0, 0.0);

        let reached = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reached);
        rig.subscribe(move |event| {
            if let RigEvent::FocusPointReached { point } = event {
                sink.borrow_mut().push(point.target.label());
            }
        });

        let nodes: Vec<Node> = (0..points.len())
            .map(|i| Node::at(format!("p{i}"), Vec3::new(i as f32, 0.0, 5.0)))
            .collect();
        for (node, &(move_duration, dwell, wait)) in nodes.iter().zip(&points) {
            rig.add_focus_point(
                FocusPoint::new(node)
                    .with_move_duration(move_duration)
                    .with_dwell(dwell),
            );
            for _ in 0..wait {
                rig.tick(DT);
            }
        }
        for _ in 0..2000 {
            rig.tick(DT);
        }

        let expected: Vec<String> = (0..points.len()).map(|i| format!("p{i}")).collect();
        prop_assert!(!rig.is_focusing());
        prop_assert_eq!(rig.focus_queue_len(), 0);
        prop_assert_eq!(reached.borrow().clone(), expected);
        prop_assert!(rig.follow_target().is_some_and(|t| t.refers_to(&player)));
    }

    #[test]
    fn instant_pov_change_is_immediate(index in 0usize..6, duration in -5.0f32..=0.0) {
        let mut rig = rig();
        rig.change_pov(index, duration);

        let expected = if index < 3 { index } else { 0 };
        prop_assert_eq!(rig.active_pov_index(), expected);
        let pose = rig.povs()[expected].local_pose();
        prop_assert!(rig.camera_local().approx_eq(&pose, 1e-6));
        prop_assert_eq!(rig.fov(), rig.povs()[expected].fov);
    }

    #[test]
    fn instant_target_change_lands_on_target(
        x in -100.0f32..100.0,
        y in -100.0f32..100.0,
        z in -100.0f32..100.0,
    ) {
        let mut rig = rig();
        let target = Node::at("target", Vec3::new(x, y, z));
        rig.change_target(&target, 0.0, 0.0);

        prop_assert!(rig.follow_target().is_some_and(|t| t.refers_to(&target)));
        prop_assert_eq!(rig.holder().position, target.position());
    }
}
