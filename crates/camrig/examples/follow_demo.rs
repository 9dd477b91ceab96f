//! Follow Demo
//!
//! Drives a camera rig around a target walking a circle through a field of
//! pillars, with a preset transfer halfway through. The walker moves between
//! waypoints on the circle under a boost/retard controller and turns toward
//! its path smoothly, and a lamp on its shoulder lazily tracks the camera.
//! Prints the camera distance every half second.
//!
//! Run with: RUST_LOG=camrig=debug cargo run -p camrig --example follow_demo

use camrig::{
    low_pass_world_rotation, AttachRules, AxisInput, CameraRig, Pivots, RigConfig, SceneGraph,
    SphereField, SphereObstacle, TransformTree,
};
use camrig_math::{boost_retard, Rotator, Vec3};
use tracing_subscriber::EnvFilter;

const DT: f32 = 1.0 / 60.0;
const SECONDS: usize = 12;
const RADIUS: f32 = 600.0;
/// Degrees of arc between waypoints, and seconds spent on each
const WAYPOINT_ARC: f32 = 90.0;
const WAYPOINT_SECONDS: f32 = 3.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut scene = TransformTree::new();
    let actor = scene.spawn_named("walker", Vec3::ZERO);
    let target = scene.spawn_named("target", Vec3::new(0.0, 0.0, 90.0));
    scene.attach(target, actor, AttachRules::KEEP_RELATIVE);
    let rest = scene.spawn_named("rest", Vec3::new(-450.0, 0.0, 200.0));
    let camera = scene.spawn_named("camera", Vec3::ZERO);
    let lamp = scene.spawn_named("lamp", Vec3::new(0.0, 30.0, 160.0));
    scene.attach(lamp, actor, AttachRules::KEEP_RELATIVE);

    let mut pillars = SphereField::new();
    for i in 0..8 {
        let angle = (i as f32 * 45.0).to_radians();
        pillars.add(SphereObstacle::new(
            Vec3::new(angle.cos() * 900.0, angle.sin() * 900.0, 150.0),
            60.0,
        ));
    }

    let mut config = RigConfig::default();
    config.set_transfer_duration(1.5);
    config.look.set_permanent(false);
    tracing::info!(config = %config.to_json()?, "starting follow demo");

    let mut rig = CameraRig::new(config);
    rig.attach(&mut scene, Pivots::new(target, rest, camera))?;

    // Walker state: arc position and speed in degrees along the circle
    let (mut arc, mut arc_speed) = (0.0_f32, 0.0_f32);
    let mut facing = Rotator::new(0.0, 90.0, 0.0);

    for frame in 0..SECONDS * 60 {
        let t = frame as f32 * DT;

        let waypoint = ((t / WAYPOINT_SECONDS).floor() + 1.0) * WAYPOINT_ARC;
        arc_speed += boost_retard(waypoint - arc, arc_speed, 40.0, DT) * DT;
        arc += arc_speed * DT;

        let (s, c) = arc.to_radians().sin_cos();
        scene.set_local_position(actor, Vec3::new(c * RADIUS, s * RADIUS, 0.0));
        let path = Rotator::new(0.0, arc + 90.0_f32.copysign(arc_speed), 0.0);
        facing = facing.interp_to(path, DT, 4.0);
        scene.set_local_rotation(actor, facing);

        let mut input = AxisInput::new(DT);
        if t < 3.0 {
            input = input.with_stick(0.3, 0.0).with_distance(0.2);
        } else if t < 4.0 {
            input = input.with_camera(0.5, 0.0);
        }
        rig.apply_input(&input, &mut scene);

        if frame == 4 * 60 {
            rig.store(1, &scene)?;
        }
        if frame == 6 * 60 {
            rig.start_transfer(camrig::INITIAL_PRESET, &scene);
        }

        let out = rig.tick(DT, &mut scene, &pillars);
        low_pass_world_rotation(&mut scene, lamp, camera, 0.05);

        if frame % 30 == 0 {
            let target_pos = scene
                .world_transform(target)
                .map(|tfm| tfm.translation)
                .unwrap_or_default();
            tracing::info!(
                seconds = t,
                distance = (out.camera_world.translation - target_pos).length(),
                blocked = rig.tracer().state().was_hit,
                transferring = rig.is_transferring(),
                walker_arc = arc,
                "camera"
            );
        }
    }

    Ok(())
}
