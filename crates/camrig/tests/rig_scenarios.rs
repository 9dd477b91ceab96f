//! End-to-end scenarios driving a rig over an in-memory scene

use camrig::{
    AttachRules, AxisInput, CameraRig, NoObstacles, NodeId, ObstacleProbe, Pivots, RigConfig,
    SceneGraph, SphereField, SphereObstacle, TransformTree,
};
use camrig_math::angle::deg_acos;
use camrig_math::{Rotator, Vec3};

const DT: f32 = 1.0 / 60.0;

struct World {
    scene: TransformTree,
    actor: NodeId,
    pivots: Pivots,
}

impl World {
    /// Actor at the origin carrying a target 100 up and a rest point behind it
    fn new(rest: Vec3) -> Self {
        let mut scene = TransformTree::new();
        let actor = scene.spawn_named("actor", Vec3::ZERO);
        let target = scene.spawn_named("target", Vec3::new(0.0, 0.0, 100.0));
        scene.attach(target, actor, AttachRules::KEEP_RELATIVE);
        let rest_point = scene.spawn_named("rest", rest);
        let camera = scene.spawn_named("camera", Vec3::ZERO);

        Self {
            scene,
            actor,
            pivots: Pivots::new(target, rest_point, camera),
        }
    }

    fn rig(&mut self, config: RigConfig) -> CameraRig {
        let mut rig = CameraRig::new(config);
        rig.attach(&mut self.scene, self.pivots).unwrap();
        rig
    }

    fn camera_to_target(&self) -> f32 {
        let camera = self.scene.world_transform(self.pivots.camera).unwrap();
        let target = self.scene.world_transform(self.pivots.target).unwrap();
        (camera.translation - target.translation).length()
    }

    fn run<P: ObstacleProbe>(&mut self, rig: &mut CameraRig, frames: usize, probe: &P) {
        for _ in 0..frames {
            rig.tick(DT, &mut self.scene, probe);
        }
    }
}

#[test]
fn test_camera_lags_then_settles() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());

    let mut x = 0.0;
    let mut out = rig.last_output();
    for _ in 0..30 {
        x += 5.0;
        world.scene.set_local_position(world.actor, Vec3::new(x, 0.0, 0.0));
        out = rig.tick(DT, &mut world.scene, &NoObstacles);
    }
    assert!(out.camera_local.x < 0.0, "camera should trail the target: {out:?}");

    world.run(&mut rig, 6000, &NoObstacles);
    let out = rig.last_output();
    assert!(out.camera_local.length() < 1e-2, "{out:?}");
    assert!((world.camera_to_target() - 500.0).abs() < 0.1);
}

#[test]
fn test_wall_pulls_camera_in() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());
    let wall = SphereField::new().with(SphereObstacle::new(Vec3::new(-300.0, 0.0, 100.0), 30.0));

    world.run(&mut rig, 300, &wall);

    // Probe sphere of radius 20 stops 50 short of the obstacle centre
    let distance = world.camera_to_target();
    assert!((distance - 250.0).abs() < 2.0, "camera at {distance}");
    assert!(rig.tracer().state().was_hit);

    // Camera keeps looking at the target while pulled in
    let camera = world.scene.world_transform(world.pivots.camera).unwrap();
    let facing = camera.transform_vector(Vec3::X);
    assert!(facing.max_abs_diff(Vec3::X) < 1e-3, "{facing:?}");
}

#[test]
fn test_wall_clears_and_camera_returns() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());
    let mut field = SphereField::new().with(SphereObstacle::new(Vec3::new(-300.0, 0.0, 100.0), 30.0));

    world.run(&mut rig, 300, &field);
    assert!(world.camera_to_target() < 300.0);

    field.clear();
    world.run(&mut rig, 600, &field);
    assert!((world.camera_to_target() - 500.0).abs() < 1.0);
}

#[test]
fn test_owner_never_blocks() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());
    let body = SphereField::new()
        .with(SphereObstacle::new(Vec3::new(-300.0, 0.0, 100.0), 30.0).with_node(world.actor));

    world.run(&mut rig, 300, &body);
    assert!((world.camera_to_target() - 500.0).abs() < 1e-2);
    assert!(!rig.tracer().state().was_hit);
}

#[test]
fn test_host_can_extend_ignore_set() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());
    let prop = world.scene.spawn_named("prop", Vec3::new(-300.0, 0.0, 100.0));
    rig.ignore_mut().push(prop);

    let field = SphereField::new().with(SphereObstacle::new(Vec3::new(-300.0, 0.0, 100.0), 30.0).with_node(prop));
    world.run(&mut rig, 300, &field);
    assert!((world.camera_to_target() - 500.0).abs() < 1e-2);
}

#[test]
fn test_disabled_tracing_follows_spring() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut config = RigConfig::default();
    config.trace.set_enabled(false);
    let mut rig = world.rig(config);
    let wall = SphereField::new().with(SphereObstacle::new(Vec3::new(-300.0, 0.0, 100.0), 30.0));

    for i in 0..120 {
        world.scene.set_local_position(world.actor, Vec3::new(0.0, i as f32 * 4.0, 0.0));
        let out = rig.tick(DT, &mut world.scene, &wall);
        assert_eq!(out.camera_local, rig.spring().fake_offset());
    }
}

#[test]
fn test_preset_round_trip() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());
    rig.store(1, &world.scene).unwrap();

    // Half a second closer, one second of orbit
    for frame in 0..60 {
        let distance = if frame < 30 { 1.0 } else { 0.0 };
        let input = AxisInput::new(DT).with_distance(distance).with_stick(1.0, 0.0);
        rig.apply_input(&input, &mut world.scene);
        rig.tick(DT, &mut world.scene, &NoObstacles);
    }
    assert!((rig.distance(&world.scene).unwrap() - 350.0).abs() < 1e-2);
    assert!((rig.orientation().state().yaw - 90.0).abs() < 1e-2);

    assert!(rig.start_transfer(1, &world.scene));
    let mut frames = 0;
    while rig.is_transferring() {
        // Orbit and distance input are ignored while the transfer runs
        let input = AxisInput::new(DT).with_distance(1.0).with_stick(0.0, 1.0);
        rig.apply_input(&input, &mut world.scene);
        rig.tick(DT, &mut world.scene, &NoObstacles);

        frames += 1;
        assert!(frames <= 61, "transfer should finish after one second");
    }

    assert!(!rig.is_transferring());
    assert_eq!(world.scene.local_rotation(world.pivots.target), Some(Rotator::ZERO));
    assert_eq!(world.scene.local_position(world.pivots.rest_point), Some(Vec3::new(-500.0, 0.0, 0.0)));
    assert_eq!(rig.orientation().state().yaw, 0.0);
    assert_eq!(rig.orientation().state().pitch, 0.0);
    assert!((rig.orientation().state().pitch_limit - deg_acos(20.0 / 500.0)).abs() < 1e-4);
}

#[test]
fn test_transfer_midway_is_between_poses() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());

    for _ in 0..30 {
        rig.apply_input(&AxisInput::new(DT).with_distance(-1.0), &mut world.scene);
    }
    assert!((rig.distance(&world.scene).unwrap() - 650.0).abs() < 1e-2);

    assert!(rig.start_transfer(camrig::INITIAL_PRESET, &world.scene));
    world.run(&mut rig, 30, &NoObstacles);

    let distance = rig.distance(&world.scene).unwrap();
    assert!(distance > 500.0 && distance < 650.0, "{distance}");
    assert!(rig.is_transferring());
}

#[test]
fn test_restart_transfer_mid_flight() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());

    for _ in 0..60 {
        rig.apply_input(&AxisInput::new(DT).with_distance(1.0), &mut world.scene);
    }
    rig.store(2, &world.scene).unwrap();
    let stored = rig.distance(&world.scene).unwrap();
    assert!((stored - 200.0).abs() < 1e-2);

    assert!(rig.start_transfer(camrig::INITIAL_PRESET, &world.scene));
    world.run(&mut rig, 20, &NoObstacles);
    let midway = rig.distance(&world.scene).unwrap();
    assert!(midway > stored);

    assert!(rig.start_transfer(2, &world.scene));
    let state = rig.transfer().state().unwrap();
    assert_eq!(state.start_distance, midway);
    assert_eq!(state.end_distance, stored);

    world.run(&mut rig, 70, &NoObstacles);
    assert_eq!(rig.distance(&world.scene), Some(stored));
}

#[test]
fn test_json_config_drives_rig() {
    let config = RigConfig::from_json(
        r#"{
            "movement": { "rate": 600.0, "distance_min": 50.0, "distance_max": 800.0 },
            "look": { "permanent": false, "yaw_limit": 30.0 }
        }"#,
    )
    .unwrap();

    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(config);

    for _ in 0..120 {
        let input = AxisInput::new(DT).with_distance(-1.0).with_camera(1.0, 0.0);
        rig.apply_input(&input, &mut world.scene);
        rig.tick(DT, &mut world.scene, &NoObstacles);
    }

    assert_eq!(rig.distance(&world.scene), Some(800.0));
    assert!((rig.orientation().look_offset().yaw - 30.0).abs() < 1e-2);
}

#[test]
fn test_pitch_stays_inside_zenith_limit() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());

    for _ in 0..1200 {
        let input = AxisInput::new(DT).with_stick(0.0, -1.0);
        rig.apply_input(&input, &mut world.scene);
        rig.tick(DT, &mut world.scene, &NoObstacles);
    }

    let pitch = world.scene.local_rotation(world.pivots.target).unwrap().pitch;
    let limit = deg_acos(20.0 / 500.0);
    assert!((pitch + limit).abs() < 1e-3, "pitch {pitch} limit {limit}");

    // Camera stays at least the zenith limit away from the vertical through the target
    let camera = world.scene.world_transform(world.pivots.camera).unwrap();
    let target = world.scene.world_transform(world.pivots.target).unwrap();
    assert!((camera.translation - target.translation).length_2d() >= 20.0 - 0.05);
}

#[test]
fn test_detached_rig_is_inert() {
    let mut world = World::new(Vec3::new(-500.0, 0.0, 0.0));
    let mut rig = world.rig(RigConfig::default());
    rig.detach();

    let before = world.scene.local_position(world.pivots.rest_point);
    rig.apply_input(&AxisInput::new(DT).with_distance(1.0), &mut world.scene);
    rig.tick(DT, &mut world.scene, &NoObstacles);
    assert_eq!(world.scene.local_position(world.pivots.rest_point), before);
}
