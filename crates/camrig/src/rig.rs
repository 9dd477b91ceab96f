//! Camera rig
//!
//! [`CameraRig`] owns every piece of filter state and drives one frame in a
//! fixed order: preset transfer, spring, obstacle trace, look-at. The scene
//! graph and obstacle probe are passed in on each call, so the rig holds no
//! references into the host.

use crate::config::RigConfig;
use crate::error::{Result, RigError};
use crate::input::AxisInput;
use crate::orientation::{resting_pose, OrientationController};
use crate::probe::{IgnoreSet, ObstacleProbe};
use crate::scene::{AttachRule, AttachRules, NodeId, PivotRole, Pivots, SceneGraph};
use crate::spring::SpringShiftFilter;
use crate::tracer::{ObstacleTracer, TraceFrame};
use crate::transition::{PresetTransitionController, TransferStep};
use camrig_math::{Rotator, Transform, Vec3};

/// Preset index filled with the pose the rig was attached in
pub const INITIAL_PRESET: i32 = 0;

/// Camera placement produced by a tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigOutput {
    /// Camera offset from the rest point
    pub camera_local: Vec3,
    /// Camera rotation relative to the rest point
    pub camera_rotation: Rotator,
    pub camera_world: Transform,
}

/// Local placements the rig reads every frame
struct Pose {
    target_rotation: Rotator,
    rest_local: Vec3,
}

impl Pose {
    fn distance(&self) -> f32 {
        -self.rest_local.x
    }
}

/// Third-person camera stick
///
/// # Example
///
/// ```
/// use camrig::{CameraRig, NoObstacles, Pivots, RigConfig, TransformTree};
/// use camrig_math::Vec3;
///
/// let mut scene = TransformTree::new();
/// let target = scene.spawn(Vec3::ZERO);
/// let rest = scene.spawn(Vec3::new(-400.0, 0.0, 150.0));
/// let camera = scene.spawn(Vec3::ZERO);
///
/// let mut rig = CameraRig::new(RigConfig::default());
/// rig.attach(&mut scene, Pivots::new(target, rest, camera)).unwrap();
///
/// let out = rig.tick(1.0 / 60.0, &mut scene, &NoObstacles);
/// assert!(out.camera_world.translation.length() > 100.0);
/// ```
#[derive(Clone, Debug)]
pub struct CameraRig {
    config: RigConfig,
    pivots: Option<Pivots>,
    spring: SpringShiftFilter,
    tracer: ObstacleTracer,
    orientation: OrientationController,
    transfer: PresetTransitionController,
    ignore: IgnoreSet,
    last_output: RigOutput,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(RigConfig::default())
    }
}

impl CameraRig {
    pub fn new(config: RigConfig) -> Self {
        Self {
            config,
            pivots: None,
            spring: SpringShiftFilter::default(),
            tracer: ObstacleTracer::default(),
            orientation: OrientationController::default(),
            transfer: PresetTransitionController::default(),
            ignore: IgnoreSet::new(),
            last_output: RigOutput::default(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    /// Mutable access for the clamping setters
    pub fn config_mut(&mut self) -> &mut RigConfig {
        &mut self.config
    }

    /// Replace the configuration after validating it
    pub fn set_config(&mut self, config: RigConfig) -> Result<()> {
        self.config = config.validate()?;
        Ok(())
    }

    /// Set the allowed stick length; `min` is floored at zero, `max` raised to `min`
    pub fn set_range(&mut self, min: f32, max: f32) {
        self.config.movement.set_range(min, max);
    }

    /// Nodes the obstacle probe passes through
    pub fn ignore(&self) -> &[NodeId] {
        &self.ignore
    }

    pub fn ignore_mut(&mut self) -> &mut IgnoreSet {
        &mut self.ignore
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn pivots(&self) -> Option<Pivots> {
        self.pivots
    }

    pub fn is_attached(&self) -> bool {
        self.pivots.is_some()
    }

    pub fn is_transferring(&self) -> bool {
        self.transfer.is_active()
    }

    pub fn orientation(&self) -> &OrientationController {
        &self.orientation
    }

    pub fn spring(&self) -> &SpringShiftFilter {
        &self.spring
    }

    pub fn tracer(&self) -> &ObstacleTracer {
        &self.tracer
    }

    pub fn transfer(&self) -> &PresetTransitionController {
        &self.transfer
    }

    /// Output of the most recent successful tick
    pub fn last_output(&self) -> RigOutput {
        self.last_output
    }

    /// Current stick length, if attached
    pub fn distance<S: SceneGraph + ?Sized>(&self, scene: &S) -> Option<f32> {
        let pivots = self.pivots?;
        Some(read_pose(scene, &pivots)?.distance())
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Attach the rig to its pivots and settle the initial pose.
    ///
    /// The rest point becomes a child of the target and the camera a child of
    /// the rest point. The rest point is then moved onto the target's -X axis
    /// at least `zenith_limit` from the vertical, the target turned to face
    /// it, pitch limits derived, and the pose stored as preset
    /// [`INITIAL_PRESET`].
    ///
    /// On error the rig stays detached and [`tick`](Self::tick) does nothing.
    pub fn attach<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, pivots: Pivots) -> Result<()> {
        self.pivots = None;

        if let Err(err) = validate_pivots(scene, &pivots) {
            tracing::warn!(%err, "camera rig pivots are not valid; updates disabled");
            return Err(err);
        }

        check_hierarchy(scene, &pivots)?;

        let camera_parent = scene.parent(pivots.camera);
        let snap_rotation = AttachRules::new(AttachRule::KeepRelative, AttachRule::SnapToTarget);
        if !scene.attach(pivots.camera, pivots.rest_point, AttachRules::KEEP_RELATIVE) {
            return Err(attach_failed(PivotRole::Camera, PivotRole::RestPoint));
        }
        if !scene.attach(pivots.rest_point, pivots.target, snap_rotation) {
            match camera_parent {
                Some(parent) => {
                    scene.attach(pivots.camera, parent, AttachRules::KEEP_RELATIVE);
                }
                None => scene.detach(pivots.camera),
            }
            return Err(attach_failed(PivotRole::RestPoint, PivotRole::Target));
        }

        scene.set_local_position(pivots.camera, Vec3::ZERO);
        scene.set_local_rotation(pivots.target, Rotator::ZERO);

        if let Some(owner) = scene.owner(pivots.target) {
            if !self.ignore.contains(&owner) {
                self.ignore.push(owner);
            }
        }

        // Resting location
        let zenith = self.config.spring.zenith_limit();
        let rest_local = scene.local_position(pivots.rest_point).unwrap_or_default();
        let pose = resting_pose(rest_local, zenith);
        scene.set_local_rotation(pivots.target, pose.target_rotation);
        scene.set_local_position(pivots.rest_point, Vec3::new(-pose.distance, 0.0, 0.0));

        self.orientation.reset();
        self.orientation
            .set_rotation_limits(pose.target_rotation, pose.distance, zenith);
        let distance = self.orientation.change_distance(
            0.0,
            0.0,
            pose.distance,
            pose.target_rotation.pitch,
            &self.config.spring,
            &self.config.movement,
        );
        scene.set_local_position(pivots.rest_point, Vec3::new(-distance, 0.0, 0.0));

        self.transfer.cancel();
        self.transfer
            .store(INITIAL_PRESET, distance, pose.target_rotation);

        let rest_world = scene
            .world_transform(pivots.rest_point)
            .unwrap_or_default();
        self.spring.reset(rest_world.translation);
        self.tracer.reset();

        self.pivots = Some(pivots);
        self.refresh_look_at(scene);

        tracing::debug!(distance, rotation = ?pose.target_rotation, "camera rig attached");
        Ok(())
    }

    /// Stop driving the pivots; the scene is left as it is
    pub fn detach(&mut self) {
        self.pivots = None;
        self.transfer.cancel();
    }

    // =========================================================================
    // Frame update
    // =========================================================================

    /// Advance one frame and write the camera placement into `scene`.
    ///
    /// A detached rig, or a `dt` that is not a positive finite number, leaves
    /// everything untouched and returns the previous output.
    pub fn tick<S, P>(&mut self, dt: f32, scene: &mut S, probe: &P) -> RigOutput
    where
        S: SceneGraph + ?Sized,
        P: ObstacleProbe + ?Sized,
    {
        let Some(pivots) = self.live_pivots(scene) else {
            return self.last_output;
        };

        if !(dt > 0.0 && dt.is_finite()) {
            tracing::debug!(dt, "skipping camera rig tick");
            return self.last_output;
        }

        self.advance_transfer(dt, scene, &pivots);

        let (Some(pose), Some(target_world), Some(rest_world)) = (
            read_pose(scene, &pivots),
            scene.world_transform(pivots.target),
            scene.world_transform(pivots.rest_point),
        ) else {
            self.lose_pivots();
            return self.last_output;
        };

        let fake = self.spring.update(dt, &rest_world, &self.config.spring);
        let frame = TraceFrame {
            target_world: target_world.translation,
            rest_world: &rest_world,
            rest_local: pose.rest_local,
        };
        let camera_local = self
            .tracer
            .apply(dt, fake, &frame, &self.config.trace, &self.ignore, probe);
        scene.set_local_position(pivots.camera, camera_local);

        let camera_rotation = self.refresh_look_at(scene).unwrap_or_default();

        self.last_output = RigOutput {
            camera_local,
            camera_rotation,
            camera_world: scene.world_transform(pivots.camera).unwrap_or_default(),
        };
        self.last_output
    }

    /// Route one frame of axis input.
    ///
    /// Distance and orbit input are ignored while a preset transfer runs; the
    /// look offset always responds.
    pub fn apply_input<S: SceneGraph + ?Sized>(&mut self, input: &AxisInput, scene: &mut S) {
        let Some(pivots) = self.live_pivots(scene) else {
            return;
        };

        if !(input.dt >= 0.0 && input.dt.is_finite()) {
            tracing::debug!(dt = input.dt, "ignoring axis input");
            return;
        }

        let input = input.clamped();

        if !self.transfer.is_active() {
            let Some(pose) = read_pose(scene, &pivots) else {
                self.lose_pivots();
                return;
            };

            let distance = self.orientation.change_distance(
                input.distance,
                input.dt,
                pose.distance(),
                pose.target_rotation.pitch,
                &self.config.spring,
                &self.config.movement,
            );
            scene.set_local_position(pivots.rest_point, Vec3::new(-distance, 0.0, 0.0));

            let rotation = self.orientation.rotate_stick(
                input.stick_yaw,
                input.stick_pitch,
                input.dt,
                &self.config.stick,
            );
            scene.set_local_rotation(pivots.target, rotation);
        }

        self.orientation.rotate_look(
            input.camera_yaw,
            input.camera_pitch,
            input.dt,
            &self.config.look,
        );
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Store the current stick pose under `index`, replacing any earlier one
    pub fn store<S: SceneGraph + ?Sized>(&mut self, index: i32, scene: &S) -> Result<()> {
        let pivots = self.pivots.ok_or(RigError::NotAttached)?;
        let pose = read_pose(scene, &pivots).ok_or(RigError::NotAttached)?;

        self.transfer
            .store(index, pose.distance(), pose.target_rotation);
        tracing::debug!(index, distance = pose.distance(), "stored camera preset");
        Ok(())
    }

    /// Start easing toward preset `index`.
    ///
    /// Returns `false` when nothing is stored under `index` or the rig is
    /// detached. A transfer already running restarts from the current pose.
    pub fn start_transfer<S: SceneGraph + ?Sized>(&mut self, index: i32, scene: &S) -> bool {
        let Some(pose) = self.pivots.and_then(|p| read_pose(scene, &p)) else {
            return false;
        };

        let started = self.transfer.start_transfer(
            index,
            pose.distance(),
            pose.target_rotation,
            self.config.transfer_duration(),
        );
        if started {
            tracing::debug!(index, "camera preset transfer started");
        }
        started
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn advance_transfer<S: SceneGraph + ?Sized>(&mut self, dt: f32, scene: &mut S, pivots: &Pivots) {
        let Some(step) = self.transfer.advance(dt, self.config.transfer_blend) else {
            return;
        };

        match step {
            TransferStep::InFlight { distance, rotation } => {
                scene.set_local_rotation(pivots.target, rotation);
                scene.set_local_position(pivots.rest_point, Vec3::new(-distance, 0.0, 0.0));
            }
            TransferStep::Finished { distance, rotation } => {
                scene.set_local_rotation(pivots.target, rotation);
                scene.set_local_position(pivots.rest_point, Vec3::new(-distance, 0.0, 0.0));

                self.orientation.set_rotation_limits(
                    rotation,
                    distance,
                    self.config.spring.zenith_limit(),
                );
                self.orientation.reset_stick();
                tracing::debug!(distance, ?rotation, "camera preset transfer finished");
            }
        }
    }

    /// Point the camera at the target and return its relative rotation
    fn refresh_look_at<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Option<Rotator> {
        let pivots = self.pivots?;
        let pose = read_pose(scene, &pivots)?;
        let camera_local = scene.local_position(pivots.camera)?;

        let rotation = self
            .orientation
            .look_at(pose.target_rotation, camera_local, pose.rest_local);
        scene.set_local_rotation(pivots.camera, rotation);
        Some(rotation)
    }

    /// Pivots of an attached rig, detaching if any of them has gone away
    fn live_pivots<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> Option<Pivots> {
        let pivots = self.pivots?;
        if pivots.iter().all(|(_, node)| scene.is_valid(node)) {
            Some(pivots)
        } else {
            self.lose_pivots();
            None
        }
    }

    fn lose_pivots(&mut self) {
        tracing::warn!("camera rig lost one of its pivots; updates disabled");
        self.detach();
    }
}

fn read_pose<S: SceneGraph + ?Sized>(scene: &S, pivots: &Pivots) -> Option<Pose> {
    Some(Pose {
        target_rotation: scene.local_rotation(pivots.target)?,
        rest_local: scene.local_position(pivots.rest_point)?,
    })
}

fn attach_failed(child: PivotRole, parent: PivotRole) -> RigError {
    let err = RigError::Attach { child, parent };
    tracing::warn!(%err, "camera rig pivots could not be parented; updates disabled");
    err
}

/// The camera goes under the rest point and the rest point under the target,
/// so neither the rest point nor the target may already sit below a node
/// that will become its descendant
fn check_hierarchy<S: SceneGraph + ?Sized>(scene: &S, pivots: &Pivots) -> Result<()> {
    if scene.is_ancestor(pivots.camera, pivots.rest_point) {
        return Err(attach_failed(PivotRole::Camera, PivotRole::RestPoint));
    }
    if scene.is_ancestor(pivots.rest_point, pivots.target)
        || scene.is_ancestor(pivots.camera, pivots.target)
    {
        return Err(attach_failed(PivotRole::RestPoint, PivotRole::Target));
    }
    Ok(())
}

/// Every pivot must exist and all three must be different nodes
fn validate_pivots<S: SceneGraph + ?Sized>(scene: &S, pivots: &Pivots) -> Result<()> {
    for (role, node) in pivots.iter() {
        if !scene.is_valid(node) {
            return Err(RigError::MissingPivot { role });
        }
    }

    let roles: Vec<_> = pivots.iter().collect();
    for (i, &(first, a)) in roles.iter().enumerate() {
        for &(second, b) in &roles[i + 1..] {
            if a == b {
                return Err(RigError::DuplicatePivot {
                    first,
                    second,
                    node: a,
                });
            }
        }
    }

    Ok(())
}
