//! camrig - third-person camera stick
//!
//! A smoothed, obstacle-aware camera that hangs off a moving target.
//!
//! # Features
//!
//! - **Spring Shift**: the camera lags behind accelerations and settles back
//! - **Obstacle Tracing**: periodic swept-sphere probes pull the camera in front of walls
//! - **Orbit & Look**: stick orbit and camera look offset, each permanent or spring-back
//! - **Zenith Guard**: pitch limits keep the camera away from the target's vertical axis
//! - **Presets**: store stick poses and ease between them
//! - **Ports**: scene graph and obstacle probe are traits; [`TransformTree`] and
//!   [`SphereField`] are ready-made implementations
//!
//! # Frame order
//!
//! [`CameraRig::tick`] runs preset transfer, spring, obstacle trace and
//! look-at, in that order. [`CameraRig::apply_input`] is called separately
//! with the frame's [`AxisInput`].

pub mod config;
pub mod error;
pub mod input;
pub mod orientation;
pub mod probe;
pub mod rig;
pub mod scene;
pub mod spring;
pub mod tracer;
pub mod transition;

pub use config::{LookSettings, MoveSettings, OrbitSettings, RigConfig, SpringSettings, TraceSettings};
pub use error::{ConfigError, Result, RigError};
pub use input::AxisInput;
pub use orientation::{OrbitState, OrientationController};
pub use probe::{
    IgnoreSet, NoObstacles, ObstacleProbe, ProbeHit, ProbeRequest, SphereField, SphereObstacle,
    TraceChannel,
};
pub use rig::{CameraRig, RigOutput, INITIAL_PRESET};
pub use scene::{
    low_pass_world_rotation, AttachRule, AttachRules, NodeId, PivotRole, Pivots, SceneGraph, SceneNode,
    TransformTree,
};
pub use spring::{SpringShiftFilter, SpringState};
pub use tracer::{ObstacleTracer, TraceFrame, TraceState};
pub use transition::{
    PresetEntry, PresetStore, PresetTransitionController, RotationBlend, TransferStep,
    TransitionState,
};
