//! Obstacle probe port
//!
//! The tracer asks "does a sphere swept from the target to the camera hit
//! anything?" through [`ObstacleProbe`]. Hosts plug their physics engine in;
//! [`SphereField`] is an analytic implementation over static spheres.

use crate::scene::NodeId;
use camrig_math::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Bit set of trace channels an obstacle blocks or a probe runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceChannel(pub u32);

impl TraceChannel {
    /// Blocks sight lines
    pub const VISIBILITY: TraceChannel = TraceChannel(1);
    /// Blocks cameras only
    pub const CAMERA: TraceChannel = TraceChannel(2);
    pub const ALL: TraceChannel = TraceChannel(u32::MAX);
    pub const NONE: TraceChannel = TraceChannel(0);

    /// Game-defined channel `n` (0..30), above the built-in ones
    pub const fn custom(n: u32) -> TraceChannel {
        TraceChannel(1 << (2 + n % 30))
    }

    pub const fn intersects(self, other: TraceChannel) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for TraceChannel {
    fn default() -> Self {
        Self::VISIBILITY
    }
}

impl std::ops::BitOr for TraceChannel {
    type Output = TraceChannel;

    fn bitor(self, rhs: TraceChannel) -> TraceChannel {
        TraceChannel(self.0 | rhs.0)
    }
}

/// Nodes a probe must pass through
pub type IgnoreSet = SmallVec<[NodeId; 4]>;

/// A single swept-sphere query
#[derive(Clone, Debug)]
pub struct ProbeRequest<'a> {
    /// Sweep start in world space
    pub from: Vec3,
    /// Sweep end in world space
    pub to: Vec3,
    pub radius: f32,
    pub channel: TraceChannel,
    pub ignore: &'a [NodeId],
}

impl ProbeRequest<'_> {
    pub fn is_ignored(&self, node: NodeId) -> bool {
        self.ignore.contains(&node)
    }
}

/// First blocking hit of a probe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeHit {
    /// Centre of the swept sphere at the moment of contact, world space
    pub location: Vec3,
    /// Distance travelled from `from` to `location`
    pub distance: f32,
    /// Node owning the obstacle, if any
    pub node: Option<NodeId>,
}

/// Synchronous obstacle query service
pub trait ObstacleProbe {
    /// Sweep a sphere along the request and return the first blocking hit
    fn probe(&self, request: &ProbeRequest<'_>) -> Option<ProbeHit>;
}

impl<P: ObstacleProbe + ?Sized> ObstacleProbe for &P {
    fn probe(&self, request: &ProbeRequest<'_>) -> Option<ProbeHit> {
        (**self).probe(request)
    }
}

/// Probe that never hits anything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoObstacles;

impl ObstacleProbe for NoObstacles {
    fn probe(&self, _request: &ProbeRequest<'_>) -> Option<ProbeHit> {
        None
    }
}

/// Static spherical obstacle
#[derive(Clone, Debug)]
pub struct SphereObstacle {
    pub center: Vec3,
    pub radius: f32,
    /// Channels this obstacle blocks
    pub channels: TraceChannel,
    /// Owning node, matched against the ignore set
    pub node: Option<NodeId>,
}

impl SphereObstacle {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            channels: TraceChannel::VISIBILITY,
            node: None,
        }
    }

    pub fn with_channels(mut self, channels: TraceChannel) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Fraction of the sweep `from + t * (to - from)` at which a sphere of
    /// `radius` first touches this obstacle, if it does within `[0, 1]`
    fn time_of_impact(&self, from: Vec3, to: Vec3, radius: f32) -> Option<f32> {
        let reach = self.radius + radius;
        let offset = from - self.center;
        let c = offset.length_squared() - reach * reach;

        // Already overlapping at the start
        if c <= 0.0 {
            return Some(0.0);
        }

        let d = to - from;
        let a = d.length_squared();
        if a <= f32::EPSILON {
            return None;
        }

        let b = offset.dot(d);
        if b >= 0.0 {
            return None;
        }

        let disc = b * b - a * c;
        if disc < 0.0 {
            return None;
        }

        let t = (-b - disc.sqrt()) / a;
        (0.0..=1.0).contains(&t).then_some(t)
    }
}

/// Analytic probe over a set of static spheres
#[derive(Clone, Debug, Default)]
pub struct SphereField {
    obstacles: Vec<SphereObstacle>,
}

impl SphereField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obstacle: SphereObstacle) -> usize {
        self.obstacles.push(obstacle);
        self.obstacles.len() - 1
    }

    pub fn with(mut self, obstacle: SphereObstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn obstacles(&self) -> &[SphereObstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [SphereObstacle] {
        &mut self.obstacles
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }
}

impl ObstacleProbe for SphereField {
    fn probe(&self, request: &ProbeRequest<'_>) -> Option<ProbeHit> {
        let sweep = request.to - request.from;

        self.obstacles
            .iter()
            .filter(|o| o.channels.intersects(request.channel))
            .filter(|o| o.node.map_or(true, |n| !request.is_ignored(n)))
            .filter_map(|o| {
                o.time_of_impact(request.from, request.to, request.radius)
                    .map(|t| (t, o))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, o)| ProbeHit {
                location: request.from + sweep * t,
                distance: sweep.length() * t,
                node: o.node,
            })
    }
}
