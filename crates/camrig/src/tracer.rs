//! Line-of-sight correction
//!
//! Every `interval` seconds a sphere is swept from the target to where the
//! spring wants the camera. A blocking hit pulls the camera toward the hit
//! point along the sight line. Between probes the last hit is re-projected
//! onto the current sight line instead of probing again, which can drift when
//! the sight line swings sharply between probes.

use crate::config::TraceSettings;
use crate::probe::{ObstacleProbe, ProbeRequest};
use crate::scene::NodeId;
use camrig_math::{low_pass, Transform, Vec3};

/// Sight lines shorter than this have no usable direction
const MIN_SIGHT_LINE: f32 = 1e-6;

/// Tracer state carried between frames; vectors are in the rest point frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TraceState {
    /// Seconds until the next probe
    pub hit_timer: f32,
    pub was_hit: bool,
    /// Last hit point, measured from the target
    pub delta_to_hit: Vec3,
    /// Camera travel along the sight line, measured from the spring offset
    pub delta_to_fake: Vec3,
    /// Filtered per-frame travel along the sight line
    pub step_to_hit: Vec3,
}

/// Where the pivots are this frame
#[derive(Clone, Copy, Debug)]
pub struct TraceFrame<'a> {
    /// Target world position, the start of every probe
    pub target_world: Vec3,
    /// Rest point world transform
    pub rest_world: &'a Transform,
    /// Rest point position relative to the target
    pub rest_local: Vec3,
}

/// Pulls the camera in front of obstacles between it and the target
#[derive(Clone, Debug, Default)]
pub struct ObstacleTracer {
    state: TraceState,
}

impl ObstacleTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = TraceState::default();
    }

    pub fn state(&self) -> &TraceState {
        &self.state
    }

    /// Correct the spring offset `fake` for obstacles.
    ///
    /// Returns `fake` unchanged, without touching any state, when tracing is
    /// disabled, `dt` is not a positive finite number, or the sight line from
    /// the target to `fake` has zero length.
    pub fn apply<P: ObstacleProbe + ?Sized>(
        &mut self,
        dt: f32,
        fake: Vec3,
        frame: &TraceFrame<'_>,
        settings: &TraceSettings,
        ignore: &[NodeId],
        probe: &P,
    ) -> Vec3 {
        if !settings.enabled() || !(dt > 0.0 && dt.is_finite()) {
            return fake;
        }

        // Rest point rotation relative to the target is always zero, so the
        // sight line can be built in the rest point frame directly
        let target_to_fake = fake + frame.rest_local;
        if target_to_fake.is_nearly_zero(MIN_SIGHT_LINE) {
            return fake;
        }

        let s = &mut self.state;
        let hit_shift;

        if s.hit_timer > 0.0 {
            s.hit_timer -= dt;

            hit_shift = if s.was_hit {
                s.delta_to_hit = s.delta_to_hit.project_onto(target_to_fake);
                s.delta_to_hit - frame.rest_local
            } else {
                fake
            };
        } else {
            s.hit_timer = settings.interval();

            let request = ProbeRequest {
                from: frame.target_world,
                to: frame.rest_world.transform_position(fake),
                radius: settings.radius(),
                channel: settings.channel(),
                ignore,
            };
            let hit = probe.probe(&request);
            s.was_hit = hit.is_some();

            hit_shift = match hit {
                Some(hit) => {
                    tracing::trace!(location = ?hit.location, distance = hit.distance, "camera probe hit");
                    let shift = frame.rest_world.inverse_transform_position(hit.location);
                    s.delta_to_hit = shift + frame.rest_local;
                    shift
                }
                None => {
                    tracing::trace!("camera probe clear");
                    fake
                }
            };
        }

        s.delta_to_fake = s.delta_to_fake.project_onto(target_to_fake);

        // Camera motion splits into following the spring and sliding along the sight line
        let on_line = fake + s.delta_to_fake;

        let gain = (settings.rate() * dt).min(1.0);
        s.step_to_hit = low_pass((hit_shift - on_line) * gain, s.step_to_hit, settings.alpha());
        s.delta_to_fake += s.step_to_hit;

        on_line + s.step_to_hit
    }
}
