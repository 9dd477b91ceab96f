//! Preset poses and eased transfers between them

use camrig_math::{ease_in_out, nearest_equivalent, Interpolate, Rotator};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Exponent of the ease-in-out curve used for transfers
const TRANSFER_EASE: f32 = 2.0;

/// How the target rotation is blended during a transfer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationBlend {
    /// Shortest-arc quaternion interpolation
    #[default]
    Spherical,
    /// Per-axis interpolation of the raw angles
    Linear,
}

impl RotationBlend {
    pub fn blend(self, from: Rotator, to: Rotator, alpha: f32) -> Rotator {
        match self {
            RotationBlend::Spherical => from.slerp(to, alpha),
            RotationBlend::Linear => from.lerp(to, alpha),
        }
    }
}

/// A stored stick pose
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresetEntry {
    /// Stick length
    pub distance: f32,
    /// Target rotation relative to its parent
    pub rotation: Rotator,
}

/// Index-keyed preset poses; storing under an existing index overwrites it
#[derive(Clone, Debug, Default)]
pub struct PresetStore {
    entries: FxHashMap<i32, PresetEntry>,
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, index: i32, entry: PresetEntry) {
        self.entries.insert(index, entry);
    }

    pub fn get(&self, index: i32) -> Option<&PresetEntry> {
        self.entries.get(&index)
    }

    pub fn contains(&self, index: i32) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn remove(&mut self, index: i32) -> Option<PresetEntry> {
        self.entries.remove(&index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &PresetEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// A transfer in flight
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionState {
    pub elapsed: f32,
    pub duration: f32,
    pub start_distance: f32,
    pub end_distance: f32,
    pub start_rotation: Rotator,
    /// End rotation with its yaw moved next to the start yaw
    pub end_rotation: Rotator,
    /// End rotation exactly as stored; the transfer snaps to it
    pub stored_rotation: Rotator,
}

/// Pose produced by one [`PresetTransitionController::advance`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransferStep {
    /// Still blending
    InFlight { distance: f32, rotation: Rotator },
    /// Reached the stored pose; the transfer is over
    Finished { distance: f32, rotation: Rotator },
}

/// Stores presets and eases the stick between them
#[derive(Clone, Debug, Default)]
pub struct PresetTransitionController {
    presets: PresetStore,
    active: Option<TransitionState>,
}

impl PresetTransitionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetStore {
        &mut self.presets
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> Option<&TransitionState> {
        self.active.as_ref()
    }

    /// Drop the transfer in flight, leaving the stick where it is
    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn store(&mut self, index: i32, distance: f32, rotation: Rotator) {
        self.presets.store(index, PresetEntry { distance, rotation });
    }

    /// Begin a transfer from the current pose to preset `index`.
    ///
    /// Returns `false` without changing anything when no preset is stored
    /// under `index`. A transfer already in flight is replaced.
    pub fn start_transfer(&mut self, index: i32, distance: f32, rotation: Rotator, duration: f32) -> bool {
        let Some(entry) = self.presets.get(index) else {
            return false;
        };

        let mut end_rotation = entry.rotation;
        end_rotation.yaw = nearest_equivalent(rotation.yaw, entry.rotation.yaw);

        self.active = Some(TransitionState {
            elapsed: 0.0,
            duration,
            start_distance: distance,
            end_distance: entry.distance,
            start_rotation: rotation,
            end_rotation,
            stored_rotation: entry.rotation,
        });
        true
    }

    /// Advance the transfer by `dt`; `None` when no transfer is active
    pub fn advance(&mut self, dt: f32, blend: RotationBlend) -> Option<TransferStep> {
        let state = self.active.as_mut()?;
        state.elapsed += dt;

        if state.elapsed < state.duration {
            let alpha = ease_in_out(state.elapsed / state.duration, TRANSFER_EASE);
            Some(TransferStep::InFlight {
                distance: Interpolate::lerp(&state.start_distance, &state.end_distance, alpha),
                rotation: blend.blend(state.start_rotation, state.end_rotation, alpha),
            })
        } else {
            let step = TransferStep::Finished {
                distance: state.end_distance,
                rotation: state.stored_rotation,
            };
            self.active = None;
            Some(step)
        }
    }
}
