//! Axis input for the camera stick

/// One frame of axis input
///
/// Every axis is expected in `[-1, 1]`; [`CameraRig::apply_input`](crate::CameraRig::apply_input)
/// clamps them. `dt` is the frame time in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisInput {
    /// Stick length (positive = move closer)
    pub distance: f32,
    /// Orbit around the target's vertical axis
    pub stick_yaw: f32,
    /// Orbit up or down
    pub stick_pitch: f32,
    /// Turn the camera away from the target horizontally
    pub camera_yaw: f32,
    /// Turn the camera away from the target vertically
    pub camera_pitch: f32,
    pub dt: f32,
}

impl AxisInput {
    /// Create empty input for a frame of `dt` seconds
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_stick(mut self, yaw: f32, pitch: f32) -> Self {
        self.stick_yaw = yaw;
        self.stick_pitch = pitch;
        self
    }

    pub fn with_camera(mut self, yaw: f32, pitch: f32) -> Self {
        self.camera_yaw = yaw;
        self.camera_pitch = pitch;
        self
    }

    /// Copy with every axis clamped into `[-1, 1]`; NaN axes become zero
    pub fn clamped(&self) -> Self {
        fn axis(v: f32) -> f32 {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(-1.0, 1.0)
            }
        }

        Self {
            distance: axis(self.distance),
            stick_yaw: axis(self.stick_yaw),
            stick_pitch: axis(self.stick_pitch),
            camera_yaw: axis(self.camera_yaw),
            camera_pitch: axis(self.camera_pitch),
            dt: self.dt,
        }
    }

    /// Check if any axis is deflected
    pub fn has_input(&self) -> bool {
        self.distance != 0.0
            || self.stick_yaw != 0.0
            || self.stick_pitch != 0.0
            || self.camera_yaw != 0.0
            || self.camera_pitch != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let input = AxisInput::new(0.016).with_distance(0.5).with_stick(-1.0, 0.25).with_camera(0.0, 1.0);
        assert_eq!(input.dt, 0.016);
        assert_eq!(input.distance, 0.5);
        assert_eq!(input.stick_yaw, -1.0);
        assert_eq!(input.camera_pitch, 1.0);
        assert!(input.has_input());
        assert!(!AxisInput::new(0.016).has_input());
    }

    #[test]
    fn test_clamped() {
        let input = AxisInput::new(0.1).with_stick(3.0, f32::NAN).with_camera(-2.0, 0.5).clamped();
        assert_eq!(input.stick_yaw, 1.0);
        assert_eq!(input.stick_pitch, 0.0);
        assert_eq!(input.camera_yaw, -1.0);
        assert_eq!(input.camera_pitch, 0.5);
        assert_eq!(input.dt, 0.1);
    }
}
