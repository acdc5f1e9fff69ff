use glam::{Mat4, Vec3};

/// Arc-ball camera for the model preview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl Default for ArcBallCamera {
    /// Looking at the fitted model from slightly above, like a product shot.
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.32,
            distance: 3.2,
            target: Vec3::new(0.0, 0.0, 0.0),
            fov: 45.0_f32.to_radians(),
        }
    }
}

impl ArcBallCamera {
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 20.0);
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(self.fov, aspect, 0.05, 100.0);
        proj * view
    }
}
