use cgmath::*;

use super::CameraUniform;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Camera circling a target at a fixed distance
///
/// `pitch` lifts the eye above the XZ plane; `yaw` turns it about the Y axis.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // computed by update()
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.update();
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        let min = self.bounds.min_distance.unwrap_or(f32::EPSILON);
        let max = self.bounds.max_distance.unwrap_or(f32::MAX);
        self.distance = distance.clamp(min, max);
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance + delta);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        );
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.build_view_projection_matrix().into(),
            view_position: self.eye.extend(1.0).into(),
        }
    }

    /// Recomputes `eye` after `distance`, `pitch` or `yaw` changed
    fn update(&mut self) {
        self.eye = Vector3::new(
            self.distance * self.yaw.sin() * self.pitch.cos(),
            self.distance * self.pitch.sin(),
            self.distance * self.yaw.cos() * self.pitch.cos(),
        ) + self.target;
    }
}

impl Default for OrbitCamera {
    /// Looks down on the solar system from far enough to frame both planets
    fn default() -> Self {
        Self::new(50.0, 0.5, 0.0, Vector3::zero(), 16.0 / 9.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(1.0),
            max_distance: Some(500.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + f32::EPSILON,
            max_pitch: std::f32::consts::FRAC_PI_2 - f32::EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_on_orbit() {
        let camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        assert!((camera.eye - Vector3::new(0.0, 0.0, 10.0)).magnitude() < 1e-5);

        let mut camera = camera;
        camera.set_yaw(std::f32::consts::FRAC_PI_2);
        assert!((camera.eye - Vector3::new(10.0, 0.0, 0.0)).magnitude() < 1e-4);
        assert!((camera.eye.magnitude() - camera.distance).abs() < 1e-4);
    }

    #[test]
    fn test_bounds_clamp() {
        let mut camera = OrbitCamera::default();
        camera.set_distance(10_000.0);
        assert_eq!(camera.distance, 500.0);
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_uniform_carries_eye() {
        let camera = OrbitCamera::new(20.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let uniform = camera.uniform();
        assert_eq!(uniform.view_position[3], 1.0);
        assert!((uniform.view_position[2] - 20.0).abs() < 1e-4);
        // The target sits in front of the camera, inside the clip volume
        let clip = camera.build_view_projection_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }
}
