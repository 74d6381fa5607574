use glam::{Mat4, Vec2, Vec3};

/// Look-at camera.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

/// Perspective projection parameters, field of view in degrees.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self, resolution: Vec2, projection: &Projection) -> Mat4 {
        let aspect = resolution.x / resolution.y.max(1.0);
        projection.matrix(aspect) * self.view_matrix()
    }
}

/// Movement keys held during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl Movement {
    pub fn is_idle(&self) -> bool {
        *self == Movement::default()
    }
}

const INITIAL_YAW: f32 = -90.0;
const PITCH_LIMIT: f32 = 89.0;

/// First-person camera steered by yaw and pitch in degrees.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub look: Vec3,
    pub up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    reset_position: Vec3,
}

impl FlyCamera {
    pub fn new(position: Vec3, reset_position: Vec3, speed: f32, sensitivity: f32) -> Self {
        // Yaw -90 looks down -Z, at the back of the scene
        Self {
            position,
            look: Vec3::NEG_Z,
            up: Vec3::Y,
            yaw: INITIAL_YAW,
            pitch: 0.0,
            speed,
            sensitivity,
            reset_position,
        }
    }

    pub fn camera(&self) -> Camera {
        Camera {
            eye: self.position,
            target: self.position + self.look,
            up: self.up,
        }
    }

    /// Mouse motion in pixels; moving the mouse up looks up.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.sensitivity;
        self.pitch = (self.pitch - delta_y * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.look = look_vector(self.yaw, self.pitch);
    }

    pub fn right(&self) -> Vec3 {
        self.look.cross(self.up).normalize()
    }

    pub fn translate(&mut self, movement: Movement, delta_time: f32) {
        if movement.is_idle() {
            return;
        }

        let step = self.speed * delta_time;
        let right = self.right();

        if movement.forward {
            self.position += self.look * step;
        }
        if movement.back {
            self.position -= self.look * step;
        }
        if movement.right {
            self.position += right * step;
        }
        if movement.left {
            self.position -= right * step;
        }
    }

    pub fn reset(&mut self) {
        self.position = self.reset_position;
        self.look = Vec3::NEG_Z;
        self.yaw = INITIAL_YAW;
        self.pitch = 0.0;
    }
}

fn look_vector(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> FlyCamera {
        FlyCamera::new(
            Vec3::new(100.0, 50.0, 100.0),
            Vec3::new(150.0, 50.0, 150.0),
            10.0,
            0.1,
        )
    }

    #[test]
    fn initial_yaw_matches_initial_look() {
        assert!(look_vector(INITIAL_YAW, 0.0).abs_diff_eq(Vec3::NEG_Z, 1e-6));

        let mut camera = camera();
        camera.rotate(0.0, 0.0);
        assert!(camera.look.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = camera();
        camera.rotate(0.0, -10_000.0);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        assert!(camera.look.y > 0.99);

        camera.rotate(0.0, 20_000.0);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
        assert!(camera.look.y < -0.99);
    }

    #[test]
    fn turning_right_looks_along_positive_x() {
        let mut camera = camera();
        // 900 px at 0.1 deg/px is a quarter turn
        camera.rotate(900.0, 0.0);
        assert!(camera.look.abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn movement_scales_with_delta_time() {
        let mut camera = camera();
        let forward = Movement {
            forward: true,
            ..Default::default()
        };

        camera.translate(forward, 0.5);
        assert!(camera.position.abs_diff_eq(Vec3::new(100.0, 50.0, 95.0), 1e-5));

        camera.translate(forward, 0.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(100.0, 50.0, 95.0), 1e-5));
    }

    #[test]
    fn idle_movement_keeps_position() {
        let mut camera = camera();
        camera.translate(Movement::default(), 10.0);
        assert_eq!(camera.position, Vec3::new(100.0, 50.0, 100.0));
    }

    #[test]
    fn strafing_is_perpendicular_to_look() {
        let mut camera = camera();
        camera.translate(
            Movement {
                right: true,
                ..Default::default()
            },
            1.0,
        );
        assert!(camera.position.abs_diff_eq(Vec3::new(110.0, 50.0, 100.0), 1e-5));

        camera.translate(
            Movement {
                left: true,
                back: true,
                ..Default::default()
            },
            1.0,
        );
        assert!(camera.position.abs_diff_eq(Vec3::new(100.0, 50.0, 110.0), 1e-5));
    }

    #[test]
    fn reset_restores_position_and_look() {
        let mut camera = camera();
        camera.rotate(123.0, 45.0);
        camera.translate(
            Movement {
                forward: true,
                ..Default::default()
            },
            3.0,
        );

        camera.reset();
        assert_eq!(camera.position, Vec3::new(150.0, 50.0, 150.0));
        assert_eq!(camera.look, Vec3::NEG_Z);
        assert_eq!(camera.yaw, INITIAL_YAW);
        assert_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera {
            eye: Vec3::new(-278.0, 273.0, 800.0),
            target: Vec3::new(-278.0, 273.0, 0.0),
            up: Vec3::Y,
        };
        let projection = Projection {
            fov_degrees: 45.0,
            near: 600.0,
            far: 1500.0,
        };
        let vp = camera.view_projection(Vec2::new(1024.0, 768.0), &projection);

        let clip = vp * Vec3::new(-278.0, 273.0, 0.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
