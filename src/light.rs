use glam::{Mat4, Vec2, Vec3};

use crate::config::{self, CornellConfig, LightConfig, ShadowConfig};

const W500: Vec3 = Vec3::new(0.0, 255.0, 146.0);
const W600: Vec3 = Vec3::new(255.0, 190.0, 0.0);
const W700: Vec3 = Vec3::new(205.0, 0.0, 0.0);

/// Light colour built from three visible wavelengths, weighted and scaled to
/// a bright point source.
pub fn wavelength_intensity() -> Vec3 {
    5.0 * (8.0 * W500 + 15.6 * W600 + 18.4 * W700)
}

/// Point light that also acts as the shadow camera, looking straight down.
#[derive(Debug, Clone)]
pub struct Light {
    pub position: Vec3,
    pub intensity: Vec3,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub exposure: f32,
}

impl Light {
    pub fn new(light: &LightConfig, shadow: &ShadowConfig) -> Self {
        Self {
            position: config::vec3(light.position),
            intensity: wavelength_intensity(),
            up: config::vec3(light.up),
            fov_degrees: shadow.fov_degrees,
            near: shadow.near,
            far: shadow.far,
            exposure: light.exposure,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position - Vec3::Y, self.up)
    }

    pub fn light_space_matrix(&self, aspect: f32) -> Mat4 {
        let projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far);
        projection * self.view_matrix()
    }
}

/// Maps the cursor onto the light's x and y in the Cornell room.
#[derive(Debug, Clone, Copy)]
pub struct CursorMapping {
    pub scale: f32,
    pub origin: Vec2,
}

impl CursorMapping {
    pub fn new(cornell: &CornellConfig) -> Self {
        Self {
            scale: cornell.cursor_scale,
            origin: Vec2::from_array(cornell.cursor_origin),
        }
    }

    /// Returns the light x and y for a cursor position in pixels, or `None`
    /// when the cursor is outside the window.
    pub fn light_xy(&self, cursor: Vec2, window_size: Vec2) -> Option<Vec2> {
        if window_size.x <= 0.0 || window_size.y <= 0.0 {
            return None;
        }
        if cursor.x < 0.0 || cursor.y < 0.0 || cursor.x >= window_size.x || cursor.y > window_size.y {
            return None;
        }

        let normalized = Vec2::new(
            2.0 * cursor.x / window_size.x - 1.0,
            1.0 - 2.0 * cursor.y / window_size.y,
        );

        Some(normalized * self.scale + self.origin)
    }

    pub fn follow_cursor(&self, light: &mut Light, cursor: Vec2, window_size: Vec2) -> bool {
        match self.light_xy(cursor, window_size) {
            Some(xy) => {
                light.position.x = xy.x;
                light.position.y = xy.y;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WonderlandConfig;

    fn light() -> Light {
        let config = WonderlandConfig::default();
        Light::new(&config.light, &config.shadow)
    }

    #[test]
    fn intensity_matches_weighted_wavelengths() {
        let intensity = wavelength_intensity();
        assert!(intensity.abs_diff_eq(Vec3::new(38750.0, 25020.0, 5840.0), 0.01));
    }

    #[test]
    fn point_below_light_is_at_shadow_map_centre() {
        let light = light();
        let below = light.position - Vec3::new(0.0, 150.0, 0.0);

        let clip = light.light_space_matrix(1.0) * below.extend(1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn ground_origin_is_inside_shadow_frustum() {
        let light = light();
        let clip = light.light_space_matrix(1.0) * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn cursor_maps_to_cornell_light_plane() {
        let mapping = CursorMapping::new(&WonderlandConfig::default().cornell);
        let window = Vec2::new(1024.0, 768.0);

        let centre = mapping.light_xy(window * 0.5, window).unwrap();
        assert!(centre.abs_diff_eq(Vec2::new(-278.0, 278.0), 1e-4));

        let top_left = mapping.light_xy(Vec2::ZERO, window).unwrap();
        assert!(top_left.abs_diff_eq(Vec2::new(-528.0, 528.0), 1e-4));

        let bottom_edge = mapping.light_xy(Vec2::new(512.0, 768.0), window).unwrap();
        assert!(bottom_edge.abs_diff_eq(Vec2::new(-278.0, 28.0), 1e-4));
    }

    #[test]
    fn cursor_outside_window_is_ignored() {
        let mapping = CursorMapping::new(&WonderlandConfig::default().cornell);
        let mut light = light();
        let before = light.position;

        let moved = mapping.follow_cursor(&mut light, Vec2::new(-5.0, 10.0), Vec2::new(100.0, 100.0));
        assert!(!moved);
        assert_eq!(light.position, before);

        assert!(mapping.light_xy(Vec2::ZERO, Vec2::ZERO).is_none());
    }

    #[test]
    fn right_window_edge_is_outside() {
        let mapping = CursorMapping::new(&WonderlandConfig::default().cornell);
        let window = Vec2::new(1024.0, 768.0);

        assert!(mapping.light_xy(Vec2::new(1024.0, 100.0), window).is_none());
        assert!(mapping.light_xy(Vec2::new(1023.0, 100.0), window).is_some());
    }
}
