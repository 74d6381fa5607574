use glam::{Mat4, Vec2, Vec3};
use winit::keyboard::KeyCode;

use crate::{
    camera::{Camera, FlyCamera, Projection},
    config::{self, DemoVariant, WonderlandConfig},
    input::{Action, Input},
    light::{CursorMapping, Light},
    model,
    scene::{
        cornell_box,
        ground::GroundTiles,
        heightmap::{Heightmap, TerrainDeformer},
        lamp_post,
        skybox::Skybox,
        Scene, SceneObject, SceneObjectId,
    },
};

struct Terrain {
    heightmap: Heightmap,
    deformer: TerrainDeformer,
    object: SceneObjectId,
}

pub struct DemoState {
    pub config: WonderlandConfig,
    pub fly_camera: FlyCamera,
    pub cornell_eye: Vec3,
    pub projection: Projection,
    pub light: Light,
    pub scene: Scene,
    pub skybox: Option<Skybox>,
    pub ground: Option<GroundTiles>,
    pub input: Input,
    pub depth_dump_requested: bool,
    pub exit_requested: bool,
    cursor_mapping: CursorMapping,
    terrain: Option<Terrain>,
}

impl DemoState {
    pub fn new(config: WonderlandConfig) -> anyhow::Result<Self> {
        let camera_config = &config.camera;
        let fly_camera = FlyCamera::new(
            config::vec3(camera_config.start_position),
            config::vec3(camera_config.reset_position),
            camera_config.move_speed,
            camera_config.mouse_sensitivity,
        );

        let mut light = Light::new(&config.light, &config.shadow);
        let mut scene = Scene::new();
        let mut skybox = None;
        let mut ground = None;
        let mut terrain = None;

        let projection = match config.variant {
            DemoVariant::Wonderland => {
                skybox = Some(Skybox::new(fly_camera.position, config.skybox.scale));
                ground = Some(GroundTiles::new(config.ground.tile_size, config.ground.radius));

                scene.add_object(SceneObject::new(
                    "Block",
                    cornell_box::wonderland_block(),
                    Mat4::IDENTITY,
                ));

                if config.heightmap.enabled {
                    terrain = Some(Self::spawn_terrain(&config, &mut scene)?);
                }

                if config.lamp_post.enabled {
                    Self::spawn_lamp_post(&config, &mut scene);
                }

                Projection {
                    fov_degrees: camera_config.fov_degrees,
                    near: camera_config.near,
                    far: camera_config.far,
                }
            }
            DemoVariant::CornellWindow => {
                let cornell = &config.cornell;
                light.position = config::vec3(cornell.light_position);

                if cornell.show_room {
                    scene.add_object(
                        SceneObject::new("Room", cornell_box::room(), Mat4::IDENTITY)
                            .without_shadow(),
                    );
                }
                scene.add_object(
                    SceneObject::new("Tall block", cornell_box::tall_block(), Mat4::IDENTITY)
                        .without_shadow(),
                );
                scene.add_object(
                    SceneObject::new("Short block", cornell_box::short_block(), Mat4::IDENTITY)
                        .without_shadow(),
                );

                Projection {
                    fov_degrees: cornell.fov_degrees,
                    near: cornell.near,
                    far: cornell.far,
                }
            }
        };

        log::info!(
            "{:?} scene ready with {} objects",
            config.variant,
            scene.objects.len()
        );

        Ok(Self {
            cornell_eye: config::vec3(config.cornell.eye),
            cursor_mapping: CursorMapping::new(&config.cornell),
            input: Input::new(config.variant),
            config,
            fly_camera,
            projection,
            light,
            scene,
            skybox,
            ground,
            depth_dump_requested: false,
            exit_requested: false,
            terrain,
        })
    }

    fn spawn_terrain(config: &WonderlandConfig, scene: &mut Scene) -> anyhow::Result<Terrain> {
        let settings = &config.heightmap;
        let heightmap = Heightmap::new(settings.resolution, settings.size)?;
        let deformer = TerrainDeformer::new(
            settings.deform_interval_secs,
            (settings.min_radius, settings.max_radius),
            (settings.min_amplitude, settings.max_amplitude),
            settings.max_height,
            settings.seed,
        );

        log::info!(
            "Terrain grid {0}x{0} over {1} units",
            heightmap.resolution(),
            heightmap.size()
        );

        let object = scene.add_object(SceneObject::new(
            "Terrain",
            heightmap.to_mesh(),
            Mat4::from_translation(config::vec3(settings.position)),
        ));

        Ok(Terrain {
            heightmap,
            deformer,
            object,
        })
    }

    fn spawn_lamp_post(config: &WonderlandConfig, scene: &mut Scene) {
        let settings = &config.lamp_post;

        let mesh = model::load_gltf(&settings.model).and_then(|models| {
            lamp_post::build_mesh(
                &models,
                config::vec3(settings.position),
                settings.height,
                config::vec3(settings.color),
            )
        });

        match mesh {
            Ok(mesh) => {
                log::info!("Loaded lamp post with {} vertices", mesh.vertices.len());
                scene.add_object(SceneObject::new("Lamp post", mesh, Mat4::IDENTITY));
            }
            Err(e) => log::error!("Skipping lamp post: {:?}", e),
        }
    }

    pub fn variant(&self) -> DemoVariant {
        self.config.variant
    }

    pub fn camera(&self) -> Camera {
        match self.variant() {
            DemoVariant::Wonderland => self.fly_camera.camera(),
            DemoVariant::CornellWindow => Camera {
                eye: self.cornell_eye,
                target: config::vec3(self.config.cornell.target),
                up: Vec3::Y,
            },
        }
    }

    pub fn shadows_enabled(&self) -> bool {
        self.variant() == DemoVariant::Wonderland && self.config.shadow.enabled
    }

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) {
        if let Some(action) = self.input.handle_key(key, pressed, repeat) {
            self.apply_action(action);
        }
    }

    pub fn apply_action(&mut self, action: Action) {
        let step = self.config.cornell.step;

        match action {
            Action::Exit => self.exit_requested = true,
            Action::Reset => self.reset(),
            Action::DumpDepthMap => self.depth_dump_requested = true,
            Action::MoveEye { x, y } => {
                self.cornell_eye += Vec3::new(x as f32, y as f32, 0.0) * step;
            }
            Action::MoveLight { z } => self.light.position.z += z as f32 * step,
        }
    }

    pub fn reset(&mut self) {
        match self.variant() {
            DemoVariant::Wonderland => self.fly_camera.reset(),
            DemoVariant::CornellWindow => {
                self.cornell_eye = config::vec3(self.config.cornell.eye);
                self.light.position = config::vec3(self.config.cornell.light_position);
            }
        }
        log::debug!("Reset to {:?}", self.camera().eye);
    }

    /// Relative mouse motion, used for looking around.
    pub fn handle_mouse_motion(&mut self, delta: Vec2) {
        if self.variant() == DemoVariant::Wonderland {
            self.fly_camera.rotate(delta.x, delta.y);
        }
    }

    /// Absolute cursor position, used for steering the Cornell light.
    pub fn handle_cursor_moved(&mut self, cursor: Vec2, window_size: Vec2) {
        if self.variant() == DemoVariant::CornellWindow {
            self.cursor_mapping
                .follow_cursor(&mut self.light, cursor, window_size);
        }
    }

    pub fn update(&mut self, delta_time: f32) {
        if self.variant() == DemoVariant::Wonderland {
            self.fly_camera.translate(self.input.movement(), delta_time);
        }

        if let Some(skybox) = &mut self.skybox {
            skybox.follow(self.fly_camera.position);
        }

        if let Some(terrain) = &mut self.terrain {
            if terrain.deformer.update(delta_time, &mut terrain.heightmap) {
                if let Some(object) = self.scene.get_object_mut(terrain.object) {
                    object.update_vertices(terrain.heightmap.vertices());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wonderland_config() -> WonderlandConfig {
        let mut config = WonderlandConfig::default();
        config.lamp_post.enabled = false;
        config.heightmap.resolution = 9;
        config.heightmap.seed = Some(7);
        config
    }

    fn cornell_config() -> WonderlandConfig {
        let mut config = wonderland_config();
        config.variant = DemoVariant::CornellWindow;
        config
    }

    #[test]
    fn wonderland_scene_contents() {
        let state = DemoState::new(wonderland_config()).unwrap();

        assert!(state.skybox.is_some());
        assert!(state.ground.is_some());
        assert!(state.scene.get_object_by_name("Block").is_some());
        assert!(state.scene.get_object_by_name("Terrain").is_some());
        assert!(state.shadows_enabled());
        assert_eq!(state.camera().eye, Vec3::new(100.0, 50.0, 100.0));
    }

    #[test]
    fn default_lamp_post_is_loaded() {
        let mut config = wonderland_config();
        config.lamp_post.enabled = true;

        let state = DemoState::new(config).unwrap();
        let id = state.scene.get_object_by_name("Lamp post").unwrap();
        let lamp_post = &state.scene.objects[id];

        let lowest = lamp_post
            .mesh
            .vertices
            .iter()
            .map(|vertex| vertex.position.y)
            .fold(f32::MAX, f32::min);
        let highest = lamp_post
            .mesh
            .vertices
            .iter()
            .map(|vertex| vertex.position.y)
            .fold(f32::MIN, f32::max);

        assert!(lowest.abs() < 1e-3);
        assert!((highest - 60.0).abs() < 1e-3);
    }

    #[test]
    fn missing_lamp_post_is_skipped() {
        let mut config = wonderland_config();
        config.lamp_post.enabled = true;
        config.lamp_post.model = "does/not/exist.gltf".to_string();

        let state = DemoState::new(config).unwrap();
        assert!(state.scene.get_object_by_name("Lamp post").is_none());
        assert!(state.scene.get_object_by_name("Block").is_some());
    }

    #[test]
    fn cornell_scene_contents() {
        let state = DemoState::new(cornell_config()).unwrap();

        assert!(state.skybox.is_none());
        assert!(state.ground.is_none());
        assert_eq!(state.scene.objects.len(), 3);
        assert!(!state.shadows_enabled());
        assert_eq!(state.camera().eye, Vec3::new(-278.0, 273.0, 800.0));
        assert_eq!(state.light.position, Vec3::new(-275.0, 500.0, -275.0));
    }

    #[test]
    fn skybox_follows_camera() {
        let mut state = DemoState::new(wonderland_config()).unwrap();
        state.handle_key(KeyCode::KeyW, true, false);
        state.update(0.5);

        let skybox = state.skybox.as_ref().unwrap();
        assert_eq!(skybox.position, state.fly_camera.position);
        assert_ne!(state.fly_camera.position, Vec3::new(100.0, 50.0, 100.0));
    }

    #[test]
    fn terrain_is_marked_dirty_after_deforming() {
        let mut state = DemoState::new(wonderland_config()).unwrap();
        let terrain = state.scene.get_object_by_name("Terrain").unwrap();

        state.update(0.1);
        assert!(!state.scene.get_object_mut(terrain).unwrap().take_mesh_dirty());

        state.update(1.0);
        assert!(state.scene.get_object_mut(terrain).unwrap().take_mesh_dirty());
    }

    #[test]
    fn cornell_keys_move_eye_and_light_and_reset() {
        let mut state = DemoState::new(cornell_config()).unwrap();

        state.handle_key(KeyCode::ArrowRight, true, false);
        state.handle_key(KeyCode::ArrowUp, true, false);
        state.handle_key(KeyCode::KeyS, true, false);
        assert_eq!(state.camera().eye, Vec3::new(-258.0, 293.0, 800.0));
        assert_eq!(state.light.position.z, -255.0);

        state.handle_key(KeyCode::KeyR, true, false);
        assert_eq!(state.camera().eye, Vec3::new(-278.0, 273.0, 800.0));
        assert_eq!(state.light.position, Vec3::new(-275.0, 500.0, -275.0));
    }

    #[test]
    fn cursor_only_steers_cornell_light() {
        let window = Vec2::new(800.0, 600.0);

        let mut cornell = DemoState::new(cornell_config()).unwrap();
        cornell.handle_cursor_moved(window * 0.5, window);
        assert_eq!(cornell.light.position, Vec3::new(-278.0, 278.0, -275.0));

        let mut wonderland = DemoState::new(wonderland_config()).unwrap();
        let before = wonderland.light.position;
        wonderland.handle_cursor_moved(Vec2::ZERO, window);
        assert_eq!(wonderland.light.position, before);
    }

    #[test]
    fn space_requests_depth_dump_and_escape_exits() {
        let mut state = DemoState::new(wonderland_config()).unwrap();
        state.handle_key(KeyCode::Space, true, false);
        state.handle_key(KeyCode::Escape, true, false);
        assert!(state.depth_dump_requested);
        assert!(state.exit_requested);
    }
}
