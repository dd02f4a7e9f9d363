use bevy_ecs::prelude::*;
use nalgebra::{Matrix4, Point3, Vector3};
use std::time::Duration;

use crate::components::{
    CameraSettings, CameraSnapshot, FlyCamera, MainCamera, Movement, Time, WindowSize,
};
use crate::input::{InputEvent, InputState, KeyBindings, PointerSource};
use crate::render::RenderBackend;
use crate::time::{FrameClock, FrameTime};

pub type Result<T> = anyhow::Result<T>;

pub mod assets;
pub mod components;
pub mod input;
pub mod logging;
pub mod platform;
pub mod prelude;
pub mod render;
pub mod systems;
pub mod time;

/// One demo: uploads its resources once, then issues draw calls every frame.
pub trait Scene: 'static {
    fn name(&self) -> &str;

    /// Collaborator failures are expected to be logged and tolerated here;
    /// an `Err` aborts application start-up.
    fn attach(&mut self, backend: &mut dyn RenderBackend) -> Result<()>;

    fn frame(&mut self, context: &FrameContext, backend: &mut dyn RenderBackend);

    fn detach(&mut self) {}

    /// Overrides the viewport clear color
    fn clear_color(&self) -> Option<[f32; 4]> {
        None
    }
}

/// Everything a scene needs to draw one frame
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub camera: CameraSnapshot,
    pub time: FrameTime,
    pub window_size: WindowSize,
    /// Movements whose keys are held this frame, in binding order
    pub held: Vec<Movement>,
}

#[derive(Debug, Clone)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: [f32; 4],
    pub znear: f32,
    pub zfar: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Computer Graphics 2023".to_string(),
            clear_color: [0.2, 0.3, 0.3, 1.0],
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

pub struct ApplicationBuilder {
    camera_position: Point3<f32>,
    camera_forward: Vector3<f32>,
    camera_settings: CameraSettings,
    key_bindings: KeyBindings,
    pointer_source: PointerSource,
    viewport: ViewportConfig,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            camera_position: Point3::new(0.0, 0.0, 2.0),
            camera_forward: Vector3::new(0.0, 0.0, -1.0),
            camera_settings: CameraSettings::default(),
            key_bindings: KeyBindings::default(),
            pointer_source: PointerSource::default(),
            viewport: ViewportConfig::default(),
        }
    }

    pub fn camera(mut self, position: Point3<f32>, forward: Vector3<f32>) -> Self {
        self.camera_position = position;
        self.camera_forward = forward;
        self
    }

    pub fn camera_settings(mut self, settings: CameraSettings) -> Self {
        self.camera_settings = settings;
        self
    }

    pub fn key_bindings(mut self, bindings: KeyBindings) -> Self {
        self.key_bindings = bindings;
        self
    }

    pub fn pointer_source(mut self, source: PointerSource) -> Self {
        self.pointer_source = source;
        self
    }

    pub fn viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    /// Spawn the camera, wire the input systems and attach `scene` to `backend`.
    pub fn build<B: RenderBackend>(
        self,
        mut scene: Box<dyn Scene>,
        mut backend: B,
    ) -> Result<Application<B>> {
        let mut world = World::new();
        world.insert_resource(InputState::with_pointer_source(self.pointer_source));
        world.insert_resource(self.key_bindings);
        world.insert_resource(Time(Duration::ZERO));
        world.insert_resource(WindowSize {
            width: self.viewport.width,
            height: self.viewport.height,
        });

        let camera = world
            .spawn((
                MainCamera,
                FlyCamera::with_settings(
                    self.camera_position,
                    self.camera_forward,
                    self.camera_settings,
                ),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                systems::apply_keyboard_movement,
                systems::apply_mouse_look,
                systems::apply_scroll_zoom,
            )
                .chain(),
        );

        scene.attach(&mut backend)?;
        log::info!(
            "Attached scene '{}' ({}x{})",
            scene.name(),
            self.viewport.width,
            self.viewport.height
        );

        Ok(Application {
            world,
            schedule,
            scene,
            backend,
            clock: FrameClock::new(),
            camera,
            viewport: self.viewport,
            quit_requested: false,
        })
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render-loop driver. Owns the ECS world holding the camera and input state,
/// the active scene and the backend it draws with.
pub struct Application<B: RenderBackend> {
    world: World,
    schedule: Schedule,
    scene: Box<dyn Scene>,
    backend: B,
    clock: FrameClock,
    camera: Entity,
    viewport: ViewportConfig,
    quit_requested: bool,
}

impl<B: RenderBackend> Application<B> {
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::CloseRequested => self.quit_requested = true,
            InputEvent::Key {
                code,
                pressed: true,
            } => {
                let quit = self
                    .world
                    .get_resource::<KeyBindings>()
                    .is_some_and(|bindings| bindings.is_quit(code));
                if quit {
                    log::info!("Quit requested");
                    self.quit_requested = true;
                }
            }
            InputEvent::Resized { width, height } => {
                // Minimized windows report zero; keep the last usable size.
                if width > 0 && height > 0 {
                    self.world.insert_resource(WindowSize { width, height });
                }
            }
            _ => {}
        }

        if let Some(mut input_state) = self.world.get_resource_mut::<InputState>() {
            input_state.apply_event(&event);
        }
    }

    /// Run one frame using wall-clock time.
    pub fn frame(&mut self) -> Result<()> {
        let time = self.clock.tick();
        self.render(time)
    }

    /// Run one frame with a fixed time step.
    pub fn frame_with_delta(&mut self, dt: Duration) -> Result<()> {
        let time = self.clock.advance(dt);
        self.render(time)
    }

    fn render(&mut self, time: FrameTime) -> Result<()> {
        self.world.insert_resource(Time(Duration::from_secs_f32(time.dt)));
        self.schedule.run(&mut self.world);

        // Reset per-frame input state
        if let Some(mut input_state) = self.world.get_resource_mut::<InputState>() {
            input_state.reset_frame();
        }

        let camera = self
            .camera()
            .ok_or_else(|| anyhow::anyhow!("main camera entity has no FlyCamera"))?
            .snapshot();
        let window_size = self
            .world
            .get_resource::<WindowSize>()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("WindowSize resource not found"))?;
        let held = match (
            self.world.get_resource::<KeyBindings>(),
            self.world.get_resource::<InputState>(),
        ) {
            (Some(bindings), Some(input)) => bindings.held_movements(input).collect(),
            _ => Vec::new(),
        };

        let context = FrameContext {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(
                window_size.aspect(),
                self.viewport.znear,
                self.viewport.zfar,
            ),
            camera,
            time,
            window_size,
            held,
        };

        let clear_color = self
            .scene
            .clear_color()
            .unwrap_or(self.viewport.clear_color);
        self.backend.begin_frame(clear_color);
        self.scene.frame(&context, &mut self.backend);
        self.backend.end_frame()?;

        self.world.clear_trackers();

        Ok(())
    }

    pub fn camera(&self) -> Option<&FlyCamera> {
        self.world.get::<FlyCamera>(self.camera)
    }

    pub fn window_size(&self) -> Option<WindowSize> {
        self.world.get_resource::<WindowSize>().copied()
    }

    pub fn scene_name(&self) -> &str {
        self.scene.name()
    }

    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Detach the scene and hand the backend back
    pub fn shutdown(mut self) -> B {
        self.scene.detach();
        log::info!("Detached scene '{}'", self.scene.name());
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{
        DrawCall, Mesh, MeshHandle, ProgramHandle, RecordingBackend, Uniform, Vertices,
    };
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use winit::keyboard::KeyCode;

    #[derive(Default)]
    struct RecordedScene {
        mesh: Option<MeshHandle>,
        frames: Rc<RefCell<Vec<FrameContext>>>,
        detached: Rc<Cell<bool>>,
        fail_attach: bool,
    }

    impl Scene for RecordedScene {
        fn name(&self) -> &str {
            "recorded"
        }

        fn attach(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
            if self.fail_attach {
                anyhow::bail!("scene refused to attach");
            }
            self.mesh = Some(backend.upload_mesh(&Mesh::new(
                "recorded",
                Vertices::Positions(vec![[0.0; 3]; 3]),
            )));
            Ok(())
        }

        fn frame(&mut self, context: &FrameContext, backend: &mut dyn RenderBackend) {
            self.frames.borrow_mut().push(context.clone());
            if let Some(mesh) = self.mesh {
                backend.draw(
                    &DrawCall::new(ProgramHandle(0), mesh)
                        .with_uniform("view", Uniform::Mat4(context.view)),
                );
            }
        }

        fn detach(&mut self) {
            self.detached.set(true);
        }
    }

    fn build(scene: RecordedScene) -> Application<RecordingBackend> {
        ApplicationBuilder::new()
            .build(Box::new(scene), RecordingBackend::new())
            .unwrap()
    }

    fn build_recorded() -> (Application<RecordingBackend>, Rc<RefCell<Vec<FrameContext>>>) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let app = build(RecordedScene {
            frames: frames.clone(),
            ..Default::default()
        });
        (app, frames)
    }

    #[test]
    fn test_build_attaches_scene() {
        let app = build(RecordedScene::default());
        assert_eq!(app.scene_name(), "recorded");
        assert_eq!(app.backend().meshes.len(), 1);
        assert_eq!(app.camera().unwrap().position(), Point3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_attach_failure_aborts_build() {
        let scene = RecordedScene {
            fail_attach: true,
            ..Default::default()
        };
        let result = ApplicationBuilder::new().build(Box::new(scene), RecordingBackend::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_held_key_moves_camera_each_frame() {
        let mut app = build(RecordedScene::default());
        app.handle_input(InputEvent::Key {
            code: KeyCode::KeyW,
            pressed: true,
        });

        app.frame_with_delta(Duration::from_millis(100)).unwrap();
        app.frame_with_delta(Duration::from_millis(100)).unwrap();
        let z = app.camera().unwrap().position().z;
        assert!((z - 1.6).abs() < 1e-4, "z = {}", z);

        app.handle_input(InputEvent::Key {
            code: KeyCode::KeyW,
            pressed: false,
        });
        app.frame_with_delta(Duration::from_millis(100)).unwrap();
        assert!((app.camera().unwrap().position().z - z).abs() < 1e-6);
    }

    #[test]
    fn test_mouse_delta_consumed_once() {
        let mut app = build(RecordedScene::default());
        app.handle_input(InputEvent::CursorMoved { x: 100.0, y: 100.0 });
        app.handle_input(InputEvent::CursorMoved { x: 110.0, y: 100.0 });

        app.frame_with_delta(Duration::from_millis(16)).unwrap();
        let yaw = app.camera().unwrap().yaw();
        assert!((yaw - (-88.0)).abs() < 1e-4);

        app.frame_with_delta(Duration::from_millis(16)).unwrap();
        assert_eq!(app.camera().unwrap().yaw(), yaw);
    }

    #[test]
    fn test_scroll_zooms_projection() {
        let (mut app, frames) = build_recorded();
        app.frame_with_delta(Duration::from_millis(16)).unwrap();
        app.handle_input(InputEvent::Scroll { dy: 20.0 });
        app.frame_with_delta(Duration::from_millis(16)).unwrap();

        assert!((app.camera().unwrap().field_of_view() - 25.0).abs() < 1e-5);
        let frames = frames.borrow();
        assert!(frames[1].projection[(1, 1)] > frames[0].projection[(1, 1)]);
        assert_eq!(frames[1].camera.field_of_view, 25.0);
    }

    #[test]
    fn test_frame_context_and_backend_calls() {
        let (mut app, frames) = build_recorded();
        app.frame_with_delta(Duration::from_millis(20)).unwrap();

        let backend = app.backend();
        assert_eq!(backend.frames, 1);
        assert_eq!(backend.clear_color, Some([0.2, 0.3, 0.3, 1.0]));
        assert_eq!(backend.draws.len(), 1);

        let camera = app.camera().unwrap();
        assert_eq!(
            backend.draws[0].uniform("view"),
            Some(&Uniform::Mat4(camera.view_matrix()))
        );

        let frame = frames.borrow()[0].clone();
        assert_eq!(frame.time.frame_index, 0);
        assert!((frame.time.dt - 0.02).abs() < 1e-6);
        assert_eq!(frame.window_size, WindowSize { width: 1280, height: 720 });
    }

    #[test]
    fn test_resize_updates_aspect_but_ignores_zero() {
        let (mut app, frames) = build_recorded();
        app.handle_input(InputEvent::Resized {
            width: 800,
            height: 800,
        });
        app.handle_input(InputEvent::Resized {
            width: 0,
            height: 0,
        });
        app.frame_with_delta(Duration::from_millis(16)).unwrap();

        let frame = frames.borrow()[0].clone();
        assert_eq!(frame.window_size, WindowSize { width: 800, height: 800 });
        assert!((frame.projection[(0, 0)] - frame.projection[(1, 1)]).abs() < 1e-6);
    }

    #[test]
    fn test_held_movements_reach_scene() {
        let (mut app, frames) = build_recorded();
        app.handle_input(InputEvent::Key {
            code: KeyCode::KeyD,
            pressed: true,
        });
        app.handle_input(InputEvent::Key {
            code: KeyCode::KeyW,
            pressed: true,
        });
        app.frame_with_delta(Duration::from_millis(16)).unwrap();
        app.handle_input(InputEvent::Key {
            code: KeyCode::KeyW,
            pressed: false,
        });
        app.frame_with_delta(Duration::from_millis(16)).unwrap();

        let frames = frames.borrow();
        assert_eq!(frames[0].held, vec![Movement::Forward, Movement::Right]);
        assert_eq!(frames[1].held, vec![Movement::Right]);
    }

    #[test]
    fn test_quit_key_and_close_request() {
        let mut app = build(RecordedScene::default());
        app.handle_input(InputEvent::Key {
            code: KeyCode::KeyW,
            pressed: true,
        });
        assert!(!app.should_quit());
        app.handle_input(InputEvent::Key {
            code: KeyCode::Escape,
            pressed: true,
        });
        assert!(app.should_quit());

        let mut app = build(RecordedScene::default());
        app.handle_input(InputEvent::CloseRequested);
        assert!(app.should_quit());
    }

    #[test]
    fn test_shutdown_detaches_scene() {
        let detached = Rc::new(Cell::new(false));
        let app = build(RecordedScene {
            detached: detached.clone(),
            ..Default::default()
        });
        let backend = app.shutdown();
        assert!(detached.get());
        assert_eq!(backend.frames, 0);
    }
}
