use crate::prelude::*;

use super::{compile, programs, spinning};

const FIELD_OF_VIEW: f32 = 45.0;
/// World units per second
const MOVEMENT_SPEED: f32 = 1.0;

/// A single colored triangle spinning in front of a fixed eye.
///
/// The fly camera is ignored: view is identity and the projection keeps a
/// constant 45 degree field of view. Held movement keys slide the triangle
/// itself: left/right along x, forward/backward along y, up/down along -z/+z.
pub struct ColoredTriangle {
    program: Option<ProgramHandle>,
    mesh: Option<MeshHandle>,
    offset: Vector3<f32>,
}

impl ColoredTriangle {
    pub fn new() -> Self {
        Self {
            program: None,
            mesh: None,
            offset: Vector3::new(0.0, 0.0, -2.0),
        }
    }

    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    fn displace(&mut self, movement: Movement, dt: f32) {
        let axis = match movement {
            Movement::Left => -Vector3::x(),
            Movement::Right => Vector3::x(),
            Movement::Forward => Vector3::y(),
            Movement::Backward => -Vector3::y(),
            Movement::Up => -Vector3::z(),
            Movement::Down => Vector3::z(),
        };
        self.offset += axis * MOVEMENT_SPEED * dt;
    }

    fn model(&self, elapsed: f32) -> Matrix4<f32> {
        spinning(self.offset, elapsed)
    }
}

impl Default for ColoredTriangle {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for ColoredTriangle {
    fn name(&self) -> &str {
        "triangle"
    }

    fn attach(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.program = compile(backend, programs::colored());
        self.mesh = Some(backend.upload_mesh(&crate::meshes::triangle()));
        Ok(())
    }

    fn frame(&mut self, context: &FrameContext, backend: &mut dyn RenderBackend) {
        for movement in &context.held {
            self.displace(*movement, context.time.dt);
        }

        let (Some(program), Some(mesh)) = (self.program, self.mesh) else {
            return;
        };

        let projection = Perspective3::new(
            context.window_size.aspect(),
            FIELD_OF_VIEW.to_radians(),
            0.1,
            100.0,
        );

        backend.draw(
            &DrawCall::new(program, mesh)
                .with_uniform("model", Uniform::Mat4(self.model(context.time.elapsed)))
                .with_uniform("view", Uniform::Mat4(Matrix4::identity()))
                .with_uniform("projection", Uniform::Mat4(projection.to_homogeneous())),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::test_support::{frame_at, mat4};

    #[test]
    fn test_draws_one_triangle() {
        let mut backend = RecordingBackend::new();
        let mut scene = ColoredTriangle::new();
        scene.attach(&mut backend).unwrap();
        scene.frame(&frame_at(0.0), &mut backend);

        assert_eq!(backend.meshes, vec![("triangle".to_string(), 3)]);
        assert_eq!(backend.draws.len(), 1);

        let call = &backend.draws[0];
        assert_eq!(mat4(call, "view"), Matrix4::identity());
        let centre = mat4(call, "model").transform_point(&Point3::origin());
        assert!((centre - Point3::new(0.0, 0.0, -2.0)).norm() < 1e-6);
    }

    #[test]
    fn test_ignores_camera_zoom() {
        let mut backend = RecordingBackend::new();
        let mut scene = ColoredTriangle::new();
        scene.attach(&mut backend).unwrap();

        let mut zoomed = frame_at(0.0);
        zoomed.camera.field_of_view = 10.0;
        zoomed.projection = zoomed.camera.projection_matrix(16.0 / 9.0, 0.1, 100.0);
        scene.frame(&frame_at(0.0), &mut backend);
        let wide = mat4(&backend.draws[0], "projection");
        scene.frame(&zoomed, &mut backend);

        assert_eq!(mat4(&backend.draws[1], "projection"), wide);
    }

    #[test]
    fn test_spins_with_elapsed_time() {
        let mut backend = RecordingBackend::new();
        let mut scene = ColoredTriangle::new();
        scene.attach(&mut backend).unwrap();
        scene.frame(&frame_at(std::f32::consts::PI), &mut backend);

        let corner = mat4(&backend.draws[0], "model").transform_point(&Point3::new(0.5, 0.0, 0.0));
        assert!((corner - Point3::new(-0.5, 0.0, -2.0)).norm() < 1e-5, "{:?}", corner);
    }

    #[test]
    fn test_held_keys_slide_triangle() {
        let mut backend = RecordingBackend::new();
        let mut scene = ColoredTriangle::new();
        scene.attach(&mut backend).unwrap();

        let mut frame = frame_at(0.0);
        frame.time.dt = 0.5;
        frame.held = vec![Movement::Right, Movement::Forward, Movement::Up];
        scene.frame(&frame, &mut backend);

        let centre = mat4(&backend.draws[0], "model").transform_point(&Point3::origin());
        assert!((centre - Point3::new(0.5, 0.5, -2.5)).norm() < 1e-6, "{:?}", centre);

        frame.held = vec![Movement::Left, Movement::Backward, Movement::Down];
        scene.frame(&frame, &mut backend);
        assert!((scene.offset() - Vector3::new(0.0, 0.0, -2.0)).norm() < 1e-6);

        // Nothing held, nothing moves
        frame.held.clear();
        scene.frame(&frame, &mut backend);
        assert!((scene.offset() - Vector3::new(0.0, 0.0, -2.0)).norm() < 1e-6);
    }

    #[test]
    fn test_skips_draw_without_program() {
        let mut backend = RecordingBackend::new().fail_program("colored");
        let mut scene = ColoredTriangle::new();
        scene.attach(&mut backend).unwrap();
        scene.frame(&frame_at(0.0), &mut backend);
        assert!(backend.draws.is_empty());
    }
}
