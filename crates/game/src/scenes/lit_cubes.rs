use crate::prelude::*;

use super::{compile, programs};
use crate::meshes;

/// Specular model used by [`LitCubes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// Reflection vector against the view direction
    #[default]
    Phong,
    /// Halfway vector against the normal
    BlinnPhong,
}

/// One lit cube and the small cube marking its light.
pub struct LitCubes {
    shading: Shading,
    pub light_position: Vector3<f32>,
    pub light_color: Vector3<f32>,
    pub object_color: Vector3<f32>,
    pub shininess: f32,
    lit_program: Option<ProgramHandle>,
    lamp_program: Option<ProgramHandle>,
    mesh: Option<MeshHandle>,
}

impl LitCubes {
    pub fn new(shading: Shading) -> Self {
        Self {
            shading,
            light_position: Vector3::new(1.2, 1.0, 2.0),
            light_color: Vector3::new(1.0, 1.0, 1.0),
            object_color: Vector3::new(1.0, 0.5, 0.31),
            shininess: 32.0,
            lit_program: None,
            lamp_program: None,
            mesh: None,
        }
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    pub fn set_shading(&mut self, shading: Shading) {
        log::debug!("Shading {:?} -> {:?}", self.shading, shading);
        self.shading = shading;
    }
}

impl Scene for LitCubes {
    fn name(&self) -> &str {
        match self.shading {
            Shading::Phong => "lit",
            Shading::BlinnPhong => "blinn-phong",
        }
    }

    fn attach(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.lit_program = compile(backend, programs::lit());
        self.lamp_program = compile(backend, programs::solid());
        self.mesh = Some(backend.upload_mesh(&meshes::cube()));
        Ok(())
    }

    fn frame(&mut self, context: &FrameContext, backend: &mut dyn RenderBackend) {
        let Some(mesh) = self.mesh else {
            return;
        };

        if let Some(program) = self.lit_program {
            let blinn = match self.shading {
                Shading::Phong => 0,
                Shading::BlinnPhong => 1,
            };

            backend.draw(
                &DrawCall::new(program, mesh)
                    .with_uniform("model", Uniform::Mat4(Matrix4::identity()))
                    .with_uniform("view", Uniform::Mat4(context.view))
                    .with_uniform("projection", Uniform::Mat4(context.projection))
                    .with_uniform("light_pos", Uniform::Vec3(self.light_position))
                    .with_uniform("view_pos", Uniform::Vec3(context.camera.position.coords))
                    .with_uniform("object_color", Uniform::Vec3(self.object_color))
                    .with_uniform("light_color", Uniform::Vec3(self.light_color))
                    .with_uniform("shininess", Uniform::Float(self.shininess))
                    .with_uniform("blinn", Uniform::Int(blinn)),
            );
        }

        if let Some(program) = self.lamp_program {
            let model =
                Matrix4::new_translation(&self.light_position) * Matrix4::new_scaling(0.2);

            backend.draw(
                &DrawCall::new(program, mesh)
                    .with_uniform("model", Uniform::Mat4(model))
                    .with_uniform("view", Uniform::Mat4(context.view))
                    .with_uniform("projection", Uniform::Mat4(context.projection))
                    .with_uniform("color", Uniform::Vec3(self.light_color)),
            );
        }
    }
}
