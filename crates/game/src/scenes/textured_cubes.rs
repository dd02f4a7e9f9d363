use crate::prelude::*;

use std::path::{Path, PathBuf};

use super::{compile, programs, spinning, texture_or_blank, texture_path};
use crate::meshes::{self, CUBE_POSITIONS};

const FACE_WEIGHT: f32 = 0.2;

/// Ten spinning crates with a face blended over them.
pub struct TexturedCubes {
    base_path: PathBuf,
    overlay_path: PathBuf,
    program: Option<ProgramHandle>,
    mesh: Option<MeshHandle>,
    textures: Option<(TextureHandle, TextureHandle)>,
    face_weight: f32,
}

impl TexturedCubes {
    pub fn new(asset_root: &Path) -> Self {
        Self {
            base_path: texture_path(asset_root, "RTS_Crate.jpg"),
            overlay_path: texture_path(asset_root, "awesomeface.png"),
            program: None,
            mesh: None,
            textures: None,
            face_weight: FACE_WEIGHT,
        }
    }
}

impl Scene for TexturedCubes {
    fn name(&self) -> &str {
        "textured"
    }

    fn attach(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.program = compile(backend, programs::textured());
        self.mesh = Some(backend.upload_mesh(&meshes::cube()));

        let (base, _) = texture_or_blank(backend, &self.base_path);
        let (overlay, overlay_loaded) = texture_or_blank(backend, &self.overlay_path);
        if !overlay_loaded {
            self.face_weight = 0.0;
        }
        self.textures = Some((base, overlay));

        log::info!("Textured cubes ready, {} cubes", CUBE_POSITIONS.len());
        Ok(())
    }

    fn frame(&mut self, context: &FrameContext, backend: &mut dyn RenderBackend) {
        let (Some(program), Some(mesh), Some((base, overlay))) =
            (self.program, self.mesh, self.textures)
        else {
            return;
        };

        for position in CUBE_POSITIONS {
            let model = spinning(Vector3::from(position), context.time.elapsed);

            backend.draw(
                &DrawCall::new(program, mesh)
                    .with_texture(0, base)
                    .with_texture(1, overlay)
                    .with_uniform("model", Uniform::Mat4(model))
                    .with_uniform("view", Uniform::Mat4(context.view))
                    .with_uniform("projection", Uniform::Mat4(context.projection))
                    .with_uniform("face_weight", Uniform::Float(self.face_weight)),
            );
        }
    }
}
