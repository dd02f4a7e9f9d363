use crate::prelude::*;

use std::path::{Path, PathBuf};

use cubeview_engine::assets;

use super::{blank_cubemap, compile, programs, texture_path};
use crate::meshes;

/// Face files in `CubeFace::ALL` order
const FACES: [&str; 6] = [
    "right.jpg",
    "left.jpg",
    "top.jpg",
    "bottom.jpg",
    "front.jpg",
    "back.jpg",
];

/// Environment cubemap around a cube that reflects it.
pub struct Skybox {
    faces: [PathBuf; 6],
    sky_program: Option<ProgramHandle>,
    reflect_program: Option<ProgramHandle>,
    sky_mesh: Option<MeshHandle>,
    cube_mesh: Option<MeshHandle>,
    cubemap: Option<TextureHandle>,
}

impl Skybox {
    pub fn new(asset_root: &Path) -> Self {
        let dir = texture_path(asset_root, "skybox");
        Self {
            faces: FACES.map(|face| dir.join(face)),
            sky_program: None,
            reflect_program: None,
            sky_mesh: None,
            cube_mesh: None,
            cubemap: None,
        }
    }
}

/// View matrix with the translation removed, so the sky stays centred on the eye.
pub fn rotation_only(view: &Matrix4<f32>) -> Matrix4<f32> {
    let mut view = *view;
    view.fixed_view_mut::<3, 1>(0, 3).fill(0.0);
    view
}

impl Scene for Skybox {
    fn name(&self) -> &str {
        "skybox"
    }

    fn attach(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.sky_program = compile(backend, programs::skybox());
        self.reflect_program = compile(backend, programs::reflect());
        self.sky_mesh = Some(backend.upload_mesh(&meshes::skybox()));
        self.cube_mesh = Some(backend.upload_mesh(&meshes::cube()));

        let cubemap = assets::load_cubemap(&self.faces, false).unwrap_or_else(|e| {
            log::warn!("{}, using a blank cubemap", e);
            blank_cubemap()
        });
        self.cubemap = Some(backend.upload_cubemap(&cubemap));

        Ok(())
    }

    fn frame(&mut self, context: &FrameContext, backend: &mut dyn RenderBackend) {
        let Some(cubemap) = self.cubemap else {
            return;
        };

        if let (Some(program), Some(mesh)) = (self.reflect_program, self.cube_mesh) {
            backend.draw(
                &DrawCall::new(program, mesh)
                    .with_cubemap(0, cubemap)
                    .with_uniform("model", Uniform::Mat4(Matrix4::identity()))
                    .with_uniform("view", Uniform::Mat4(context.view))
                    .with_uniform("projection", Uniform::Mat4(context.projection))
                    .with_uniform("camera_pos", Uniform::Vec3(context.camera.position.coords)),
            );
        }

        // Drawn last, at the far plane
        if let (Some(program), Some(mesh)) = (self.sky_program, self.sky_mesh) {
            backend.draw(
                &DrawCall::new(program, mesh)
                    .with_cubemap(0, cubemap)
                    .with_uniform("view", Uniform::Mat4(rotation_only(&context.view)))
                    .with_uniform("projection", Uniform::Mat4(context.projection))
                    .with_depth(DepthMode::LessEqual),
            );
        }
    }
}
