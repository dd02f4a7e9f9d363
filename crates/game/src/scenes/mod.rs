use crate::prelude::*;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cubeview_engine::assets;

mod lit_cubes;
pub mod programs;
mod skybox;
mod textured_cubes;
mod triangle;

pub use lit_cubes::{LitCubes, Shading};
pub use skybox::Skybox;
pub use textured_cubes::TexturedCubes;
pub use triangle::ColoredTriangle;

/// The demos the runner can start, by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Triangle,
    Textured,
    Lit(Shading),
    Skybox,
}

impl SceneKind {
    pub const ALL: [SceneKind; 5] = [
        SceneKind::Triangle,
        SceneKind::Textured,
        SceneKind::Lit(Shading::Phong),
        SceneKind::Lit(Shading::BlinnPhong),
        SceneKind::Skybox,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::Triangle => "triangle",
            SceneKind::Textured => "textured",
            SceneKind::Lit(Shading::Phong) => "lit",
            SceneKind::Lit(Shading::BlinnPhong) => "blinn-phong",
            SceneKind::Skybox => "skybox",
        }
    }

    /// Build the scene; textures are looked up under `asset_root`.
    pub fn create(&self, asset_root: impl AsRef<Path>) -> Box<dyn Scene> {
        let asset_root = asset_root.as_ref();
        match self {
            SceneKind::Triangle => Box::new(ColoredTriangle::new()),
            SceneKind::Textured => Box::new(TexturedCubes::new(asset_root)),
            SceneKind::Lit(shading) => Box::new(LitCubes::new(*shading)),
            SceneKind::Skybox => Box::new(Skybox::new(asset_root)),
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScene(pub String);

impl fmt::Display for UnknownScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = SceneKind::ALL.iter().map(|kind| kind.name()).collect();
        write!(f, "unknown scene '{}', expected one of {}", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownScene {}

impl FromStr for SceneKind {
    type Err = UnknownScene;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        SceneKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or(UnknownScene(s.to_string()))
    }
}

pub(crate) fn texture_path(asset_root: &Path, file: &str) -> PathBuf {
    asset_root.join("Textures").join(file)
}

/// Validate and compile `source`; a failure is logged and the program is skipped.
pub(crate) fn compile(
    backend: &mut dyn RenderBackend,
    source: ProgramSource,
) -> Option<ProgramHandle> {
    if let Err(e) = assets::validate_program(&source) {
        log::error!("{}", e);
        return None;
    }

    match backend.create_program(&source) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("{}", e);
            None
        }
    }
}

/// Load a texture, falling back to a single white texel when it cannot be read.
pub(crate) fn texture_or_blank(
    backend: &mut dyn RenderBackend,
    path: &Path,
) -> (TextureHandle, bool) {
    match assets::load_texture(path, true) {
        Ok(image) => (backend.upload_texture(&image), true),
        Err(e) => {
            log::warn!("{}, using a blank texture", e);
            (backend.upload_texture(&blank()), false)
        }
    }
}

fn blank() -> TextureImage {
    TextureImage {
        width: 1,
        height: 1,
        pixels: vec![255; 4],
    }
}

pub(crate) fn blank_cubemap() -> CubemapImage {
    CubemapImage {
        size: 1,
        faces: std::array::from_fn(|_| blank()),
    }
}

/// Rotation about +Y by `angle` radians, then translation to `position`.
pub(crate) fn spinning(position: Vector3<f32>, angle: f32) -> Matrix4<f32> {
    Isometry3::from_parts(
        Translation3::from(position),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle),
    )
    .to_homogeneous()
}
