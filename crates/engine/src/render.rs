//! Seam between scenes and the graphics API.
//!
//! Scenes describe what to draw with [`DrawCall`]s; a [`RenderBackend`]
//! compiles programs, owns GPU resources, and executes the calls.

use std::borrow::Cow;
use std::fmt;

use nalgebra::{Matrix4, Vector3};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

pub type Index = u16;

#[derive(Debug, Clone, PartialEq)]
pub enum Vertices {
    /// position, normal, uv
    Textured(Vec<Vertex>),
    /// position, color
    Colored(Vec<ColorVertex>),
    /// position only (skybox)
    Positions(Vec<[f32; 3]>),
}

impl Vertices {
    pub fn len(&self) -> usize {
        match self {
            Vertices::Textured(v) => v.len(),
            Vertices::Colored(v) => v.len(),
            Vertices::Positions(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size in bytes of one vertex
    pub fn stride(&self) -> usize {
        match self {
            Vertices::Textured(_) => std::mem::size_of::<Vertex>(),
            Vertices::Colored(_) => std::mem::size_of::<ColorVertex>(),
            Vertices::Positions(_) => std::mem::size_of::<[f32; 3]>(),
        }
    }

    /// Raw bytes, ready to copy into a vertex buffer
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Vertices::Textured(v) => bytemuck::cast_slice(v),
            Vertices::Colored(v) => bytemuck::cast_slice(v),
            Vertices::Positions(v) => bytemuck::cast_slice(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub label: String,
    pub vertices: Vertices,
    pub indices: Option<Vec<Index>>,
}

impl Mesh {
    pub fn new(label: impl Into<String>, vertices: Vertices) -> Self {
        Self {
            label: label.into(),
            vertices,
            indices: None,
        }
    }

    pub fn with_indices(mut self, indices: Vec<Index>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Number of elements a draw of this mesh covers
    pub fn element_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertices.len() as u32,
        }
    }
}

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let p = self.pixels.get(offset..offset + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Cubemap faces in upload order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];
}

/// Six square faces of equal size, ordered as [`CubeFace::ALL`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubemapImage {
    pub size: u32,
    pub faces: [TextureImage; 6],
}

/// Program source handed to the backend, WGSL with `vs_main`/`fs_main` entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub label: String,
    pub source: Cow<'static, str>,
}

impl ProgramSource {
    pub fn new(label: impl Into<String>, source: &'static str) -> Self {
        Self {
            label: label.into(),
            source: Cow::Borrowed(source),
        }
    }

    pub fn from_string(label: impl Into<String>, source: String) -> Self {
        Self {
            label: label.into(),
            source: Cow::Owned(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    D2,
    Cube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub slot: u32,
    pub texture: TextureHandle,
    pub kind: TextureKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Mat4(Matrix4<f32>),
    Vec3(Vector3<f32>),
    Float(f32),
    Int(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthMode {
    #[default]
    Less,
    /// Lets geometry at the far plane (skybox) pass the depth test
    LessEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub mesh: MeshHandle,
    pub textures: Vec<TextureBinding>,
    pub uniforms: Vec<(&'static str, Uniform)>,
    pub depth: DepthMode,
}

impl DrawCall {
    pub fn new(program: ProgramHandle, mesh: MeshHandle) -> Self {
        Self {
            program,
            mesh,
            textures: Vec::new(),
            uniforms: Vec::new(),
            depth: DepthMode::default(),
        }
    }

    pub fn with_uniform(mut self, name: &'static str, value: Uniform) -> Self {
        self.uniforms.push((name, value));
        self
    }

    pub fn with_texture(mut self, slot: u32, texture: TextureHandle) -> Self {
        self.textures.push(TextureBinding {
            slot,
            texture,
            kind: TextureKind::D2,
        });
        self
    }

    pub fn with_cubemap(mut self, slot: u32, texture: TextureHandle) -> Self {
        self.textures.push(TextureBinding {
            slot,
            texture,
            kind: TextureKind::Cube,
        });
        self
    }

    pub fn with_depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }

    /// Last value set for `name`
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms
            .iter()
            .rev()
            .find(|(uniform, _)| *uniform == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Program failed to compile or link; the message is the backend's log
    Program { label: String, message: String },
    /// Presenting the frame failed
    Present(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Program { label, message } => {
                write!(f, "program '{}' failed to build: {}", label, message)
            }
            RenderError::Present(message) => write!(f, "failed to present frame: {}", message),
        }
    }
}

impl std::error::Error for RenderError {}

/// Graphics API operations a scene relies on.
pub trait RenderBackend {
    fn create_program(
        &mut self,
        source: &ProgramSource,
    ) -> std::result::Result<ProgramHandle, RenderError>;

    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle;

    fn upload_texture(&mut self, image: &TextureImage) -> TextureHandle;

    fn upload_cubemap(&mut self, cubemap: &CubemapImage) -> TextureHandle;

    fn begin_frame(&mut self, clear_color: [f32; 4]);

    fn draw(&mut self, call: &DrawCall);

    fn end_frame(&mut self) -> std::result::Result<(), RenderError>;
}

/// Backend that keeps everything it is asked to do, for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub programs: Vec<String>,
    pub meshes: Vec<(String, u32)>,
    pub textures: Vec<(u32, u32)>,
    pub cubemaps: Vec<u32>,
    /// Draw calls of the frame in progress, or of the last finished frame
    pub draws: Vec<DrawCall>,
    pub clear_color: Option<[f32; 4]>,
    pub frames: u64,
    pub total_draws: u64,
    /// Program labels `create_program` refuses
    pub failing_programs: Vec<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_program(mut self, label: impl Into<String>) -> Self {
        self.failing_programs.push(label.into());
        self
    }
}

impl RenderBackend for RecordingBackend {
    fn create_program(
        &mut self,
        source: &ProgramSource,
    ) -> std::result::Result<ProgramHandle, RenderError> {
        if self.failing_programs.contains(&source.label) {
            return Err(RenderError::Program {
                label: source.label.clone(),
                message: "rejected by recording backend".to_string(),
            });
        }
        self.programs.push(source.label.clone());
        Ok(ProgramHandle(self.programs.len() as u32))
    }

    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        log::trace!("upload mesh '{}' ({} elements)", mesh.label, mesh.element_count());
        self.meshes.push((mesh.label.clone(), mesh.element_count()));
        MeshHandle(self.meshes.len() as u32)
    }

    fn upload_texture(&mut self, image: &TextureImage) -> TextureHandle {
        self.textures.push((image.width, image.height));
        TextureHandle((self.textures.len() + self.cubemaps.len()) as u32)
    }

    fn upload_cubemap(&mut self, cubemap: &CubemapImage) -> TextureHandle {
        self.cubemaps.push(cubemap.size);
        TextureHandle((self.textures.len() + self.cubemaps.len()) as u32)
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.clear_color = Some(clear_color);
        self.draws.clear();
    }

    fn draw(&mut self, call: &DrawCall) {
        log::trace!(
            "draw program {:?} mesh {:?} with {} uniforms",
            call.program,
            call.mesh,
            call.uniforms.len()
        );
        self.draws.push(call.clone());
        self.total_draws += 1;
    }

    fn end_frame(&mut self) -> std::result::Result<(), RenderError> {
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_bytes() {
        let vertices = Vertices::Textured(vec![
            Vertex {
                position: [0.0, 1.0, 2.0],
                normal: [0.0, 0.0, 1.0],
                uv: [0.5, 0.5],
            };
            3
        ]);
        assert_eq!(vertices.stride(), 32);
        assert_eq!(vertices.as_bytes().len(), 96);

        let colored = Vertices::Colored(vec![ColorVertex {
            position: [0.0; 3],
            color: [1.0, 0.0, 0.0],
        }]);
        assert_eq!(colored.stride(), 24);
        assert_eq!(&colored.as_bytes()[12..16], &1.0f32.to_ne_bytes());
    }

    #[test]
    fn test_element_count_prefers_indices() {
        let mesh = Mesh::new("quad", Vertices::Positions(vec![[0.0; 3]; 4]));
        assert_eq!(mesh.element_count(), 4);
        let mesh = mesh.with_indices(vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(mesh.element_count(), 6);
    }

    #[test]
    fn test_texture_pixel_lookup() {
        let image = TextureImage {
            width: 2,
            height: 1,
            pixels: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        assert_eq!(image.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_draw_call_uniform_lookup() {
        let call = DrawCall::new(ProgramHandle(1), MeshHandle(1))
            .with_uniform("shininess", Uniform::Float(8.0))
            .with_uniform("shininess", Uniform::Float(32.0))
            .with_cubemap(0, TextureHandle(3))
            .with_depth(DepthMode::LessEqual);

        assert_eq!(call.uniform("shininess"), Some(&Uniform::Float(32.0)));
        assert_eq!(call.uniform("model"), None);
        assert_eq!(call.textures[0].kind, TextureKind::Cube);
        assert_eq!(call.depth, DepthMode::LessEqual);
    }

    #[test]
    fn test_recording_backend_rejects_configured_programs() {
        let mut backend = RecordingBackend::new().fail_program("broken");
        assert!(backend.create_program(&ProgramSource::new("ok", "")).is_ok());
        let error = backend
            .create_program(&ProgramSource::new("broken", ""))
            .unwrap_err();
        assert!(error.to_string().contains("broken"));
        assert_eq!(backend.programs, vec!["ok".to_string()]);
    }
}
