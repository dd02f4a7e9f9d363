use crate::prelude::*;

/// Backend for headless runs: hands out handles, logs every call and keeps counts.
#[derive(Debug, Default)]
pub struct TraceBackend {
    next_handle: u32,
    pub programs: u32,
    pub meshes: u32,
    pub textures: u32,
    pub frames: u64,
    pub draws: u64,
    frame_draws: u32,
}

impl TraceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderBackend for TraceBackend {
    fn create_program(
        &mut self,
        source: &ProgramSource,
    ) -> std::result::Result<ProgramHandle, RenderError> {
        self.programs += 1;
        let handle = ProgramHandle(self.handle());
        log::debug!("create program '{}' -> {:?}", source.label, handle);
        Ok(handle)
    }

    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        self.meshes += 1;
        let handle = MeshHandle(self.handle());
        log::debug!(
            "upload mesh '{}' ({} vertices, {} bytes) -> {:?}",
            mesh.label,
            mesh.vertices.len(),
            mesh.vertices.as_bytes().len(),
            handle
        );
        handle
    }

    fn upload_texture(&mut self, image: &TextureImage) -> TextureHandle {
        self.textures += 1;
        let handle = TextureHandle(self.handle());
        log::debug!(
            "upload texture {}x{} -> {:?}",
            image.width,
            image.height,
            handle
        );
        handle
    }

    fn upload_cubemap(&mut self, cubemap: &CubemapImage) -> TextureHandle {
        self.textures += 1;
        let handle = TextureHandle(self.handle());
        log::debug!("upload cubemap {0}x{0} -> {1:?}", cubemap.size, handle);
        handle
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.frame_draws = 0;
        log::trace!("begin frame {} clear {:?}", self.frames, clear_color);
    }

    fn draw(&mut self, call: &DrawCall) {
        self.frame_draws += 1;
        self.draws += 1;
        log::trace!(
            "draw {:?} {:?} textures {} uniforms {:?}",
            call.program,
            call.mesh,
            call.textures.len(),
            call.uniforms.iter().map(|(name, _)| *name).collect::<Vec<_>>()
        );
    }

    fn end_frame(&mut self) -> std::result::Result<(), RenderError> {
        log::trace!("end frame {} ({} draws)", self.frames, self.frame_draws);
        self.frames += 1;
        Ok(())
    }
}
