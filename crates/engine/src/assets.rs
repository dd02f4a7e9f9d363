//! Loaders for textures, cubemaps and WGSL programs.
//!
//! Every loader returns a [`Result`](std::result::Result) and leaves the
//! log-and-continue decision to the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};

use crate::render::{CubeFace, CubemapImage, ProgramSource, TextureImage};

#[derive(Debug)]
pub enum AssetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    CubemapFace {
        face: CubeFace,
        expected: u32,
        found: (u32, u32),
    },
    Program {
        label: String,
        message: String,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            AssetError::Decode { path, source } => {
                write!(f, "failed to decode {}: {}", path.display(), source)
            }
            AssetError::CubemapFace {
                face,
                expected,
                found,
            } => write!(
                f,
                "cubemap face {:?} is {}x{}, expected {}x{}",
                face, found.0, found.1, expected, expected
            ),
            AssetError::Program { label, message } => {
                write!(f, "program '{}' is invalid: {}", label, message)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            AssetError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Decode an image file into RGBA8, optionally flipping rows so the first
/// row is the bottom of the image.
pub fn load_texture(
    path: impl AsRef<Path>,
    flip_vertically: bool,
) -> std::result::Result<TextureImage, AssetError> {
    let path = path.as_ref();

    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let image = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!(
        "loaded texture {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    Ok(to_texture(image, flip_vertically))
}

/// Same as [`load_texture`] for an in-memory encoded image.
pub fn decode_texture(
    bytes: &[u8],
    flip_vertically: bool,
) -> std::result::Result<TextureImage, AssetError> {
    let image = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
        path: PathBuf::from("<memory>"),
        source,
    })?;

    Ok(to_texture(image, flip_vertically))
}

fn to_texture(image: DynamicImage, flip_vertically: bool) -> TextureImage {
    let image = if flip_vertically { image.flipv() } else { image };
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    TextureImage {
        width,
        height,
        pixels: rgba.into_raw(),
    }
}

/// Load six faces ordered +X, -X, +Y, -Y, +Z, -Z.
pub fn load_cubemap<P: AsRef<Path>>(
    faces: &[P; 6],
    flip_vertically: bool,
) -> std::result::Result<CubemapImage, AssetError> {
    let mut images = Vec::with_capacity(6);
    for path in faces {
        images.push(load_texture(path, flip_vertically)?);
    }

    cubemap_from_faces(images)
}

/// Assemble decoded faces into a cubemap; all faces must be square and the same size.
pub fn cubemap_from_faces(
    faces: Vec<TextureImage>,
) -> std::result::Result<CubemapImage, AssetError> {
    let size = faces.first().map(|face| face.width).unwrap_or(0);

    for (face, image) in CubeFace::ALL.iter().zip(&faces) {
        if image.width != size || image.height != size {
            return Err(AssetError::CubemapFace {
                face: *face,
                expected: size,
                found: (image.width, image.height),
            });
        }
    }

    let found = faces.len() as u32;
    let faces: [TextureImage; 6] = faces.try_into().map_err(|_| AssetError::CubemapFace {
        face: CubeFace::ALL[(found as usize).min(5)],
        expected: size,
        found: (0, 0),
    })?;

    Ok(CubemapImage { size, faces })
}

/// Read a WGSL file and check it with naga.
pub fn load_program(
    label: impl Into<String>,
    path: impl AsRef<Path>,
) -> std::result::Result<ProgramSource, AssetError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let program = ProgramSource::from_string(label, source);
    validate_program(&program)?;
    Ok(program)
}

/// Parses and validates WGSL source using naga
pub fn validate_program(program: &ProgramSource) -> std::result::Result<(), AssetError> {
    let module = naga::front::wgsl::parse_str(&program.source).map_err(|e| AssetError::Program {
        label: program.label.clone(),
        message: e.emit_to_string(&program.source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );

    validator
        .validate(&module)
        .map_err(|e| AssetError::Program {
            label: program.label.clone(),
            message: format!("{:?}", e),
        })?;

    Ok(())
}
