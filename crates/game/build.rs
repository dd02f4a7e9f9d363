use std::path::Path;

fn main() {
    let dir = Path::new("src/scenes/shaders");

    // Tell cargo to rerun this build script if shaders change
    println!("cargo:rerun-if-changed={}", dir.display());

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Failed to read shader directory {}: {}", dir.display(), e))
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "wgsl"))
        .collect();
    paths.sort();

    // Validate all shader files at compile time
    for path in paths {
        println!("cargo:rerun-if-changed={}", path.display());
        validate_shader(&path);
    }
}

fn validate_shader(path: &Path) {
    let shader_source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read shader file {}: {}", path.display(), e));

    // Parse the WGSL shader
    let module = match naga::front::wgsl::parse_str(&shader_source) {
        Ok(module) => module,
        Err(e) => {
            panic!(
                "Shader parsing failed for {}:\n{}",
                path.display(),
                e.emit_to_string(&shader_source)
            );
        }
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );

    if let Err(e) = validator.validate(&module) {
        panic!("Shader validation failed for {}:\n{:?}", path.display(), e);
    }
}
