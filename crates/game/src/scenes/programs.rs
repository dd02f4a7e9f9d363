use crate::prelude::*;

pub fn colored() -> ProgramSource {
    ProgramSource::new("colored", include_str!("shaders/colored.wgsl"))
}

pub fn textured() -> ProgramSource {
    ProgramSource::new("textured", include_str!("shaders/textured.wgsl"))
}

pub fn lit() -> ProgramSource {
    ProgramSource::new("lit", include_str!("shaders/lit.wgsl"))
}

/// Flat color, used for the light source cube
pub fn solid() -> ProgramSource {
    ProgramSource::new("solid", include_str!("shaders/solid.wgsl"))
}

pub fn skybox() -> ProgramSource {
    ProgramSource::new("skybox", include_str!("shaders/skybox.wgsl"))
}

pub fn reflect() -> ProgramSource {
    ProgramSource::new("reflect", include_str!("shaders/reflect.wgsl"))
}

pub fn all() -> Vec<ProgramSource> {
    vec![colored(), textured(), lit(), solid(), skybox(), reflect()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeview_engine::assets::validate_program;

    #[test]
    fn test_programs_validate() {
        for program in all() {
            if let Err(e) = validate_program(&program) {
                panic!("{}", e);
            }
        }
    }

    #[test]
    fn test_programs_declare_entry_points() {
        for program in all() {
            assert!(program.source.contains("fn vs_main"), "{}", program.label);
            assert!(program.source.contains("fn fs_main"), "{}", program.label);
        }
    }
}
