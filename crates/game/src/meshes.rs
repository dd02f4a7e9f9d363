use crate::prelude::*;

/// Where the ten cubes of the textured demo sit.
pub const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

// position, normal, uv
#[rustfmt::skip]
const CUBE: [[f32; 8]; 36] = [
    [-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0],
    [ 0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0],
    [ 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0],
    [ 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0],
    [-0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0],
    [-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0],

    [-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0],
    [ 0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0],
    [ 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0],
    [ 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0],
    [-0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0],
    [-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0],

    [-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0],
    [-0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 1.0],
    [-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0],
    [-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0],
    [-0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 0.0],
    [-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0],

    [ 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0],
    [ 0.5,  0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 1.0],
    [ 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0],
    [ 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0],
    [ 0.5, -0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 0.0],
    [ 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0],

    [-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0],
    [ 0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  1.0, 1.0],
    [ 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0],
    [ 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0],
    [-0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  0.0, 0.0],
    [-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0],

    [-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0],
    [ 0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 1.0],
    [ 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0],
    [ 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0],
    [-0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 0.0],
    [-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0],
];

/// Unit cube centred on the origin, 36 unindexed vertices.
pub fn cube() -> Mesh {
    let vertices = CUBE
        .iter()
        .map(|v| Vertex {
            position: [v[0], v[1], v[2]],
            normal: [v[3], v[4], v[5]],
            uv: [v[6], v[7]],
        })
        .collect();

    Mesh::new("cube", Vertices::Textured(vertices))
}

/// Red, green and blue corners in normalized device coordinates.
pub fn triangle() -> Mesh {
    Mesh::new(
        "triangle",
        Vertices::Colored(vec![
            ColorVertex {
                position: [-0.5, -0.5, 0.0],
                color: [1.0, 0.0, 0.0],
            },
            ColorVertex {
                position: [0.5, -0.5, 0.0],
                color: [0.0, 1.0, 0.0],
            },
            ColorVertex {
                position: [0.0, 0.5, 0.0],
                color: [0.0, 0.0, 1.0],
            },
        ]),
    )
}

/// Inside of a 2x2x2 cube; positions double as cubemap lookup directions.
pub fn skybox() -> Mesh {
    let positions = CUBE
        .iter()
        .map(|v| [v[0] * 2.0, v[1] * 2.0, v[2] * 2.0])
        .collect();

    Mesh::new("skybox", Vertices::Positions(positions))
}
