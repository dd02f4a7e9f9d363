mod camera;
mod resources;

pub use camera::*;
pub use resources::*;
