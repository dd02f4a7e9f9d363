pub use cubeview_engine::Result;
pub use cubeview_engine::prelude::*;
