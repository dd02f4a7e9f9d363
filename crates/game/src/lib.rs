pub mod meshes;
pub mod prelude;
pub mod scenes;
pub mod trace;

pub use scenes::SceneKind;
pub use trace::TraceBackend;
