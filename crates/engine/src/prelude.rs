pub use bevy_ecs::prelude::{Component, Entity, Query, Res, ResMut, Resource, With, World};
pub use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Translation3, UnitQuaternion, Vector3};

pub use crate::components::*;
pub use crate::input::{InputEvent, InputState, KeyBindings, PointerSource};
pub use crate::render::*;
pub use crate::time::{FrameClock, FrameTime};
pub use crate::{Application, ApplicationBuilder, FrameContext, Scene};
