use crate::prelude::*;

use std::time::Duration;

/// Elapsed time of the frame being simulated
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Time(pub Duration);

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    /// Width over height; a zero height (minimized window) reports 1.0.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}
