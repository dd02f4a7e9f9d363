use crate::prelude::*;

/// Pitch is kept within `[-PITCH_LIMIT, PITCH_LIMIT]` degrees.
pub const PITCH_LIMIT: f32 = 89.0;
/// Narrowest field of view (most zoomed in), in degrees.
pub const MIN_FIELD_OF_VIEW: f32 = 1.0;
/// Widest field of view, in degrees.
pub const MAX_FIELD_OF_VIEW: f32 = 45.0;

// Looks down -Z.
const INITIAL_YAW: f32 = -90.0;

/// Direction of a discrete keyboard movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Speeds fixed at construction time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// World units per second
    pub movement_speed: f32,
    /// Degrees of rotation per pixel of mouse movement
    pub rotation_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            movement_speed: 2.0,
            rotation_speed: 0.2,
        }
    }
}

/// Marks the camera entity that input is applied to and the scene is rendered from
#[derive(Component, Debug, Default)]
pub struct MainCamera;

/// First-person fly camera.
///
/// Orientation is stored as yaw/pitch angles in degrees; the `forward`, `up`
/// and `right` vectors are always derived from them and are only written by
/// [`FlyCamera::update_basis`].
#[derive(Component, Debug, Clone)]
pub struct FlyCamera {
    position: Point3<f32>,
    forward_hint: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    field_of_view: f32,
    forward: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    settings: CameraSettings,
}

impl FlyCamera {
    pub fn new(position: Point3<f32>, forward_hint: Vector3<f32>) -> Self {
        Self::with_settings(position, forward_hint, CameraSettings::default())
    }

    /// The forward hint is kept for inspection but does not seed the
    /// orientation: every camera starts at yaw -90, pitch 0.
    pub fn with_settings(
        position: Point3<f32>,
        forward_hint: Vector3<f32>,
        settings: CameraSettings,
    ) -> Self {
        let mut camera = Self {
            position,
            forward_hint,
            yaw: INITIAL_YAW,
            pitch: 0.0,
            field_of_view: MAX_FIELD_OF_VIEW,
            forward: -Vector3::z(),
            up: Vector3::y(),
            right: Vector3::x(),
            settings,
        };
        camera.update_basis();
        camera
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn forward_hint(&self) -> Vector3<f32> {
        self.forward_hint
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn settings(&self) -> CameraSettings {
        self.settings
    }

    /// Move along the camera basis for `elapsed_seconds` at the configured speed.
    ///
    /// Up and Down follow the world up axis so vertical strafing stays level
    /// regardless of pitch.
    pub fn handle_keyboard_movement(&mut self, direction: Movement, elapsed_seconds: f32) {
        let velocity = self.settings.movement_speed * elapsed_seconds;
        let axis = match direction {
            Movement::Forward => self.forward,
            Movement::Backward => -self.forward,
            Movement::Right => self.right,
            Movement::Left => -self.right,
            Movement::Up => world_up(),
            Movement::Down => -world_up(),
        };

        self.position += axis * velocity;
    }

    /// Apply a mouse delta in pixels. Screen y grows downwards, so moving the
    /// mouse up (negative `delta_y`) pitches the view up.
    ///
    /// Non-finite deltas are ignored. Yaw is kept within (-360, 360).
    pub fn handle_mouse_movement(&mut self, delta_x: f32, delta_y: f32) {
        let yaw_step = delta_x * self.settings.rotation_speed;
        let pitch_step = delta_y * self.settings.rotation_speed;
        if !yaw_step.is_finite() || !pitch_step.is_finite() {
            log::trace!("ignoring mouse delta ({}, {})", delta_x, delta_y);
            return;
        }

        self.yaw = (self.yaw + yaw_step) % 360.0;
        self.pitch = (self.pitch - pitch_step).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.update_basis();

        log::trace!(
            "camera yaw {:.2} pitch {:.2} forward {:?}",
            self.yaw,
            self.pitch,
            self.forward
        );
    }

    /// Zoom: positive scroll narrows the field of view.
    pub fn handle_scroll(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        self.field_of_view =
            (self.field_of_view - delta_y).clamp(MIN_FIELD_OF_VIEW, MAX_FIELD_OF_VIEW);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.snapshot().view_matrix()
    }

    /// OpenGL-style right-handed perspective using the current field of view.
    pub fn projection_matrix(&self, aspect: f32, znear: f32, zfar: f32) -> Matrix4<f32> {
        self.snapshot().projection_matrix(aspect, znear, zfar)
    }

    /// Copy of everything a renderer needs for one frame.
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            position: self.position,
            forward: self.forward,
            up: self.up,
            right: self.right,
            field_of_view: self.field_of_view,
        }
    }

    fn update_basis(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        let forward = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        );

        self.forward = forward.normalize();
        // Order fixes handedness.
        self.right = self.forward.cross(&world_up()).normalize();
        self.up = self.right.cross(&self.forward).normalize();
    }
}

fn world_up() -> Vector3<f32> {
    Vector3::y()
}

/// Immutable per-frame view of a [`FlyCamera`], safe to hand to another thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub position: Point3<f32>,
    pub forward: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub field_of_view: f32,
}

impl CameraSnapshot {
    /// Right-handed look-at from `position` towards `position + forward`.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let target = self.position + self.forward;
        Isometry3::look_at_rh(&self.position, &target, &self.up).to_homogeneous()
    }

    pub fn projection_matrix(&self, aspect: f32, znear: f32, zfar: f32) -> Matrix4<f32> {
        Perspective3::new(aspect, self.field_of_view.to_radians(), znear, zfar).to_homogeneous()
    }
}
