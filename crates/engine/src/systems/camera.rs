use crate::prelude::*;

/// Moves the main camera for every held movement key, scaled by frame time
pub fn apply_keyboard_movement(
    input: Res<InputState>,
    bindings: Res<KeyBindings>,
    time: Res<Time>,
    mut cameras: Query<&mut FlyCamera, With<MainCamera>>,
) {
    let dt = time.0.as_secs_f32();

    for mut camera in cameras.iter_mut() {
        for movement in bindings.held_movements(&input) {
            camera.handle_keyboard_movement(movement, dt);
        }
    }
}

/// Turns the accumulated mouse delta into yaw/pitch
pub fn apply_mouse_look(
    input: Res<InputState>,
    mut cameras: Query<&mut FlyCamera, With<MainCamera>>,
) {
    let (dx, dy) = input.mouse_delta;
    if dx == 0.0 && dy == 0.0 {
        return;
    }

    for mut camera in cameras.iter_mut() {
        camera.handle_mouse_movement(dx, dy);
    }
}

/// Turns the accumulated scroll into field-of-view zoom
pub fn apply_scroll_zoom(
    input: Res<InputState>,
    mut cameras: Query<&mut FlyCamera, With<MainCamera>>,
) {
    if input.scroll_delta == 0.0 {
        return;
    }

    for mut camera in cameras.iter_mut() {
        camera.handle_scroll(input.scroll_delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::*;
    use std::time::Duration;
    use winit::keyboard::KeyCode;

    fn setup(input: InputState, dt: Duration) -> (World, Schedule, Entity, Entity) {
        let mut world = World::new();
        world.insert_resource(input);
        world.insert_resource(KeyBindings::default());
        world.insert_resource(Time(dt));

        let start = Point3::new(0.0, 0.0, 2.0);
        let main = world
            .spawn((MainCamera, FlyCamera::new(start, -Vector3::z())))
            .id();
        let other = world.spawn(FlyCamera::new(start, -Vector3::z())).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (apply_keyboard_movement, apply_mouse_look, apply_scroll_zoom).chain(),
        );

        (world, schedule, main, other)
    }

    #[test]
    fn test_held_key_moves_only_main_camera() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyW);
        let (mut world, mut schedule, main, other) = setup(input, Duration::from_millis(500));

        schedule.run(&mut world);

        let moved = world.get::<FlyCamera>(main).unwrap().position();
        assert!((moved - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-5);
        let untouched = world.get::<FlyCamera>(other).unwrap().position();
        assert_eq!(untouched, Point3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_mouse_and_scroll_are_applied() {
        let mut input = InputState::new();
        input.add_mouse_delta(50.0, -25.0);
        input.add_scroll(5.0);
        let (mut world, mut schedule, main, _) = setup(input, Duration::from_millis(16));

        schedule.run(&mut world);

        let camera = world.get::<FlyCamera>(main).unwrap();
        assert!((camera.yaw() - (-80.0)).abs() < 1e-4);
        assert!((camera.pitch() - 5.0).abs() < 1e-4);
        assert!((camera.field_of_view() - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_idle_input_leaves_camera_unchanged() {
        let (mut world, mut schedule, main, _) =
            setup(InputState::new(), Duration::from_millis(16));
        let before = world.get::<FlyCamera>(main).unwrap().snapshot();

        schedule.run(&mut world);

        assert_eq!(world.get::<FlyCamera>(main).unwrap().snapshot(), before);
    }
}
