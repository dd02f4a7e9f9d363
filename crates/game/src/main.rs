use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use cubeview::{SceneKind, TraceBackend};
use cubeview_engine::{
    ApplicationBuilder, Result,
    input::InputEvent,
    logging::{LoggingConfig, init_logging},
};
use winit::keyboard::KeyCode;

const DEFAULT_FRAMES: u32 = 240;
const STEP: Duration = Duration::from_nanos(16_666_667);

/// Input for frame `index` of a `frames` long fly-through: hold W, sweep the
/// mouse right for the first half, zoom in at the midpoint, let go of W for
/// the last quarter.
fn script(index: u32, frames: u32) -> Vec<InputEvent> {
    let mut events = Vec::new();

    if index == 0 {
        events.push(InputEvent::Focused(true));
        events.push(InputEvent::Key {
            code: KeyCode::KeyW,
            pressed: true,
        });
    }

    if index <= frames / 2 {
        events.push(InputEvent::CursorMoved {
            x: 640.0 + index as f32 * 4.0,
            y: 360.0,
        });
    }

    if index == frames / 2 {
        events.push(InputEvent::Scroll { dy: 5.0 });
    }

    if index == frames * 3 / 4 {
        events.push(InputEvent::Key {
            code: KeyCode::KeyW,
            pressed: false,
        });
    }

    events
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let kind: SceneKind = match args.next() {
        Some(name) => name.parse()?,
        None => SceneKind::Textured,
    };
    let frames: u32 = match args.next() {
        Some(frames) => frames
            .parse()
            .with_context(|| format!("invalid frame count '{}'", frames))?,
        None => DEFAULT_FRAMES,
    };
    let asset_root = std::env::var_os("CUBEVIEW_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    log::info!(
        "Running '{}' for {} frames, assets from {}",
        kind,
        frames,
        asset_root.display()
    );

    let mut app = ApplicationBuilder::new().build(kind.create(&asset_root), TraceBackend::new())?;

    for index in 0..frames {
        for event in script(index, frames) {
            app.handle_input(event);
        }
        if app.should_quit() {
            break;
        }
        app.frame_with_delta(STEP)?;
    }

    if let Some(camera) = app.camera() {
        log::info!(
            "Camera at {:?}, yaw {:.1}, pitch {:.1}, fov {:.1}",
            camera.position(),
            camera.yaw(),
            camera.pitch(),
            camera.field_of_view()
        );
    }

    let backend = app.shutdown();
    log::info!("{} frames, {} draws", backend.frames, backend.draws);

    Ok(())
}
