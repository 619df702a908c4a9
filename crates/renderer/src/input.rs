//! Translation of windowing events into viewer calls.
//!
//! Kept independent of any windowing crate so sessions can be driven from
//! tests; [`crate::window`] maps winit events onto [`InputEvent`].

use scheduler::FrameScheduler;
use tracing::{debug, warn};

use crate::binding::ProgramBackend;
use crate::controller::RunState;
use crate::runtime::Clock;
use crate::viewer::Viewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Space,
    Tab,
    /// Number row key `1`..=`9`.
    Digit(u8),
    // Movement keys; reserved, currently unbound.
    W,
    A,
    S,
    D,
    Up,
    Down,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer position in window pixels, origin top-left.
    PointerMoved { x: f64, y: f64 },
    Click,
    KeyDown(InputKey),
    KeyUp(InputKey),
    SelectShader(String),
    CycleShader,
}

/// What a dispatched event did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEffect {
    Toggled(RunState),
    PointerUpdated { redrawn: bool },
    /// A new program is bound; `options` reproduces the session.
    ShaderSelected { name: String, options: String },
    Ignored,
}

/// Maps pixel coordinates within `area` onto `[-1, 1]` on both axes.
pub fn normalize_pointer(x: f64, y: f64, area: (u32, u32)) -> [f32; 2] {
    let width = f64::from(area.0.max(1));
    let height = f64::from(area.1.max(1));
    [
        ((x / width) * 2.0 - 1.0).clamp(-1.0, 1.0) as f32,
        ((y / height) * 2.0 - 1.0).clamp(-1.0, 1.0) as f32,
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct InputAdapter {
    pointer_area: (u32, u32),
}

impl InputAdapter {
    /// `pointer_area` is the size of the surface pointer positions refer to.
    pub fn new(pointer_area: (u32, u32)) -> Self {
        Self { pointer_area }
    }

    pub fn pointer_area(&self) -> (u32, u32) {
        self.pointer_area
    }

    pub fn dispatch<B, C, S>(&self, viewer: &mut Viewer<B, C, S>, event: InputEvent) -> InputEffect
    where
        B: ProgramBackend,
        C: Clock,
        S: FrameScheduler,
    {
        match event {
            InputEvent::PointerMoved { x, y } => {
                let pointer = normalize_pointer(x, y, self.pointer_area);
                InputEffect::PointerUpdated {
                    redrawn: viewer.pointer_moved(pointer),
                }
            }
            InputEvent::Click | InputEvent::KeyUp(InputKey::Space) => {
                InputEffect::Toggled(viewer.toggle())
            }
            InputEvent::CycleShader | InputEvent::KeyUp(InputKey::Tab) => {
                let result = viewer.cycle_shader();
                selection_effect(viewer, result)
            }
            InputEvent::KeyUp(InputKey::Digit(digit)) if (1..=9).contains(&digit) => {
                let result = viewer.select_index(usize::from(digit - 1));
                selection_effect(viewer, result)
            }
            InputEvent::SelectShader(name) => {
                let result = viewer.select_shader(&name);
                selection_effect(viewer, result)
            }
            InputEvent::KeyDown(key) | InputEvent::KeyUp(key) => {
                if matches!(
                    key,
                    InputKey::W | InputKey::A | InputKey::S | InputKey::D | InputKey::Up | InputKey::Down
                ) {
                    debug!(?key, "movement key pressed; no binding");
                }
                InputEffect::Ignored
            }
        }
    }
}

fn selection_effect<B, C, S>(
    viewer: &Viewer<B, C, S>,
    result: Result<String, crate::binding::BindingError>,
) -> InputEffect
where
    B: ProgramBackend,
    C: Clock,
    S: FrameScheduler,
{
    match result {
        Ok(options) => InputEffect::ShaderSelected {
            name: viewer.current_shader().to_string(),
            options,
        },
        Err(err) => {
            warn!(error = %err, "shader selection failed");
            InputEffect::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_maps_to_origin() {
        assert_eq!(normalize_pointer(640.0, 360.0, (1280, 720)), [0.0, 0.0]);
    }

    #[test]
    fn corners_map_to_unit_square() {
        assert_eq!(normalize_pointer(0.0, 0.0, (200, 100)), [-1.0, -1.0]);
        assert_eq!(normalize_pointer(200.0, 100.0, (200, 100)), [1.0, 1.0]);
        assert_eq!(normalize_pointer(500.0, -20.0, (200, 100)), [1.0, -1.0]);
    }

    #[test]
    fn zero_area_does_not_divide_by_zero() {
        let [x, y] = normalize_pointer(0.0, 0.0, (0, 0));
        assert!(x.is_finite() && y.is_finite());
    }
}
