use bevy::input::mouse::MouseWheel;
use bevy::math::DVec2;
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use graphvy_core::interact::{Key, KeyEvent, Modifiers, PointerButton, PointerEvent};

use crate::app::resources::CanvasRes;

/// Mouse pointer id; touches use `touch id + 1`.
const MOUSE: u64 = 0;

const TRACKED_KEYS: [(KeyCode, Key); 5] = [
    (KeyCode::ShiftLeft, Key::Shift),
    (KeyCode::ShiftRight, Key::Shift),
    (KeyCode::ControlLeft, Key::Ctrl),
    (KeyCode::ControlRight, Key::Ctrl),
    (KeyCode::Space, Key::Space),
];

fn modifiers(keys: &ButtonInput<KeyCode>) -> Modifiers {
    Modifiers {
        shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
    }
}

fn map_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

pub(crate) fn wheel_factor(y: f32) -> f64 {
    if y > 0.0 {
        1.1
    } else {
        0.9
    }
}

fn to_view(p: Vec2) -> DVec2 {
    DVec2::new(p.x as f64, p.y as f64)
}

pub fn forward_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut st: NonSendMut<CanvasRes>,
) {
    let typing = contexts.ctx_mut().wants_keyboard_input();
    let mods = modifiers(&keys);
    for (code, key) in TRACKED_KEYS {
        // Releases always go through so a held tool never sticks.
        if keys.just_released(code) {
            st.canvas.handle_key(KeyEvent {
                key,
                pressed: false,
                modifiers: mods,
            });
        }
        if keys.just_pressed(code) && !typing {
            st.canvas.handle_key(KeyEvent {
                key,
                pressed: true,
                modifiers: mods,
            });
        }
    }
}

pub fn forward_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    mut moved: EventReader<CursorMoved>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
    mut st: NonSendMut<CanvasRes>,
) {
    let cursor = windows
        .get_single()
        .ok()
        .and_then(|w| w.cursor_position())
        .map(to_view);
    if let Some(pos) = cursor {
        st.last_cursor = Some(pos);
    }
    let last = st.last_cursor.unwrap_or_default();

    // Releases outside the window still end the gesture, at the last known position.
    let mut released: Vec<_> = buttons
        .get_just_released()
        .copied()
        .filter_map(map_button)
        .collect();
    if released.is_empty()
        && st.canvas.interaction().is_down(MOUSE)
        && !buttons.any_pressed([MouseButton::Left, MouseButton::Right, MouseButton::Middle])
    {
        // The release was never delivered, e.g. focus left the window mid-drag.
        released.push(PointerButton::Left);
    }

    let Some(cursor) = cursor else {
        moved.clear();
        for button in released {
            let result = st.canvas.handle_pointer(PointerEvent::up(MOUSE, last, button));
            st.check(result);
        }
        return;
    };
    let over_panel = contexts.ctx_mut().is_pointer_over_area();
    let idle = st.canvas.interaction().pointers_down() == 0;

    for button in buttons.get_just_pressed().copied().filter_map(map_button) {
        if !over_panel {
            let result = st.canvas.handle_pointer(PointerEvent::down(MOUSE, cursor, button));
            st.check(result);
        }
    }
    if moved.read().last().is_some() && !(over_panel && idle) {
        let result = st
            .canvas
            .handle_pointer(PointerEvent::moved(MOUSE, cursor, PointerButton::Left));
        st.check(result);
    }
    for button in released {
        let result = st.canvas.handle_pointer(PointerEvent::up(MOUSE, cursor, button));
        st.check(result);
    }
}

pub fn forward_touch(touches: Res<Touches>, mut st: NonSendMut<CanvasRes>) {
    for t in touches.iter_just_pressed() {
        let ev = PointerEvent::down(t.id() + 1, to_view(t.position()), PointerButton::Left);
        let result = st.canvas.handle_pointer(ev);
        st.check(result);
    }
    for t in touches.iter().filter(|t| t.delta() != Vec2::ZERO) {
        let ev = PointerEvent::moved(t.id() + 1, to_view(t.position()), PointerButton::Left);
        let result = st.canvas.handle_pointer(ev);
        st.check(result);
    }
    for t in touches
        .iter_just_released()
        .chain(touches.iter_just_canceled())
    {
        let ev = PointerEvent::up(t.id() + 1, to_view(t.position()), PointerButton::Left);
        let result = st.canvas.handle_pointer(ev);
        st.check(result);
    }
}

pub fn forward_wheel(
    mut wheel: EventReader<MouseWheel>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
    mut st: NonSendMut<CanvasRes>,
) {
    let over_panel = contexts.ctx_mut().is_pointer_over_area();
    let cursor = windows
        .get_single()
        .ok()
        .and_then(|w| w.cursor_position())
        .map(to_view);
    for ev in wheel.read() {
        let (Some(anchor), false) = (cursor, over_panel) else {
            continue;
        };
        if ev.y != 0.0 {
            st.canvas.zoom_at(anchor, wheel_factor(ev.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_up_zooms_in() {
        assert_eq!(wheel_factor(1.0), 1.1);
        assert_eq!(wheel_factor(-3.0), 0.9);
    }

    #[test]
    fn only_three_buttons_forwarded() {
        assert_eq!(map_button(MouseButton::Right), Some(PointerButton::Right));
        assert_eq!(map_button(MouseButton::Back), None);
    }
}
