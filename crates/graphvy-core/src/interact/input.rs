use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Pointer event in view space (pixels, origin at the viewport's top left).
/// `id` tells concurrent touches apart; a mouse uses a single id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: u64,
    pub pos: DVec2,
    pub button: PointerButton,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn down(id: u64, pos: DVec2, button: PointerButton) -> Self {
        Self {
            id,
            pos,
            button,
            kind: PointerKind::Down,
        }
    }

    pub fn moved(id: u64, pos: DVec2, button: PointerButton) -> Self {
        Self {
            id,
            pos,
            button,
            kind: PointerKind::Move,
        }
    }

    pub fn up(id: u64, pos: DVec2, button: PointerButton) -> Self {
        Self {
            id,
            pos,
            button,
            kind: PointerKind::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Shift,
    Ctrl,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            pressed: true,
            modifiers: Modifiers::default(),
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            pressed: false,
            modifiers: Modifiers::default(),
        }
    }
}
