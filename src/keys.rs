//! Key token symbol table
//!
//! Maps the lowercase token names used in action strings (`ctrl`, `c`,
//! `f4`, `up`, ...) to evdev key codes. The same table defines which keys
//! the virtual keyboard advertises.

use evdev::Key;

/// Token → key code. Several tokens may alias the same key.
const SYMBOLS: &[(&str, Key)] = &[
    // Modifiers (left variants)
    ("ctrl", Key::KEY_LEFTCTRL),
    ("control", Key::KEY_LEFTCTRL),
    ("alt", Key::KEY_LEFTALT),
    ("shift", Key::KEY_LEFTSHIFT),
    ("super", Key::KEY_LEFTMETA),
    ("meta", Key::KEY_LEFTMETA),
    ("win", Key::KEY_LEFTMETA),
    // Letters
    ("a", Key::KEY_A),
    ("b", Key::KEY_B),
    ("c", Key::KEY_C),
    ("d", Key::KEY_D),
    ("e", Key::KEY_E),
    ("f", Key::KEY_F),
    ("g", Key::KEY_G),
    ("h", Key::KEY_H),
    ("i", Key::KEY_I),
    ("j", Key::KEY_J),
    ("k", Key::KEY_K),
    ("l", Key::KEY_L),
    ("m", Key::KEY_M),
    ("n", Key::KEY_N),
    ("o", Key::KEY_O),
    ("p", Key::KEY_P),
    ("q", Key::KEY_Q),
    ("r", Key::KEY_R),
    ("s", Key::KEY_S),
    ("t", Key::KEY_T),
    ("u", Key::KEY_U),
    ("v", Key::KEY_V),
    ("w", Key::KEY_W),
    ("x", Key::KEY_X),
    ("y", Key::KEY_Y),
    ("z", Key::KEY_Z),
    // Digits
    ("0", Key::KEY_0),
    ("1", Key::KEY_1),
    ("2", Key::KEY_2),
    ("3", Key::KEY_3),
    ("4", Key::KEY_4),
    ("5", Key::KEY_5),
    ("6", Key::KEY_6),
    ("7", Key::KEY_7),
    ("8", Key::KEY_8),
    ("9", Key::KEY_9),
    // Function keys
    ("f1", Key::KEY_F1),
    ("f2", Key::KEY_F2),
    ("f3", Key::KEY_F3),
    ("f4", Key::KEY_F4),
    ("f5", Key::KEY_F5),
    ("f6", Key::KEY_F6),
    ("f7", Key::KEY_F7),
    ("f8", Key::KEY_F8),
    ("f9", Key::KEY_F9),
    ("f10", Key::KEY_F10),
    ("f11", Key::KEY_F11),
    ("f12", Key::KEY_F12),
    // Named keys
    ("space", Key::KEY_SPACE),
    (" ", Key::KEY_SPACE),
    ("enter", Key::KEY_ENTER),
    ("return", Key::KEY_ENTER),
    ("esc", Key::KEY_ESC),
    ("escape", Key::KEY_ESC),
    ("tab", Key::KEY_TAB),
    ("backspace", Key::KEY_BACKSPACE),
    ("delete", Key::KEY_DELETE),
    ("del", Key::KEY_DELETE),
    ("insert", Key::KEY_INSERT),
    ("home", Key::KEY_HOME),
    ("end", Key::KEY_END),
    ("pageup", Key::KEY_PAGEUP),
    ("pgup", Key::KEY_PAGEUP),
    ("pagedown", Key::KEY_PAGEDOWN),
    ("pgdn", Key::KEY_PAGEDOWN),
    ("up", Key::KEY_UP),
    ("down", Key::KEY_DOWN),
    ("left", Key::KEY_LEFT),
    ("right", Key::KEY_RIGHT),
    // Punctuation
    ("minus", Key::KEY_MINUS),
    ("equal", Key::KEY_EQUAL),
    ("comma", Key::KEY_COMMA),
    ("period", Key::KEY_DOT),
    ("dot", Key::KEY_DOT),
    ("slash", Key::KEY_SLASH),
    ("semicolon", Key::KEY_SEMICOLON),
    ("apostrophe", Key::KEY_APOSTROPHE),
    ("grave", Key::KEY_GRAVE),
    ("leftbrace", Key::KEY_LEFTBRACE),
    ("rightbrace", Key::KEY_RIGHTBRACE),
    ("backslash", Key::KEY_BACKSLASH),
    // Media
    ("playpause", Key::KEY_PLAYPAUSE),
    ("nextsong", Key::KEY_NEXTSONG),
    ("previoussong", Key::KEY_PREVIOUSSONG),
    ("volumeup", Key::KEY_VOLUMEUP),
    ("volumedown", Key::KEY_VOLUMEDOWN),
    ("mute", Key::KEY_MUTE),
];

/// Look up a single action token (case-insensitive).
pub fn key_from_token(token: &str) -> Option<Key> {
    let token = token.to_ascii_lowercase();
    SYMBOLS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|&(_, key)| key)
}

/// Every key the symbol table can produce (aliases repeat their key).
pub fn supported_keys() -> impl Iterator<Item = Key> {
    SYMBOLS.iter().map(|&(_, key)| key)
}
