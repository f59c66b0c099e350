//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Protocol for events read from the keyboard device
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::fmt;
use std::mem;

//----------------------------------------------------------------------------

/// Size of one kernel `struct input_event` record on this target.
pub const EVENT_SIZE: usize = mem::size_of::<libc::input_event>();

pub const EV_KEY: u16 = 0x01;
pub const KEY_Q: u16 = 16;

//----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Released,
    Pressed,
    Repeated,
}

impl KeyState {
    pub fn from_value(value: i32) -> Option<KeyState> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeated),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KeyState::Released => "RELEASED",
            KeyState::Pressed => "PRESSED ",
            KeyState::Repeated => "REPEATED",
        }
    }
}

//----------------------------------------------------------------------------

/// One decoded input event. The timestamp is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    // type, code and value are the trailing 8 bytes, after the timeval
    pub fn decode(record: &[u8; EVENT_SIZE]) -> InputEvent {
        let tail = EVENT_SIZE - 8;
        InputEvent {
            kind: u16::from_ne_bytes([record[tail], record[tail + 1]]),
            code: u16::from_ne_bytes([record[tail + 2], record[tail + 3]]),
            value: i32::from_ne_bytes([record[tail + 4], record[tail + 5],
                                       record[tail + 6], record[tail + 7]]),
        }
    }

    pub fn key_state(&self) -> Option<KeyState> {
        if self.kind == EV_KEY {
            KeyState::from_value(self.value)
        } else {
            None
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.key_state() {
            Some(state) => write!(f, "{} 0x{:04x} ({})", state.label(), self.code, self.code),
            None => write!(f, "type {} code 0x{:04x} value {}", self.kind, self.code, self.value),
        }
    }
}

//----------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub enum InputStatus {
    /// Nothing to read right now
    Idle,
    Event(InputEvent),
    Quit,
    /// Short read or hard error; the device is gone
    DeviceLost,
}

impl InputStatus {
    pub fn keep_running(&self) -> bool {
        match *self {
            InputStatus::Idle | InputStatus::Event(_) => true,
            InputStatus::Quit | InputStatus::DeviceLost => false,
        }
    }
}

//----------------------------------------------------------------------------

#[cfg(test)]
pub fn encode(kind: u16, code: u16, value: i32) -> [u8; EVENT_SIZE] {
    let mut record = [0u8; EVENT_SIZE];
    let tail = EVENT_SIZE - 8;
    record[tail..tail + 2].copy_from_slice(&kind.to_ne_bytes());
    record[tail + 2..tail + 4].copy_from_slice(&code.to_ne_bytes());
    record[tail + 4..].copy_from_slice(&value.to_ne_bytes());
    record
}
