//! Held-signal input
//!
//! Devices are mapped onto two logical signals. The simulation only ever asks
//! whether a signal is held at the moment it runs; there is no event queue.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// A logical control, independent of the device that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    MoveLeft,
    MoveRight,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::MoveLeft => "move-left",
            Signal::MoveRight => "move-right",
        }
    }
}

/// Name that matches no [`Signal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSignal(pub String);

impl fmt::Display for UnknownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown input signal '{}'", self.0)
    }
}

impl std::error::Error for UnknownSignal {}

impl FromStr for Signal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move-left" => Ok(Signal::MoveLeft),
            "move-right" => Ok(Signal::MoveRight),
            _ => Err(UnknownSignal(s.to_string())),
        }
    }
}

/// Read side consumed by the physics step
pub trait InputSource {
    fn is_active(&self, signal: Signal) -> bool;
}

/// Keyboard key names (as reported by `KeyboardEvent.key`) mapped to signals
#[derive(Debug, Clone)]
pub struct KeyBindings {
    keys: HashMap<String, Signal>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self {
            keys: HashMap::new(),
        };
        for key in ["ArrowLeft", "a", "A"] {
            bindings.bind(key, Signal::MoveLeft);
        }
        for key in ["ArrowRight", "d", "D"] {
            bindings.bind(key, Signal::MoveRight);
        }
        bindings
    }
}

impl KeyBindings {
    pub fn bind(&mut self, key: &str, signal: Signal) {
        self.keys.insert(key.to_string(), signal);
    }

    pub fn signal_for(&self, key: &str) -> Option<Signal> {
        self.keys.get(key).copied()
    }
}

/// Live set of held signals.
///
/// Keyboard and touch share the set but release differently: a key-up clears
/// only the keys bound to its signal, a touch-end clears both directions.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Signal>,
    /// Keys currently down, so releasing one of two keys for the same signal
    /// keeps the signal held
    keys_down: HashSet<String>,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn press(&mut self, signal: Signal) {
        self.held.insert(signal);
    }

    pub fn release(&mut self, signal: Signal) {
        self.held.remove(&signal);
    }

    /// Drop every held signal (window lost focus)
    pub fn clear(&mut self) {
        self.held.clear();
        self.keys_down.clear();
    }

    pub fn key_down(&mut self, key: &str) {
        if let Some(signal) = self.bindings.signal_for(key) {
            self.keys_down.insert(key.to_string());
            self.press(signal);
        }
    }

    pub fn key_up(&mut self, key: &str) {
        let Some(signal) = self.bindings.signal_for(key) else {
            return;
        };
        self.keys_down.remove(key);
        let still_down = self
            .keys_down
            .iter()
            .any(|k| self.bindings.signal_for(k) == Some(signal));
        if !still_down {
            self.release(signal);
        }
    }

    /// Touch on the left half of the viewport steers left, right half right
    pub fn touch_start(&mut self, client_x: f32, viewport_width: f32) {
        let signal = if client_x < viewport_width / 2.0 {
            Signal::MoveLeft
        } else {
            Signal::MoveRight
        };
        self.press(signal);
    }

    pub fn touch_end(&mut self) {
        self.release(Signal::MoveLeft);
        self.release(Signal::MoveRight);
    }

    /// Number of held signals
    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl InputSource for InputState {
    fn is_active(&self, signal: Signal) -> bool {
        self.held.contains(&signal)
    }
}

/// A fixed set of held signals (scripted runs and tests)
impl InputSource for [Signal] {
    fn is_active(&self, signal: Signal) -> bool {
        self.contains(&signal)
    }
}
