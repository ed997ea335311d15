use crate::events::{DrawEvent, EventSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor};
use std::sync::Arc;

/// Combinable interaction mode stored as a raw bitmask.
///
/// Bits outside [`Mode::ALL`] are carried as-is and never match a named flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(u32);

impl Mode {
    pub const NONE: Mode = Mode(0);
    pub const CREATE: Mode = Mode(1);
    pub const EDIT: Mode = Mode(2);
    pub const DELETE: Mode = Mode(4);
    pub const APPEND: Mode = Mode(8);
    pub const EDIT_APPEND: Mode = Mode(Self::EDIT.0 | Self::APPEND.0);
    pub const ALL: Mode = Mode(Self::CREATE.0 | Self::EDIT.0 | Self::DELETE.0 | Self::APPEND.0);

    const NAMED: [(Mode, &'static str); 4] = [
        (Mode::CREATE, "create"),
        (Mode::EDIT, "edit"),
        (Mode::DELETE, "delete"),
        (Mode::APPEND, "append"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Mode(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Mode) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Names of the flags set in this mode, in flag order.
    pub fn flag_names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.intersects(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Container class name for every named flag with its on/off state.
    pub fn class_names(self) -> impl Iterator<Item = (String, bool)> {
        Self::NAMED
            .into_iter()
            .map(move |(flag, name)| (format!("mode-{name}"), self.intersects(flag)))
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

impl BitAnd for Mode {
    type Output = Mode;

    fn bitand(self, rhs: Mode) -> Mode {
        Mode(self.0 & rhs.0)
    }
}

impl BitXor for Mode {
    type Output = Mode;

    fn bitxor(self, rhs: Mode) -> Mode {
        Mode(self.0 ^ rhs.0)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.flag_names();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// Owner of a map's current mode. Every write emits [`DrawEvent::Mode`].
pub struct ModeRegister {
    mode: Mode,
    sink: Arc<dyn EventSink>,
}

impl ModeRegister {
    pub fn new(initial: Mode, sink: Arc<dyn EventSink>) -> Self {
        Self {
            mode: initial,
            sink,
        }
    }

    pub fn get(&self) -> Mode {
        self.mode
    }

    pub fn set(&mut self, mode: Mode) -> Mode {
        self.mode = mode;
        tracing::debug!(mode = %mode, bits = mode.bits(), "mode changed");
        self.sink.dispatch(DrawEvent::Mode { mode });
        mode
    }

    pub fn is_disabled(&self, test: Mode) -> bool {
        !self.mode.intersects(test)
    }

    /// Enables `test` when none of its bits are set, otherwise clears them.
    pub fn toggle(&mut self, test: Mode) -> Mode {
        if self.is_disabled(test) {
            self.set(self.mode | test)
        } else {
            self.set(self.mode ^ test)
        }
    }

    pub fn set_only(&mut self, test: Mode) -> Mode {
        self.set(Mode::NONE | test)
    }
}
