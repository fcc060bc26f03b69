//! Per-node status words.
//!
//! Every node keeps its flags in one byte, high bits first, so the
//! word can be logged and compared as a unit:
//!
//! | Node      | 0x80            | 0x40                 | 0x20             | 0x10             |
//! |-----------|-----------------|----------------------|------------------|------------------|
//! | central   | `ALARM_ACTIVE`  | `AUTO_OPENING`       | `GATE_UNLOCKED`  |                  |
//! | gate/door | `ALARM_ACTIVE`  | `AUTO_OPENING`       | `UNLOCKED`       |                  |
//! | bathroom  | `SHOWER_ACTIVE` | `VENTILATION_ACTIVE` | `LOWER_EXCEEDED` | `UPPER_EXCEEDED` |
//! | kitchen   | `CAMERA_ON`     |                      |                  |                  |

use core::fmt;
use core::marker::PhantomData;

/// A named bit in a status word.
pub trait Flag: Copy + 'static {
    /// Every flag of this kind, in bit order.
    const ALL: &'static [Self];

    fn mask(self) -> u8;

    fn name(self) -> &'static str;
}

/// Strongly typed bitset of `F` flags.  Starts cleared.
pub struct StatusWord<F> {
    bits: u8,
    _flags: PhantomData<F>,
}

impl<F: Flag> StatusWord<F> {
    pub const fn new() -> Self {
        Self {
            bits: 0,
            _flags: PhantomData,
        }
    }

    pub fn contains(&self, flag: F) -> bool {
        self.bits & flag.mask() != 0
    }

    /// Set a flag.  Returns `true` if it was clear.
    pub fn insert(&mut self, flag: F) -> bool {
        let was_clear = !self.contains(flag);
        self.bits |= flag.mask();
        was_clear
    }

    /// Clear a flag.  Returns `true` if it was set.
    pub fn remove(&mut self, flag: F) -> bool {
        let was_set = self.contains(flag);
        self.bits &= !flag.mask();
        was_set
    }

    /// Flip a flag and return its new value.
    pub fn toggle(&mut self, flag: F) -> bool {
        self.bits ^= flag.mask();
        self.contains(flag)
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl<F: Flag> Default for StatusWord<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Clone for StatusWord<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for StatusWord<F> {}

impl<F> PartialEq for StatusWord<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<F> Eq for StatusWord<F> {}

impl<F: Flag> fmt::Debug for StatusWord<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x} [", self.bits)?;
        let mut first = true;
        for flag in F::ALL.iter().filter(|flag| self.contains(**flag)) {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(flag.name())?;
            first = false;
        }
        f.write_str("]")
    }
}

// ── Flag sets ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CentralFlag {
    AlarmActive = 0x80,
    AutoOpening = 0x40,
    GateUnlocked = 0x20,
}

impl Flag for CentralFlag {
    const ALL: &'static [Self] = &[Self::AlarmActive, Self::AutoOpening, Self::GateUnlocked];

    fn mask(self) -> u8 {
        self as u8
    }

    fn name(self) -> &'static str {
        match self {
            Self::AlarmActive => "ALARM_ACTIVE",
            Self::AutoOpening => "AUTO_OPENING",
            Self::GateUnlocked => "GATE_UNLOCKED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SatelliteFlag {
    AlarmActive = 0x80,
    AutoOpening = 0x40,
    /// Gate unlocked, or door garden lights on.
    Unlocked = 0x20,
}

impl Flag for SatelliteFlag {
    const ALL: &'static [Self] = &[Self::AlarmActive, Self::AutoOpening, Self::Unlocked];

    fn mask(self) -> u8 {
        self as u8
    }

    fn name(self) -> &'static str {
        match self {
            Self::AlarmActive => "ALARM_ACTIVE",
            Self::AutoOpening => "AUTO_OPENING",
            Self::Unlocked => "UNLOCKED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BathroomFlag {
    ShowerActive = 0x80,
    VentilationActive = 0x40,
    LowerExceeded = 0x20,
    UpperExceeded = 0x10,
}

impl Flag for BathroomFlag {
    const ALL: &'static [Self] = &[
        Self::ShowerActive,
        Self::VentilationActive,
        Self::LowerExceeded,
        Self::UpperExceeded,
    ];

    fn mask(self) -> u8 {
        self as u8
    }

    fn name(self) -> &'static str {
        match self {
            Self::ShowerActive => "SHOWER_ACTIVE",
            Self::VentilationActive => "VENTILATION_ACTIVE",
            Self::LowerExceeded => "LOWER_EXCEEDED",
            Self::UpperExceeded => "UPPER_EXCEEDED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KitchenFlag {
    CameraOn = 0x80,
}

impl Flag for KitchenFlag {
    const ALL: &'static [Self] = &[Self::CameraOn];

    fn mask(self) -> u8 {
        self as u8
    }

    fn name(self) -> &'static str {
        "CAMERA_ON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared() {
        let word = StatusWord::<CentralFlag>::new();
        assert!(word.is_empty());
        assert!(!word.contains(CentralFlag::AlarmActive));
    }

    #[test]
    fn insert_and_remove_report_changes() {
        let mut word = StatusWord::<BathroomFlag>::new();
        assert!(word.insert(BathroomFlag::ShowerActive));
        assert!(!word.insert(BathroomFlag::ShowerActive));
        assert_eq!(word.bits(), 0x80);
        assert!(word.remove(BathroomFlag::ShowerActive));
        assert!(!word.remove(BathroomFlag::ShowerActive));
    }

    #[test]
    fn toggle_flips() {
        let mut word = StatusWord::<CentralFlag>::new();
        assert!(word.toggle(CentralFlag::GateUnlocked));
        assert!(!word.toggle(CentralFlag::GateUnlocked));
    }

    #[test]
    fn debug_lists_set_flags() {
        let mut word = StatusWord::<SatelliteFlag>::new();
        word.insert(SatelliteFlag::AlarmActive);
        word.insert(SatelliteFlag::Unlocked);
        assert_eq!(format!("{word:?}"), "0xa0 [ALARM_ACTIVE | UNLOCKED]");
    }
}
