//! Three-channel indicator LED bank.
//!
//! Red, green and blue LEDs are driven through `embedded-hal`
//! [`OutputPin`]s.  The bank mirrors the last written level of every
//! channel so nodes can query LED state without touching the pins.
//!
//! On host builds the pins are [`SimPin`]s that only record their level.

use core::convert::Infallible;
use core::fmt;

use embedded_hal::digital::{ErrorType, OutputPin, PinState, StatefulOutputPin};
use log::warn;

use crate::app::ports::IndicatorPort;

/// Indicator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Red,
    Green,
    Blue,
}

impl Led {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// In-memory output pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimPin {
    high: bool,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }
}

/// Point-in-time LED levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedState {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            mark(self.red, 'R'),
            mark(self.green, 'G'),
            mark(self.blue, 'B')
        )
    }
}

pub struct LedBank<P = SimPin> {
    pins: [P; 3],
    levels: [bool; 3],
}

impl LedBank<SimPin> {
    /// All LEDs off.
    pub fn new() -> Self {
        Self::with_pins([SimPin::default(); 3])
    }
}

impl Default for LedBank<SimPin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin> LedBank<P> {
    /// Take ownership of the red, green and blue pins and drive them low.
    pub fn with_pins(pins: [P; 3]) -> Self {
        let mut bank = Self {
            pins,
            levels: [false; 3],
        };
        bank.set_all(false);
        bank
    }

    pub fn state(&self) -> LedState {
        LedState {
            red: self.levels[Led::Red.index()],
            green: self.levels[Led::Green.index()],
            blue: self.levels[Led::Blue.index()],
        }
    }

    /// Direct access to a pin, e.g. to read back a stateful pin.
    pub fn pin_mut(&mut self, led: Led) -> &mut P {
        &mut self.pins[led.index()]
    }
}

impl<P: OutputPin> IndicatorPort for LedBank<P> {
    fn set_indicator(&mut self, led: Led, on: bool) {
        let i = led.index();
        if self.pins[i].set_state(PinState::from(on)).is_err() {
            warn!("LED {:?}: pin write failed", led);
            return;
        }
        self.levels[i] = on;
    }

    fn is_on(&self, led: Led) -> bool {
        self.levels[led.index()]
    }
}
