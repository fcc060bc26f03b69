//! Outbound application events.
//!
//! Nodes emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them: print
//! them on the operator console, or record them in tests.

use core::fmt;

use heapless::Vec;

use crate::error::Rejection;
use crate::nodes::central::UserCommand;
use crate::transport::NodeId;
use crate::transport::wire::Message;

/// One line of the central's available-commands menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    AlarmActivate,
    AlarmDeactivate,
    GateLock,
    GateUnlock,
    AutoOpen,
    ReadTemperature,
    ReadLight,
    ChangeThreshold,
}

impl MenuEntry {
    /// Click count that issues this entry, `None` for the serial-only entry.
    pub const fn clicks(self) -> Option<u8> {
        match self {
            Self::AlarmActivate | Self::AlarmDeactivate => Some(1),
            Self::GateLock | Self::GateUnlock => Some(2),
            Self::AutoOpen => Some(3),
            Self::ReadTemperature => Some(4),
            Self::ReadLight => Some(5),
            Self::ChangeThreshold => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AlarmActivate => "ALARM ACTIVATE",
            Self::AlarmDeactivate => "ALARM DEACTIVATE",
            Self::GateLock => "GATE LOCK",
            Self::GateUnlock => "GATE UNLOCK",
            Self::AutoOpen => "OPEN AND AUTOMATICALLY CLOSE GATE AND DOOR",
            Self::ReadTemperature => "OBTAIN TEMPERATURE MEAN VALUE",
            Self::ReadLight => "OBTAIN EXTERNAL LIGHT CURRENT VALUE",
            Self::ChangeThreshold => "CHANGE FIRE DETECTION THRESHOLD VIA SERIAL INPUT",
        }
    }
}

impl fmt::Display for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clicks() {
            Some(n) => write!(f, "{n}. {}", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// Commands currently available to the operator.
pub type Menu = Vec<MenuEntry, 6>;

/// Structured events emitted by the nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // ── Lifecycle ─────────────────────────────────────────
    /// A node finished its start-up sequence.
    Started(NodeId),

    // ── Central: operator commands ────────────────────────
    /// A click sequence was accepted and executed.
    CommandAccepted(UserCommand),
    /// A command was refused; the status word is unchanged.
    InvalidCommand(Rejection),
    /// The dispatcher's mailbox was full and the click sequence was lost.
    CommandDropped,
    /// Menu derived from the central's status word.
    AvailableCommands(Menu),
    /// The central forwarded a new fire threshold to the kitchen.
    ThresholdForwarded(i32),

    // ── Central: reports ──────────────────────────────────
    LightReport(u16),
    TemperatureReport(i16),
    FireAlarm { temperature: i16 },
    AutoOpenFinished { from: NodeId },

    // ── Transport ─────────────────────────────────────────
    /// A reliable send was refused because one is still in flight.
    TransportBusy { node: NodeId, message: Message },
    /// A reliable send gave up.
    TransmissionTimedOut {
        node: NodeId,
        to: NodeId,
        message: Message,
        attempts: u8,
    },

    // ── Gate / door ───────────────────────────────────────
    AlarmChanged { node: NodeId, active: bool },
    AutoOpeningChanged { node: NodeId, active: bool },
    /// Gate unlocked or door garden lights on.
    UnlockedChanged { node: NodeId, unlocked: bool },
    TemperatureSampled { node: NodeId, celsius: i16 },

    // ── Bathroom ──────────────────────────────────────────
    ShowerChanged(bool),
    VentilationChanged(bool),
    HumidityChanged(u8),

    // ── Kitchen ───────────────────────────────────────────
    KitchenTemperature(i16),
    CameraChanged(bool),
    JumpArmed(u16),
    WarningThresholdChanged(u16),
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started(node) => write!(f, "{node} started"),
            Self::CommandAccepted(cmd) => write!(f, "command {cmd}"),
            Self::InvalidCommand(reason) => write!(f, "Invalid command ({reason})"),
            Self::CommandDropped => {
                f.write_str("It was not possible to issue the command. Try again later")
            }
            Self::AvailableCommands(menu) => {
                f.write_str("Available commands are:")?;
                for entry in menu {
                    write!(f, "\n  {entry}")?;
                }
                Ok(())
            }
            Self::ThresholdForwarded(n) => write!(f, "fire threshold {n} sent to kitchen"),
            Self::LightReport(v) => write!(f, "External light is {v}"),
            Self::TemperatureReport(v) => write!(f, "Temperature mean value is {v}"),
            Self::FireAlarm { temperature } => {
                write!(f, "A FIRE HAS BEEN DETECTED! TEMPERATURE {temperature}")
            }
            Self::AutoOpenFinished { from } => write!(f, "{} closed", from.name()),
            Self::TransportBusy { node, message } => write!(
                f,
                "{}: cannot send {message}, previous transmission in flight",
                node.name()
            ),
            Self::TransmissionTimedOut {
                node,
                to,
                message,
                attempts,
            } => write!(
                f,
                "{}: {message} to {to} timed out after {attempts} attempts",
                node.name()
            ),
            Self::AlarmChanged { node, active } => {
                write!(f, "{}: alarm {}", node.name(), on_off(*active))
            }
            Self::AutoOpeningChanged { node, active } => {
                write!(f, "{}: automatic opening {}", node.name(), on_off(*active))
            }
            Self::UnlockedChanged { node, unlocked } => match node {
                NodeId::Door => write!(f, "door: garden lights {}", on_off(*unlocked)),
                _ => write!(
                    f,
                    "{}: {}",
                    node.name(),
                    if *unlocked { "unlocked" } else { "locked" }
                ),
            },
            Self::TemperatureSampled { node, celsius } => {
                write!(f, "{}: sampled {celsius} C", node.name())
            }
            Self::ShowerChanged(on) => write!(f, "bathroom: shower {}", on_off(*on)),
            Self::VentilationChanged(on) => write!(f, "bathroom: ventilation {}", on_off(*on)),
            Self::HumidityChanged(h) => write!(f, "bathroom: humidity {h}%"),
            Self::KitchenTemperature(t) => write!(f, "kitchen: temperature {t} C"),
            Self::CameraChanged(on) => write!(f, "kitchen: camera {}", on_off(*on)),
            Self::JumpArmed(j) => write!(f, "kitchen: next sample +{j} C"),
            Self::WarningThresholdChanged(t) => write!(f, "kitchen: fire threshold {t} C"),
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
