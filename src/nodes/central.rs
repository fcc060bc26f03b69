//! Central dispatcher.
//!
//! The operator drives the whole home with one button: a burst of clicks
//! closed by a 4 s pause selects a command.  The dispatcher validates the
//! command against its status word, sends it to the satellites and shows
//! the commands that remain available.
//!
//! | Clicks | Command                  | Valid when                      | Sent as                 |
//! |--------|--------------------------|---------------------------------|-------------------------|
//! | 1      | toggle alarm             | always                          | broadcast `AlarmOn/Off` |
//! | 2      | toggle gate lock         | alarm off, no auto-open         | reliable → gate         |
//! | 3      | open and auto-close      | alarm off, no auto-open         | broadcast `AutoOpen`    |
//! | 4      | temperature mean         | alarm off                       | reliable → door         |
//! | 5      | external light           | alarm off                       | reliable → gate         |
//!
//! Fire reports from the kitchen force the alarm on regardless of state.

use core::fmt;

use log::{debug, info, warn};

use crate::app::events::{AppEvent, Menu, MenuEntry};
use crate::app::ports::IndicatorPort;
use crate::config::CentralConfig;
use crate::error::Rejection;
use crate::events::Mailbox;
use crate::nodes::click::{ClickCounter, ClickVerdict};
use crate::nodes::station::{Node, NodeIo};
use crate::nodes::status::{CentralFlag, StatusWord};
use crate::scheduler::Millis;
use crate::transport::NodeId;
use crate::transport::link::SendOutcome;
use crate::transport::radio::Channels;
use crate::transport::wire::Message;

/// Operator command selected by a click count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    ToggleAlarm,
    ToggleGateLock,
    AutoOpen,
    ReadTemperature,
    ReadLight,
}

impl UserCommand {
    pub const fn from_clicks(clicks: u8) -> Option<Self> {
        match clicks {
            1 => Some(Self::ToggleAlarm),
            2 => Some(Self::ToggleGateLock),
            3 => Some(Self::AutoOpen),
            4 => Some(Self::ReadTemperature),
            5 => Some(Self::ReadLight),
            _ => None,
        }
    }

    pub const fn clicks(self) -> u8 {
        match self {
            Self::ToggleAlarm => 1,
            Self::ToggleGateLock => 2,
            Self::AutoOpen => 3,
            Self::ReadTemperature => 4,
            Self::ReadLight => 5,
        }
    }
}

impl fmt::Display for UserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ToggleAlarm => "toggle alarm",
            Self::ToggleGateLock => "toggle gate lock",
            Self::AutoOpen => "open and auto-close",
            Self::ReadTemperature => "read temperature",
            Self::ReadLight => "read light",
        };
        write!(f, "{} ({} clicks)", name, self.clicks())
    }
}

/// Events handled by the dispatcher's primary routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralEvent {
    /// A click sequence closed with this many clicks.
    UserCommand(u8),
    /// A satellite reported something.
    Report { from: NodeId, message: Message },
    /// The operator asked for a new fire threshold.
    ThresholdRequest(i32),
    /// A reliable send resolved.
    SendOutcome(SendOutcome),
}

/// Menu of commands available for a given status word.
pub fn available_commands(status: StatusWord<CentralFlag>) -> Menu {
    let entries: &[MenuEntry] = if status.contains(CentralFlag::AlarmActive) {
        &[MenuEntry::AlarmDeactivate]
    } else if status.contains(CentralFlag::AutoOpening) {
        &[
            MenuEntry::AlarmActivate,
            MenuEntry::ReadTemperature,
            MenuEntry::ReadLight,
            MenuEntry::ChangeThreshold,
        ]
    } else if status.contains(CentralFlag::GateUnlocked) {
        &[
            MenuEntry::AlarmActivate,
            MenuEntry::GateLock,
            MenuEntry::AutoOpen,
            MenuEntry::ReadTemperature,
            MenuEntry::ReadLight,
            MenuEntry::ChangeThreshold,
        ]
    } else {
        &[
            MenuEntry::AlarmActivate,
            MenuEntry::GateUnlock,
            MenuEntry::AutoOpen,
            MenuEntry::ReadTemperature,
            MenuEntry::ReadLight,
            MenuEntry::ChangeThreshold,
        ]
    };
    entries.iter().copied().collect()
}

pub struct Central {
    status: StatusWord<CentralFlag>,
    clicks: ClickCounter,
}

impl Central {
    pub fn new(config: &CentralConfig) -> Self {
        Self {
            status: StatusWord::new(),
            clicks: ClickCounter::new(config.click_window_ms, config.max_clicks),
        }
    }

    pub fn status(&self) -> StatusWord<CentralFlag> {
        self.status
    }

    pub fn clicks(&self) -> &ClickCounter {
        &self.clicks
    }

    fn show_menu(&self, io: &mut NodeIo<'_>) {
        io.emit(AppEvent::AvailableCommands(available_commands(self.status)));
    }

    fn reject(&self, reason: Rejection, io: &mut NodeIo<'_>) {
        info!("central: invalid command ({})", reason);
        io.emit(AppEvent::InvalidCommand(reason));
    }

    fn execute(&mut self, clicks: u8, io: &mut NodeIo<'_>) {
        let Some(command) = UserCommand::from_clicks(clicks) else {
            self.reject(Rejection::UnknownCommand(clicks), io);
            self.show_menu(io);
            return;
        };

        match self.validate(command) {
            Err(reason) => self.reject(reason, io),
            Ok(()) => {
                info!("central: executing {}", command);
                self.dispatch(command, io);
                io.emit(AppEvent::CommandAccepted(command));
            }
        }
        self.show_menu(io);
    }

    fn validate(&self, command: UserCommand) -> Result<(), Rejection> {
        let alarm = self.status.contains(CentralFlag::AlarmActive);
        let auto = self.status.contains(CentralFlag::AutoOpening);
        match command {
            UserCommand::ToggleAlarm => Ok(()),
            UserCommand::ToggleGateLock | UserCommand::AutoOpen if alarm => {
                Err(Rejection::AlarmActive)
            }
            UserCommand::ToggleGateLock | UserCommand::AutoOpen if auto => {
                Err(Rejection::AutoOpening)
            }
            UserCommand::ReadTemperature | UserCommand::ReadLight if alarm => {
                Err(Rejection::AlarmActive)
            }
            _ => Ok(()),
        }
    }

    fn dispatch(&mut self, command: UserCommand, io: &mut NodeIo<'_>) {
        match command {
            UserCommand::ToggleAlarm => {
                if self.status.contains(CentralFlag::AlarmActive) {
                    self.status.remove(CentralFlag::AlarmActive);
                    io.broadcast(Message::AlarmOff);
                } else {
                    self.status.insert(CentralFlag::AlarmActive);
                    io.broadcast(Message::AlarmOn);
                }
            }
            UserCommand::ToggleGateLock => {
                let unlocked = self.status.contains(CentralFlag::GateUnlocked);
                let message = if unlocked {
                    Message::GateLock
                } else {
                    Message::GateUnlock
                };
                if io.reliable_send(NodeId::Gate, message).is_ok() {
                    self.status.toggle(CentralFlag::GateUnlocked);
                }
            }
            UserCommand::AutoOpen => {
                self.status.insert(CentralFlag::AutoOpening);
                io.broadcast(Message::AutoOpen);
            }
            UserCommand::ReadTemperature => {
                // Busy is reported by the io helper; nothing to undo.
                let _ = io.reliable_send(NodeId::Door, Message::ReadSensor);
            }
            UserCommand::ReadLight => {
                let _ = io.reliable_send(NodeId::Gate, Message::ReadSensor);
            }
        }
    }

    fn on_report(&mut self, from: NodeId, message: Message, io: &mut NodeIo<'_>) {
        match message {
            Message::Stop => {
                if self.status.remove(CentralFlag::AutoOpening) {
                    info!("central: automatic opening finished ({})", from.name());
                    io.emit(AppEvent::AutoOpenFinished { from });
                    self.show_menu(io);
                } else {
                    debug!("central: repeated stop from {} ignored", from.name());
                }
            }
            Message::Light(value) => io.emit(AppEvent::LightReport(value)),
            Message::Temperature(value) => io.emit(AppEvent::TemperatureReport(value)),
            Message::Fire(temperature) => {
                warn!("central: fire reported at {} C", temperature);
                io.emit(AppEvent::FireAlarm { temperature });
                self.status.insert(CentralFlag::AlarmActive);
                io.broadcast(Message::AlarmOn);
                self.show_menu(io);
                if io.reliable_send(NodeId::Kitchen, Message::CameraOff).is_err() {
                    warn!("central: camera off not sent, kitchen camera stays on");
                }
            }
            other => debug!("central: unexpected {} from {} ignored", other, from.name()),
        }
    }

    fn on_threshold_request(&mut self, value: i32, io: &mut NodeIo<'_>) {
        if self.status.contains(CentralFlag::AlarmActive) {
            self.reject(Rejection::AlarmActive, io);
            return;
        }
        if io.reliable_send(NodeId::Kitchen, Message::Threshold(value)).is_ok() {
            io.emit(AppEvent::ThresholdForwarded(value));
        }
    }
}

impl Node for Central {
    type Event = CentralEvent;

    fn id(&self) -> NodeId {
        NodeId::Central
    }

    fn channels(&self) -> Channels {
        Channels::BOTH
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        io.leds.set_all(false);
        self.show_menu(io);
    }

    fn next_deadline(&self) -> Option<Millis> {
        self.clicks.next_deadline()
    }

    fn on_timer(&mut self, io: &mut NodeIo<'_>, mailbox: &Mailbox<CentralEvent>) {
        if let Some(ClickVerdict::Complete(count)) = self.clicks.poll(io.now) {
            if !mailbox.post(CentralEvent::UserCommand(count)) {
                warn!("central: event queue full, {} clicks dropped", count);
                io.emit(AppEvent::CommandDropped);
                self.show_menu(io);
            }
        }
    }

    fn on_button(&mut self, io: &mut NodeIo<'_>, _mailbox: &Mailbox<CentralEvent>) {
        if let Some(ClickVerdict::TooMany) = self.clicks.press(io.now) {
            self.reject(Rejection::TooManyClicks, io);
            self.show_menu(io);
        }
    }

    fn on_message(&mut self, from: NodeId, message: Message) -> Option<CentralEvent> {
        Some(CentralEvent::Report { from, message })
    }

    fn on_send_outcome(&mut self, outcome: SendOutcome) -> Option<CentralEvent> {
        Some(CentralEvent::SendOutcome(outcome))
    }

    fn handle(&mut self, event: CentralEvent, io: &mut NodeIo<'_>) {
        match event {
            CentralEvent::UserCommand(clicks) => self.execute(clicks, io),
            CentralEvent::Report { from, message } => self.on_report(from, message, io),
            CentralEvent::ThresholdRequest(value) => self.on_threshold_request(value, io),
            CentralEvent::SendOutcome(SendOutcome::Delivered { .. }) => {}
            CentralEvent::SendOutcome(SendOutcome::TimedOut {
                to,
                message,
                attempts,
            }) => io.emit(AppEvent::TransmissionTimedOut {
                node: NodeId::Central,
                to,
                message,
                attempts,
            }),
        }
    }
}
