//! Central dispatcher driving the satellites through the radio.

use homenet::app::events::{AppEvent, MenuEntry};
use homenet::error::Rejection;
use homenet::nodes::central::UserCommand;
use homenet::nodes::status::{CentralFlag, KitchenFlag, SatelliteFlag};
use homenet::transport::NodeId;

use crate::mock_hw::{click, network};

#[test]
fn alarm_toggle_reaches_gate_and_door() {
    let mut net = network();
    click(&mut net, 1);

    assert!(net.central().node().status().contains(CentralFlag::AlarmActive));
    for node in [NodeId::Gate, NodeId::Door] {
        assert!(net.sink().contains(&AppEvent::AlarmChanged { node, active: true }));
    }
    assert!(net.gate().node().is_alarm_blinking());
    assert!(net.door().node().is_alarm_blinking());
    assert_eq!(net.sink().last_menu().unwrap().as_slice(), &[MenuEntry::AlarmDeactivate]);

    click(&mut net, 1);
    assert!(net.central().node().status().is_empty());
    assert!(!net.gate().node().status().contains(SatelliteFlag::AlarmActive));
    assert!(!net.door().node().is_alarm_blinking());
    // red only once the alarm is off
    assert!(net.led_state(NodeId::Gate).red);
    assert!(!net.led_state(NodeId::Gate).blue);
}

#[test]
fn gate_unlock_is_acknowledged() {
    let mut net = network();
    click(&mut net, 2);

    assert!(net.central().node().status().contains(CentralFlag::GateUnlocked));
    assert!(net.gate().node().status().contains(SatelliteFlag::Unlocked));
    assert!(net.led_state(NodeId::Gate).green);
    assert!(!net.central().link().is_transmitting());
    assert_eq!(net.sink().last_menu().unwrap()[1], MenuEntry::GateLock);

    click(&mut net, 2);
    assert!(!net.gate().node().status().contains(SatelliteFlag::Unlocked));
    assert!(net.led_state(NodeId::Gate).red);
}

#[test]
fn auto_open_finishes_on_first_stop() {
    let mut net = network();
    click(&mut net, 3);
    assert!(net.central().node().status().contains(CentralFlag::AutoOpening));
    assert!(net.gate().node().is_opening());
    assert!(net.door().node().is_opening());

    // a second auto-open while the first one runs is refused
    click(&mut net, 3);
    assert!(net.sink().contains(&AppEvent::InvalidCommand(Rejection::AutoOpening)));

    net.advance(20_000);
    assert!(!net.central().node().status().contains(CentralFlag::AutoOpening));
    assert!(net.sink().contains(&AppEvent::AutoOpenFinished { from: NodeId::Gate }));
    assert!(net.door().node().is_opening());

    net.advance(20_000);
    assert!(!net.door().node().is_opening());
    let finished = net
        .sink()
        .count(|e| matches!(e, AppEvent::AutoOpenFinished { .. }));
    assert_eq!(finished, 1);
}

#[test]
fn reads_light_and_temperature() {
    let mut net = network();
    net.sensors_mut().set_light(512);
    click(&mut net, 5);
    assert!(net.sink().contains(&AppEvent::LightReport(512)));

    net.sensors_mut().set_temperature(25);
    // five door samples fill the window
    net.advance(50_000);
    click(&mut net, 4);
    assert!(net.sink().contains(&AppEvent::TemperatureReport(25)));
}

#[test]
fn reads_refused_during_alarm() {
    let mut net = network();
    click(&mut net, 1);
    click(&mut net, 5);
    assert!(net.sink().contains(&AppEvent::InvalidCommand(Rejection::AlarmActive)));
    assert!(!net.sink().contains(&AppEvent::CommandAccepted(UserCommand::ReadLight)));
}

#[test]
fn confirmed_fire_raises_alarm_everywhere() {
    let mut net = network();
    net.sensors_mut().set_temperature(48);
    net.advance(10_000);
    assert!(net.kitchen().node().status().contains(KitchenFlag::CameraOn));

    net.advance(1000);
    net.press_button(NodeId::Kitchen);
    net.advance(200);

    assert!(net.sink().contains(&AppEvent::FireAlarm { temperature: 48 }));
    assert!(net.central().node().status().contains(CentralFlag::AlarmActive));
    assert!(net.gate().node().status().contains(SatelliteFlag::AlarmActive));
    assert!(net.door().node().status().contains(SatelliteFlag::AlarmActive));
    // CameraOff from the central ended the camera
    assert!(net.kitchen().node().camera().is_none());
    assert!(!net.kitchen().node().status().contains(KitchenFlag::CameraOn));
}
