//! Gate and door behaviour inside a running network.

use homenet::app::events::AppEvent;
use homenet::nodes::status::SatelliteFlag;
use homenet::transport::NodeId;

use crate::mock_hw::{click, network};

#[test]
fn door_button_toggles_garden_lights() {
    let mut net = network();
    net.press_button(NodeId::Door);
    assert!(net.door().node().status().contains(SatelliteFlag::Unlocked));
    assert!(net.led_state(NodeId::Door).green);
    assert!(net.sink().contains(&AppEvent::UnlockedChanged {
        node: NodeId::Door,
        unlocked: true
    }));

    // the gate has no button
    net.press_button(NodeId::Gate);
    assert!(net.gate().node().status().is_empty());
}

#[test]
fn door_button_ignored_during_alarm() {
    let mut net = network();
    click(&mut net, 1);
    net.press_button(NodeId::Door);
    assert!(!net.door().node().status().contains(SatelliteFlag::Unlocked));
}

#[test]
fn alarm_during_opening_freezes_the_blink() {
    let mut net = network();
    click(&mut net, 3);
    net.advance(2000);
    click(&mut net, 1);
    assert!(net.gate().node().status().contains(SatelliteFlag::AlarmActive));
    assert!(net.gate().node().status().contains(SatelliteFlag::AutoOpening));

    // the opening still runs to its end and reports back
    net.advance(20_000);
    assert!(!net.gate().node().status().contains(SatelliteFlag::AutoOpening));
    assert!(net.sink().contains(&AppEvent::AutoOpenFinished { from: NodeId::Gate }));
}

#[test]
fn door_samples_every_ten_seconds() {
    let mut net = network();
    net.sensors_mut().set_temperature(19);
    net.advance(30_000);
    let sampled = net
        .sink()
        .count(|e| matches!(e, AppEvent::TemperatureSampled { node: NodeId::Door, celsius: 19 }));
    assert_eq!(sampled, 3);
    assert_eq!(net.door().node().role().samples().total_samples(), 3);
}

#[test]
fn gate_shows_temporary_unlock_while_opening() {
    let mut net = network();
    click(&mut net, 3);
    net.advance(4000);
    assert!(!net.gate().node().status().contains(SatelliteFlag::Unlocked));
    assert!(net.led_state(NodeId::Gate).green);
    assert!(!net.led_state(NodeId::Gate).red);

    net.advance(20_000);
    assert!(net.led_state(NodeId::Gate).red);
    assert!(!net.led_state(NodeId::Gate).green);
}
