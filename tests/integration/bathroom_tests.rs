//! Bathroom humidity automation driven from the operator side.

use homenet::app::events::AppEvent;
use homenet::nodes::status::BathroomFlag;
use homenet::operator::OperatorInput;
use homenet::transport::NodeId;

use crate::mock_hw::network;

#[test]
fn shower_drives_ventilation_and_back() {
    let mut net = network();
    net.apply(OperatorInput::SetHumidity(50));
    net.entropy_mut().fallback = 5;
    net.press_button(NodeId::Bathroom);

    // 50 -> 56 -> 62
    net.advance(6000);
    let status = net.bathroom().node().status();
    assert!(status.contains(BathroomFlag::UpperExceeded));
    assert!(status.contains(BathroomFlag::VentilationActive));
    assert!(net.led_state(NodeId::Bathroom).blue);

    net.press_button(NodeId::Bathroom);
    assert!(!net.bathroom().node().is_showering());

    // -7 every three seconds until below 35
    net.advance(12_000);
    assert_eq!(net.bathroom().node().humidity(), 34);
    assert!(net.bathroom().node().status().is_empty());
    assert!(!net.led_state(NodeId::Bathroom).green);
    assert!(!net.led_state(NodeId::Bathroom).blue);
    assert!(net.sink().contains(&AppEvent::VentilationChanged(false)));
}

#[test]
fn humidity_steps_are_reported() {
    let mut net = network();
    net.apply(OperatorInput::SetHumidity(20));
    net.press_button(NodeId::Bathroom);
    net.advance(9000);
    for h in [21, 22, 23] {
        assert!(net.sink().contains(&AppEvent::HumidityChanged(h)));
    }
    assert!(!net.bathroom().node().status().contains(BathroomFlag::LowerExceeded));
}
