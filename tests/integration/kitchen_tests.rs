//! Kitchen fire detection and threshold changes.

use homenet::app::events::AppEvent;
use homenet::error::Rejection;
use homenet::nodes::status::{CentralFlag, KitchenFlag};
use homenet::operator::OperatorInput;
use homenet::transport::NodeId;

use crate::mock_hw::{click, network};

#[test]
fn threshold_change_reaches_kitchen() {
    let mut net = network();
    net.apply(OperatorInput::Threshold(30));
    net.advance(100);
    assert_eq!(net.kitchen().node().warning_threshold(), 30);
    assert!(net.sink().contains(&AppEvent::ThresholdForwarded(30)));
    assert!(net.sink().contains(&AppEvent::WarningThresholdChanged(30)));
}

#[test]
fn non_positive_threshold_is_ignored_by_kitchen() {
    let mut net = network();
    net.apply(OperatorInput::Threshold(-4));
    net.advance(100);
    assert!(net.sink().contains(&AppEvent::ThresholdForwarded(-4)));
    assert_eq!(net.kitchen().node().warning_threshold(), 40);
}

#[test]
fn threshold_refused_during_alarm() {
    let mut net = network();
    click(&mut net, 1);
    net.apply(OperatorInput::Threshold(30));
    net.advance(100);
    assert!(net.sink().contains(&AppEvent::InvalidCommand(Rejection::AlarmActive)));
    assert_eq!(net.kitchen().node().warning_threshold(), 40);
}

#[test]
fn kitchen_ignores_broadcasts() {
    let mut net = network();
    click(&mut net, 1);
    assert!(net.central().node().status().contains(CentralFlag::AlarmActive));
    assert!(net.kitchen().node().status().is_empty());
    assert_eq!(net.radio().stats().delivered, 2);
}

#[test]
fn jump_pushes_sample_over_threshold() {
    let mut net = network();
    net.apply(OperatorInput::SetTemperature(21));
    net.entropy_mut().push(25);
    net.press_button(NodeId::Kitchen);
    assert!(net.sink().contains(&AppEvent::JumpArmed(25)));

    net.advance(10_000);
    assert!(net.sink().contains(&AppEvent::KitchenTemperature(46)));
    assert!(net.kitchen().node().status().contains(KitchenFlag::CameraOn));

    // no confirmation: the window closes by itself
    net.advance(4000);
    assert!(net.kitchen().node().camera().is_none());
    assert!(net.sink().contains(&AppEvent::CameraChanged(false)));
    assert!(!net.sink().contains(&AppEvent::FireAlarm { temperature: 46 }));
}
