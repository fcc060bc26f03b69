//! Radio reachability and the reliable-send discipline end to end.

use homenet::app::events::AppEvent;
use homenet::config::NetworkConfig;
use homenet::nodes::status::{CentralFlag, SatelliteFlag};
use homenet::operator::OperatorInput;
use homenet::transport::NodeId;
use homenet::transport::wire::Message;

use crate::mock_hw::{click, network, network_with};

#[test]
fn broadcast_reaches_only_gate_and_door() {
    let mut net = network();
    click(&mut net, 1);

    let stats = net.radio().stats();
    assert_eq!(stats.transmitted, 1);
    assert_eq!(stats.delivered, 2);
    assert_eq!(stats.lost, 0);
}

#[test]
fn lost_acks_cause_duplicates_then_timeout() {
    let mut config = NetworkConfig::lossless();
    config.radio.ack_loss_percent = 100;
    let mut net = network_with(&config);

    click(&mut net, 2);
    // the gate got the command even though the central never heard back
    assert!(net.gate().node().status().contains(SatelliteFlag::Unlocked));
    assert!(net.central().link().is_transmitting());

    net.advance(10_000);
    assert!(!net.central().link().is_transmitting());
    let max = config.link.max_retransmissions;
    assert!(net.sink().contains(&AppEvent::TransmissionTimedOut {
        node: NodeId::Central,
        to: NodeId::Gate,
        message: Message::GateUnlock,
        attempts: 1 + max,
    }));

    // every copy reached the gate, every ACK was lost
    let stats = net.radio().stats();
    assert_eq!(stats.lost, u32::from(1 + max));
    assert_eq!(stats.delivered, u32::from(1 + max));
}

#[test]
fn lost_data_times_out_without_effect() {
    let mut config = NetworkConfig::lossless();
    config.radio.data_loss_percent = 100;
    let mut net = network_with(&config);

    click(&mut net, 2);
    net.advance(10_000);

    // the central toggled when the send was accepted; the gate never heard
    assert!(net.central().node().status().contains(CentralFlag::GateUnlocked));
    assert!(!net.gate().node().status().contains(SatelliteFlag::Unlocked));
    assert_eq!(
        net.sink()
            .count(|e| matches!(e, AppEvent::TransmissionTimedOut { .. })),
        1
    );
}

#[test]
fn busy_link_rejects_second_send() {
    let mut config = NetworkConfig::lossless();
    config.radio.data_loss_percent = 100;
    let mut net = network_with(&config);

    click(&mut net, 5);
    click(&mut net, 2);
    assert!(net.sink().contains(&AppEvent::TransportBusy {
        node: NodeId::Central,
        message: Message::GateUnlock,
    }));
    assert!(!net.central().node().status().contains(CentralFlag::GateUnlocked));
}

#[test]
fn bathroom_is_off_the_air() {
    let mut net = network();
    net.apply(OperatorInput::SetHumidity(70));
    net.press_button(NodeId::Bathroom);
    net.advance(10_000);
    assert_eq!(net.radio().stats().transmitted, 0);
}

#[test]
fn quit_stops_the_operator_loop() {
    let mut net = network();
    assert!(net.apply(OperatorInput::Status));
    assert!(!net.apply(OperatorInput::Quit));
    let text = net.snapshot().to_string();
    assert!(text.contains("bathroom"));
    assert!(text.contains("radio"));
}
