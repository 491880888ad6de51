//! simulated ble stack; owns the peer and calls back into the link from its
//! own thread, like the platform radio would

use crate::tui;
use midly::{live::LiveEvent, MidiMessage};
use std::{
    sync::mpsc::{Receiver, Sender},
    thread::JoinHandle,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tapdeck_core::{
    transport::wireless::{Notify, PACKET_LEN},
    Link,
};
use tinyrand::{Rand, Seeded, Wyrand};

/// upper bound of the simulated advertising/pairing delay
const MAX_LATENCY_MS: usize = 250;

pub enum Cmd {
    Connect,
    Disconnect,
    Packet([u8; PACKET_LEN]),
    Quit,
}

/// the notify characteristic; hands packets to the radio thread
pub struct Notifier {
    tx: Sender<Cmd>,
}

impl Notifier {
    pub fn new(tx: Sender<Cmd>) -> Self {
        Self { tx }
    }
}

impl Notify for Notifier {
    fn notify(&mut self, packet: &[u8]) {
        if let Ok(packet) = packet.try_into() {
            // a gone radio thread is a gone peer
            let _ = self.tx.send(Cmd::Packet(packet));
        }
    }
}

pub fn spawn(link: &'static Link, rx: Receiver<Cmd>, tui_tx: Sender<tui::Cmd>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0xb1e);
        let mut rand = Wyrand::seed(seed);
        while let Ok(cmd) = rx.recv() {
            match cmd {
                Cmd::Connect => {
                    let latency = rand.next_lim_usize(MAX_LATENCY_MS) as u64;
                    std::thread::sleep(Duration::from_millis(latency));
                    link.on_connect();
                }
                Cmd::Disconnect => link.on_disconnect(),
                Cmd::Packet(packet) => {
                    if tui_tx.send(tui::Cmd::Peer(describe(&packet))).is_err() {
                        break;
                    }
                }
                Cmd::Quit => break,
            }
        }
    })
}

/// what the peer would make of one notification
pub fn describe(packet: &[u8; PACKET_LEN]) -> String {
    let [header, timestamp, body @ ..] = packet;
    if header & 0x80 == 0 || timestamp & 0x80 == 0 {
        return format!("bad header {:02x} {:02x}", header, timestamp);
    }
    match LiveEvent::parse(body) {
        Ok(LiveEvent::Midi { channel, message }) => {
            let channel = channel.as_int() + 1;
            match message {
                MidiMessage::NoteOn { key, vel } => {
                    format!("ch{:<2} on  {:>3} {:>3}", channel, key.as_int(), vel.as_int())
                }
                MidiMessage::NoteOff { key, .. } => {
                    format!("ch{:<2} off {:>3}", channel, key.as_int())
                }
                MidiMessage::Controller { controller, value } => {
                    format!(
                        "ch{:<2} cc  {:>3} {:>3}",
                        channel,
                        controller.as_int(),
                        value.as_int()
                    )
                }
                other => format!("ch{:<2} {:?}", channel, other),
            }
        }
        Ok(other) => format!("{:?}", other),
        Err(e) => format!("undecodable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapdeck_core::{transport::wireless::packet, MidiEvent};

    #[test]
    fn describes_what_the_wireless_transport_sends() {
        assert_eq!(
            describe(&packet(&MidiEvent::note_on(0, 60, 127))),
            "ch1  on   60 127"
        );
        assert_eq!(
            describe(&packet(&MidiEvent::note_off(15, 48))),
            "ch16 off  48"
        );
        assert_eq!(
            describe(&packet(&MidiEvent::control_change(0, 1, 64))),
            "ch1  cc    1  64"
        );
    }

    #[test]
    fn rejects_missing_header_bit() {
        assert!(describe(&[0x00, 0x80, 0x90, 60, 100]).starts_with("bad header"));
    }

    #[test]
    fn notifier_forwards_whole_packets_only() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut notifier = Notifier::new(tx);
        notifier.notify(&[0x80, 0x80, 0x90, 60, 100]);
        notifier.notify(&[0x90, 60]);
        drop(notifier);
        let packets: Vec<_> = rx
            .iter()
            .filter_map(|cmd| match cmd {
                Cmd::Packet(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(packets, [[0x80, 0x80, 0x90, 60, 100]]);
    }
}
