//! ble midi over a gatt notify characteristic

use crate::{Link, MidiEvent, MidiOut};

pub const SERVICE_UUID: &str = "03b80e5a-ede8-4b33-a751-6ce34ec4c700";
pub const CHARACTERISTIC_UUID: &str = "7772e5db-3868-4112-a1a9-f2669d106bf3";

/// profile header byte; timestamp high bits left zero
pub const HEADER: u8 = 0x80;
/// profile timestamp byte; timestamp low bits left zero
pub const TIMESTAMP: u8 = 0x80;
pub const PACKET_LEN: usize = 5;

/// platform characteristic; must not block when no peer is subscribed
pub trait Notify {
    fn notify(&mut self, packet: &[u8]);
}

/// `[header, timestamp, status, data1, data2]`
pub fn packet(event: &MidiEvent) -> [u8; PACKET_LEN] {
    let [status, data1, data2] = event.encode();
    [HEADER, TIMESTAMP, status, data1, data2]
}

pub struct Wireless<'a, N: Notify> {
    link: &'a Link,
    notify: N,
}

impl<'a, N: Notify> Wireless<'a, N> {
    pub fn new(link: &'a Link, notify: N) -> Self {
        Self { link, notify }
    }

    pub fn notifier(&self) -> &N {
        &self.notify
    }
}

impl<N: Notify> MidiOut for Wireless<'_, N> {
    fn send(&mut self, event: MidiEvent) {
        if self.link.is_connected() {
            self.notify.notify(&packet(&event));
        }
    }
}
