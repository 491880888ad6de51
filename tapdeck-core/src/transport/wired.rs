//! 5-pin din / trs serial midi

use crate::{MidiEvent, MidiOut};
use embedded_io::Write;

/// standard midi line rate, 8 data bits, no parity, 1 stop bit
pub const BAUD_RATE: u32 = 31_250;
pub const DATA_BITS: u8 = 8;
pub const STOP_BITS: u8 = 1;

/// fire-and-forget byte sink; detached until a writer is attached
pub struct Wired<W: Write> {
    writer: Option<W>,
}

impl<W: Write> Wired<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    /// uninitialized port; every send is dropped
    pub fn detached() -> Self {
        Self { writer: None }
    }

    pub fn attach(&mut self, writer: W) {
        self.writer = Some(writer);
    }

    pub fn is_attached(&self) -> bool {
        self.writer.is_some()
    }

    pub fn writer(&self) -> Option<&W> {
        self.writer.as_ref()
    }
}

impl<W: Write> MidiOut for Wired<W> {
    fn send(&mut self, event: MidiEvent) {
        if let Some(writer) = self.writer.as_mut() {
            // no acknowledgement on a serial line; a failed write is a lost message
            let _ = writer.write_all(&event.encode());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Bytes(Vec<u8>);

    impl embedded_io::ErrorType for Bytes {
        type Error = Infallible;
    }

    impl Write for Bytes {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn writes_one_triple_per_event() {
        let mut wired = Wired::new(Bytes::default());
        wired.send(MidiEvent::note_on(0, 60, 127));
        wired.send(MidiEvent::note_off(0, 60));
        assert_eq!(wired.writer().unwrap().0, [0x90, 60, 127, 0x80, 60, 0]);
    }

    #[test]
    fn detached_port_drops_everything() {
        let mut wired = Wired::<Bytes>::detached();
        wired.send(MidiEvent::note_on(0, 60, 127));
        assert!(!wired.is_attached());
        wired.attach(Bytes::default());
        wired.send(MidiEvent::control_change(1, 7, 100));
        assert_eq!(wired.writer().unwrap().0, [0xb1, 7, 100]);
    }
}
