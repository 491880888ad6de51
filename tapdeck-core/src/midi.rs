//! midi events, wire encoding and transport fan-out

use crate::Error;

pub const NOTE_COUNT: u8 = 128;
pub const CHANNEL_COUNT: u8 = 16;

const DATA_MAX: u8 = 0x7f;
const CHANNEL_MAX: u8 = CHANNEL_COUNT - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiKind {
    NoteOn,
    NoteOff,
    ControlChange,
}

impl MidiKind {
    const fn status(self) -> u8 {
        match self {
            Self::NoteOff => 0x80,
            Self::NoteOn => 0x90,
            Self::ControlChange => 0xb0,
        }
    }
}

/// channel voice message; `data1` is note or controller, `data2` velocity or value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MidiEvent {
    pub kind: MidiKind,
    pub channel: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiEvent {
    pub const fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            kind: MidiKind::NoteOn,
            channel,
            data1: note,
            data2: velocity,
        }
    }

    pub const fn note_off(channel: u8, note: u8) -> Self {
        Self {
            kind: MidiKind::NoteOff,
            channel,
            data1: note,
            data2: 0,
        }
    }

    pub const fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self {
            kind: MidiKind::ControlChange,
            channel,
            data1: controller,
            data2: value,
        }
    }

    /// pin every field into protocol range
    pub fn clamped(self) -> Self {
        Self {
            kind: self.kind,
            channel: self.channel.min(CHANNEL_MAX),
            data1: self.data1.min(DATA_MAX),
            data2: self.data2.min(DATA_MAX),
        }
    }

    /// status + two data bytes, clamped
    pub fn encode(&self) -> [u8; 3] {
        let event = self.clamped();
        [event.kind.status() | event.channel, event.data1, event.data2]
    }
}

/// anything that carries midi away; sends never fail from the caller's view
pub trait MidiOut {
    fn send(&mut self, event: MidiEvent);
}

impl<T: MidiOut + ?Sized> MidiOut for &mut T {
    fn send(&mut self, event: MidiEvent) {
        (**self).send(event)
    }
}

/// fans each event out to every attached transport
pub struct Sink<'a, const N: usize = 2> {
    outs: heapless::Vec<&'a mut dyn MidiOut, N>,
}

impl<const N: usize> Default for Sink<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Sink<'a, N> {
    pub fn new() -> Self {
        Self {
            outs: heapless::Vec::new(),
        }
    }

    pub fn attach(&mut self, out: &'a mut dyn MidiOut) -> Result<(), Error> {
        self.outs
            .push(out)
            .map_err(|_| Error::CapacityExceeded { capacity: N })
    }

    pub fn len(&self) -> usize {
        self.outs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outs.is_empty()
    }
}

impl<const N: usize> MidiOut for Sink<'_, N> {
    fn send(&mut self, event: MidiEvent) {
        let event = event.clamped();
        for out in self.outs.iter_mut() {
            out.send(event);
        }
    }
}

/// note off for every note on channels `0..channels`; returns messages sent
pub fn all_notes_off(out: &mut dyn MidiOut, channels: u8) -> usize {
    let channels = channels.min(CHANNEL_COUNT);
    warn!(
        "all notes off: {} messages",
        channels as usize * NOTE_COUNT as usize
    );
    let mut count = 0;
    for channel in 0..channels {
        for note in 0..NOTE_COUNT {
            out.send(MidiEvent::note_off(channel, note));
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<MidiEvent>);

    impl MidiOut for Recorder {
        fn send(&mut self, event: MidiEvent) {
            self.0.push(event);
        }
    }

    #[test]
    fn encodes_status_by_kind_and_channel() {
        assert_eq!(MidiEvent::note_on(0, 60, 127).encode(), [0x90, 60, 127]);
        assert_eq!(MidiEvent::note_off(3, 60).encode(), [0x83, 60, 0]);
        assert_eq!(
            MidiEvent::control_change(15, 1, 64).encode(),
            [0xbf, 1, 64]
        );
    }

    #[test]
    fn clamps_out_of_range_fields() {
        assert_eq!(MidiEvent::note_on(0, 60, 200).encode(), [0x90, 60, 127]);
        assert_eq!(MidiEvent::note_on(40, 255, 128).encode(), [0x9f, 127, 127]);
    }

    #[test]
    fn sink_fans_out_to_every_transport() {
        let mut a = Recorder::default();
        let mut b = Recorder::default();
        {
            let mut sink: Sink<2> = Sink::new();
            sink.attach(&mut a).unwrap();
            sink.attach(&mut b).unwrap();
            sink.send(MidiEvent::note_on(0, 60, 200));
        }
        assert_eq!(a.0, [MidiEvent::note_on(0, 60, 127)]);
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn sink_rejects_transports_past_capacity() {
        let mut a = Recorder::default();
        let mut b = Recorder::default();
        let mut sink: Sink<1> = Sink::new();
        sink.attach(&mut a).unwrap();
        assert_eq!(
            sink.attach(&mut b),
            Err(Error::CapacityExceeded { capacity: 1 })
        );
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn sweep_covers_every_note_on_every_channel() {
        let mut out = Recorder::default();
        assert_eq!(all_notes_off(&mut out, CHANNEL_COUNT), 2048);
        assert_eq!(out.0.len(), 2048);
        assert!(out.0.iter().all(|e| e.kind == MidiKind::NoteOff));
        assert_eq!(out.0[0], MidiEvent::note_off(0, 0));
        assert_eq!(out.0[2047], MidiEvent::note_off(15, 127));
    }
}
