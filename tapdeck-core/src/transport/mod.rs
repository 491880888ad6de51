//! midi transports; each frames [`MidiEvent`](crate::MidiEvent)s its own way

pub mod wired;
pub mod wireless;

pub use wired::Wired;
pub use wireless::{Notify, Wireless};
