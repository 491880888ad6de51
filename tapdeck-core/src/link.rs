//! wireless connection lifecycle
//!
//! The radio stack calls [`Link::on_connect`] and [`Link::on_disconnect`] from
//! its own context. Those only update a single atomic word; the control loop picks
//! the consequences up once per tick with [`Link::take`], so every redraw and
//! every all-notes-off sweep runs on the same context as the rest of the
//! display and transport writes.

use core::sync::atomic::{AtomicU8, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Disconnected,
    Connected,
}

impl core::fmt::Display for LinkState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connected => f.write_str("connected"),
        }
    }
}

/// work owed to the control loop since the last tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pending {
    /// a genuine disconnect happened; release every note
    pub sweep: bool,
    /// connection status changed; repaint the indicator
    pub redraw: bool,
}

const CONNECTED: u8 = 1 << 0;
const SWEEP: u8 = 1 << 1;
const REDRAW: u8 = 1 << 2;

/// connected flag and owed work share one word, so every callback is a
/// single atomic update
pub struct Link {
    flags: AtomicU8,
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

impl Link {
    pub const fn new() -> Self {
        Self {
            flags: AtomicU8::new(0),
        }
    }

    /// radio callback; safe from any context
    pub fn on_connect(&self) {
        let changed = self
            .flags
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |flags| {
                (flags & CONNECTED == 0).then_some(flags | CONNECTED | REDRAW)
            });
        match changed {
            Ok(_) => info!("wireless {}", LinkState::Connected),
            Err(_) => debug!("duplicate connect ignored"),
        }
    }

    /// radio callback; safe from any context
    pub fn on_disconnect(&self) {
        let changed = self
            .flags
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |flags| {
                (flags & CONNECTED != 0).then_some((flags & !CONNECTED) | SWEEP | REDRAW)
            });
        match changed {
            Ok(_) => info!("wireless {}", LinkState::Disconnected),
            Err(_) => debug!("duplicate disconnect ignored"),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.flags.load(Ordering::Acquire) & CONNECTED != 0
    }

    pub fn state(&self) -> LinkState {
        if self.is_connected() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    /// drain pending work; each request is handed out at most once
    pub fn take(&self) -> Pending {
        let flags = self.flags.fetch_and(CONNECTED, Ordering::AcqRel);
        Pending {
            sweep: flags & SWEEP != 0,
            redraw: flags & REDRAW != 0,
        }
    }
}
