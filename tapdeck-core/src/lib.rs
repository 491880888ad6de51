#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod apps;
mod link;
mod menu;
mod midi;
pub mod mode;
mod orchestrator;
mod registry;
mod screen;
mod touch;
pub mod transport;

pub use link::{Link, LinkState, Pending};
pub use menu::{Geometry, Layout};
pub use midi::{all_notes_off, MidiEvent, MidiKind, MidiOut, Sink, CHANNEL_COUNT, NOTE_COUNT};
pub use mode::{Flow, Mode, Tick};
pub use orchestrator::Orchestrator;
pub use registry::{AppIcon, AppMode, Registry};
pub use screen::{Align, FontSize, Framebuffer, Screen};
pub use touch::{Sampler, TouchPanel, TouchState};

pub use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{Point, Size},
    primitives::Rectangle,
};

/// max registry entries, and so max dispatch entries
pub const MAX_APPS: usize = 12;

pub const DISPLAY_WIDTH: u32 = 320;
pub const DISPLAY_HEIGHT: u32 = 240;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub display: Size,
    pub geometry: Geometry,
    /// control loop period
    pub tick_ms: u32,
    /// channels 0..n swept on wireless disconnect
    pub sweep_channels: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
            geometry: Geometry::default(),
            tick_ms: 20,
            sweep_channels: CHANNEL_COUNT,
        }
    }
}

/// startup misconfiguration; nothing at runtime returns these
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    CapacityExceeded { capacity: usize },
    DuplicateMode(AppMode),
    /// `AppMode::Menu` is not selectable
    MenuEntry,
    /// registered icon with no mode instance
    Unmapped(AppMode),
    /// mode instance with no registered icon
    Unregistered(AppMode),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "more than {} entries registered", capacity)
            }
            Self::DuplicateMode(mode) => write!(f, "{} registered twice", mode),
            Self::MenuEntry => f.write_str("menu cannot be registered as an app"),
            Self::Unmapped(mode) => write!(f, "{} has an icon but no mode", mode),
            Self::Unregistered(mode) => write!(f, "{} has a mode but no icon", mode),
        }
    }
}

impl core::error::Error for Error {}
