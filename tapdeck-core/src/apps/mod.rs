//! built-in instruments

mod arp;
mod bounce;
mod keys;
mod lfo;

pub use arp::Arp;
pub use bounce::Bounce;
pub use keys::Keys;
pub use lfo::{Lfo, Wave};

use crate::{AppIcon, AppMode};
use embedded_graphics::pixelcolor::Rgb565;

pub const KEYS: AppMode = AppMode::App(0);
pub const ARP: AppMode = AppMode::App(1);
pub const LFO: AppMode = AppMode::App(2);
pub const BOUNCE: AppMode = AppMode::App(3);

/// menu order
pub fn icons() -> [AppIcon; 4] {
    [
        AppIcon {
            name: "keys",
            symbol: 'K',
            color: Rgb565::new(30, 50, 8),
            mode: KEYS,
        },
        AppIcon {
            name: "arp",
            symbol: 'A',
            color: Rgb565::new(8, 44, 30),
            mode: ARP,
        },
        AppIcon {
            name: "lfo",
            symbol: '~',
            color: Rgb565::new(24, 20, 31),
            mode: LFO,
        },
        AppIcon {
            name: "bounce",
            symbol: 'o',
            color: Rgb565::new(31, 30, 4),
            mode: BOUNCE,
        },
    ]
}

/// middle c
pub(crate) const C4: u8 = 60;
pub(crate) const CHANNEL: u8 = 0;
