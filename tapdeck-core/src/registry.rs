//! fixed, ordered list of selectable modes

use crate::{Error, MAX_APPS};
use embedded_graphics::pixelcolor::Rgb565;

/// which screen is active; apps are told apart by a stable slot id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppMode {
    Menu,
    App(u8),
}

impl core::fmt::Display for AppMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Menu => f.write_str("menu"),
            Self::App(id) => write!(f, "app {}", id),
        }
    }
}

/// menu display metadata for one mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppIcon {
    pub name: &'static str,
    pub symbol: char,
    pub color: Rgb565,
    pub mode: AppMode,
}

/// index order is menu order, row-major
#[derive(Clone, Debug)]
pub struct Registry {
    icons: heapless::Vec<AppIcon, MAX_APPS>,
}

impl Registry {
    pub fn new(icons: &[AppIcon]) -> Result<Self, Error> {
        if icons.len() > MAX_APPS {
            return Err(Error::CapacityExceeded {
                capacity: MAX_APPS,
            });
        }
        let mut registry = Self {
            icons: heapless::Vec::new(),
        };
        for icon in icons {
            if icon.mode == AppMode::Menu {
                return Err(Error::MenuEntry);
            }
            if registry.position(icon.mode).is_some() {
                return Err(Error::DuplicateMode(icon.mode));
            }
            // length checked above
            let _ = registry.icons.push(*icon);
        }
        info!("registered {} apps", registry.len());
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// `(index, icon)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AppIcon)> {
        self.icons.iter().enumerate()
    }

    pub fn position(&self, mode: AppMode) -> Option<usize> {
        self.icons.iter().position(|icon| icon.mode == mode)
    }

    pub fn contains(&self, mode: AppMode) -> bool {
        self.position(mode).is_some()
    }
}
