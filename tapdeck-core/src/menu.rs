//! menu grid geometry, hit-testing and rendering
//!
//! [`Layout::cell_rect`] is the only place a cell's position is computed;
//! drawing and hit-testing both go through it.

use crate::{AppMode, LinkState, Registry, Screen};
use crate::screen::{Align, FontSize};
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::{Point, Size},
    primitives::Rectangle,
};

const TITLE: &str = "tapdeck";
const BACKGROUND: Rgb565 = Rgb565::BLACK;
const HEADER: Rgb565 = Rgb565::new(4, 8, 4);
const CONNECTED: Rgb565 = Rgb565::GREEN;
const WAITING: Rgb565 = Rgb565::new(31, 40, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub cols: u32,
    /// icon edge length
    pub icon: u32,
    /// gap between cells, both axes
    pub spacing: u32,
    /// caption band under each icon
    pub label: u32,
    /// status band at the top of the display
    pub header: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            cols: 5,
            icon: 40,
            spacing: 8,
            label: 12,
            header: 24,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    geometry: Geometry,
    display: Size,
    origin: Point,
    rows: u32,
}

impl Layout {
    /// centers `count` cells in the display area below the header
    pub fn new(count: usize, geometry: Geometry, display: Size) -> Self {
        let geometry = Geometry {
            cols: geometry.cols.max(1),
            ..geometry
        };
        let rows = (count as u32).div_ceil(geometry.cols);
        let width = geometry.cols * geometry.icon + (geometry.cols - 1) * geometry.spacing;
        let height = rows * (geometry.icon + geometry.label) + rows.saturating_sub(1) * geometry.spacing;
        let body = display.height.saturating_sub(geometry.header);
        let origin = Point::new(
            (display.width as i32 - width as i32) / 2,
            geometry.header as i32 + (body as i32 - height as i32) / 2,
        );
        Self {
            geometry,
            display,
            origin,
            rows,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// icon square of cell `index`
    pub fn cell_rect(&self, index: usize) -> Rectangle {
        let g = &self.geometry;
        let col = index as u32 % g.cols;
        let row = index as u32 / g.cols;
        let x = col * (g.icon + g.spacing);
        let y = row * (g.icon + g.label + g.spacing);
        Rectangle::new(
            self.origin + Point::new(x as i32, y as i32),
            Size::new(g.icon, g.icon),
        )
    }

    /// first registry entry whose cell contains `point`
    pub fn hit_test(&self, point: Point, registry: &Registry) -> Option<AppMode> {
        let hit = registry
            .iter()
            .find(|(i, _)| self.cell_rect(*i).contains(point))
            .map(|(_, icon)| icon.mode);
        if hit.is_none() {
            trace!("tap at {},{} missed every cell", point.x, point.y);
        }
        hit
    }

    /// full repaint; reads only the link state, never a transport
    pub fn render(&self, screen: &mut dyn Screen, registry: &Registry, link: LinkState) {
        screen.fill(BACKGROUND);
        self.render_header(screen, link);
        for (index, icon) in registry.iter() {
            let cell = self.cell_rect(index);
            screen.fill_rect(cell, icon.color);
            screen.stroke_rect(cell, Rgb565::WHITE);
            let mut symbol = [0u8; 4];
            screen.text(
                icon.symbol.encode_utf8(&mut symbol),
                cell.center(),
                Align::Center,
                Rgb565::BLACK,
                icon.color,
                FontSize::Large,
            );
            let caption = Point::new(
                cell.center().x,
                cell.top_left.y + self.geometry.icon as i32 + self.geometry.label as i32 / 2,
            );
            screen.text(
                icon.name,
                caption,
                Align::Center,
                Rgb565::WHITE,
                BACKGROUND,
                FontSize::Small,
            );
        }
    }

    /// redraw only the status band
    pub fn render_header(&self, screen: &mut dyn Screen, link: LinkState) {
        let band = Rectangle::new(
            Point::zero(),
            Size::new(self.display.width, self.geometry.header),
        );
        screen.fill_rect(band, HEADER);
        let middle = self.geometry.header as i32 / 2;
        screen.text(
            TITLE,
            Point::new(6, middle),
            Align::Left,
            Rgb565::WHITE,
            HEADER,
            FontSize::Small,
        );
        let (label, color) = match link {
            LinkState::Connected => ("BLE connected", CONNECTED),
            LinkState::Disconnected => ("waiting for BLE", WAITING),
        };
        let dot = Point::new(self.display.width as i32 - 108, middle);
        match link {
            LinkState::Connected => screen.fill_circle(dot, 4, color),
            LinkState::Disconnected => screen.stroke_circle(dot, 4, color),
        }
        screen.text(
            label,
            dot + Point::new(9, 0),
            Align::Left,
            color,
            HEADER,
            FontSize::Small,
        );
    }
}
