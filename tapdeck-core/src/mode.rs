//! the capability every instrument screen implements

use crate::screen::{Align, FontSize};
use crate::{MidiOut, Screen, TouchState};
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::{Point, Size},
    primitives::Rectangle,
};

/// height of the title band every mode draws
pub const BAR_HEIGHT: u32 = 24;
/// return-to-menu button, top left
pub const BACK: Rectangle = Rectangle::new(Point::new(0, 0), Size::new(40, BAR_HEIGHT));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Stay,
    /// hand control back to the menu
    Exit,
}

/// one control-loop period as seen by the active mode
pub struct Tick<'t> {
    pub touch: TouchState,
    /// since the previous tick
    pub elapsed_ms: u32,
    pub midi: &'t mut dyn MidiOut,
    pub screen: &'t mut dyn Screen,
}

/// Modes own all of their state. The orchestrator only ever calls these three.
pub trait Mode {
    /// repaint the whole display; nothing of the menu may survive
    fn enter(&mut self, screen: &mut dyn Screen);

    fn tick(&mut self, cx: Tick<'_>) -> Flow;

    /// release every note and stop every clock this mode started
    fn exit(&mut self, midi: &mut dyn MidiOut);
}

/// true on the tick the back button is tapped
pub fn back_pressed(touch: &TouchState) -> bool {
    touch.just_pressed && BACK.contains(touch.point())
}

/// clear the display and draw the title band with its back button
pub fn draw_bar(screen: &mut dyn Screen, title: &str, color: Rgb565) {
    let width = screen.area().size.width;
    screen.fill(Rgb565::BLACK);
    screen.fill_rect(
        Rectangle::new(Point::zero(), Size::new(width, BAR_HEIGHT)),
        color,
    );
    screen.fill_rect(BACK, Rgb565::BLACK);
    screen.text(
        "<",
        BACK.center(),
        Align::Center,
        Rgb565::WHITE,
        Rgb565::BLACK,
        FontSize::Large,
    );
    screen.text(
        title,
        Point::new(width as i32 / 2, BAR_HEIGHT as i32 / 2),
        Align::Center,
        Rgb565::BLACK,
        color,
        FontSize::Small,
    );
}

/// the area below the title band
pub fn body(screen: &dyn Screen) -> Rectangle {
    let area = screen.area();
    Rectangle::new(
        Point::new(area.top_left.x, area.top_left.y + BAR_HEIGHT as i32),
        Size::new(
            area.size.width,
            area.size.height.saturating_sub(BAR_HEIGHT),
        ),
    )
}
