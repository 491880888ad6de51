//! display primitives shared by the menu and every mode

use core::convert::Infallible;
use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10},
        MonoTextStyleBuilder,
    },
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontSize {
    Small,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    /// `at` is the left edge, vertically centered
    Left,
    /// `at` is the center
    Center,
    /// `at` is the right edge, vertically centered
    Right,
}

/// draw calls never fail from the caller's view; a dropped primitive is a
/// glitch on screen, not a reason to stop playing
pub trait Screen {
    fn area(&self) -> Rectangle;
    fn fill(&mut self, color: Rgb565);
    fn fill_rect(&mut self, rect: Rectangle, color: Rgb565);
    fn stroke_rect(&mut self, rect: Rectangle, color: Rgb565);
    fn fill_circle(&mut self, center: Point, radius: u32, color: Rgb565);
    fn stroke_circle(&mut self, center: Point, radius: u32, color: Rgb565);
    fn line(&mut self, from: Point, to: Point, color: Rgb565);
    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        text: &str,
        at: Point,
        align: Align,
        fg: Rgb565,
        bg: Rgb565,
        size: FontSize,
    );
}

impl<D: DrawTarget<Color = Rgb565>> Screen for D {
    fn area(&self) -> Rectangle {
        self.bounding_box()
    }

    fn fill(&mut self, color: Rgb565) {
        let _ = DrawTarget::clear(self, color);
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb565) {
        let _ = rect.into_styled(PrimitiveStyle::with_fill(color)).draw(self);
    }

    fn stroke_rect(&mut self, rect: Rectangle, color: Rgb565) {
        let _ = rect
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self);
    }

    fn fill_circle(&mut self, center: Point, radius: u32, color: Rgb565) {
        let _ = Circle::with_center(center, radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self);
    }

    fn stroke_circle(&mut self, center: Point, radius: u32, color: Rgb565) {
        let _ = Circle::with_center(center, radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self);
    }

    fn line(&mut self, from: Point, to: Point, color: Rgb565) {
        let _ = Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self);
    }

    fn text(
        &mut self,
        text: &str,
        at: Point,
        align: Align,
        fg: Rgb565,
        bg: Rgb565,
        size: FontSize,
    ) {
        let font = match size {
            FontSize::Small => &FONT_6X10,
            FontSize::Large => &FONT_10X20,
        };
        let char_style = MonoTextStyleBuilder::new()
            .font(font)
            .text_color(fg)
            .background_color(bg)
            .build();
        let alignment = match align {
            Align::Left => Alignment::Left,
            Align::Center => Alignment::Center,
            Align::Right => Alignment::Right,
        };
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Middle)
            .build();
        let _ = Text::with_text_style(text, at, char_style, text_style).draw(self);
    }
}

/// in-memory rgb565 display; the host simulator's panel and the test double
pub struct Framebuffer<const W: usize, const H: usize> {
    rows: [[Rgb565; W]; H],
    dirty: bool,
}

impl<const W: usize, const H: usize> Default for Framebuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> Framebuffer<W, H> {
    pub fn new() -> Self {
        Self {
            rows: [[Rgb565::BLACK; W]; H],
            dirty: true,
        }
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        self.rows.get(y)?.get(x).copied()
    }

    pub fn rows(&self) -> &[[Rgb565; W]; H] {
        &self.rows
    }

    /// true once per batch of draws
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }
}

impl<const W: usize, const H: usize> OriginDimensions for Framebuffer<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for Framebuffer<W, H> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if let Some(pixel) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                *pixel = color;
                self.dirty = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_land_in_the_buffer() {
        let mut fb = Framebuffer::<32, 16>::new();
        assert!(fb.take_dirty());
        let screen: &mut dyn Screen = &mut fb;
        screen.fill(Rgb565::BLUE);
        screen.fill_rect(Rectangle::new(Point::new(2, 2), Size::new(4, 4)), Rgb565::RED);
        assert_eq!(fb.pixel(Point::new(3, 3)), Some(Rgb565::RED));
        assert_eq!(fb.pixel(Point::new(10, 10)), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(Point::new(40, 3)), None);
        assert!(fb.take_dirty());
        assert!(!fb.take_dirty());
    }

    #[test]
    fn offscreen_draws_are_clipped() {
        let mut fb = Framebuffer::<8, 8>::new();
        fb.fill_circle(Point::new(-2, -2), 3, Rgb565::GREEN);
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Rgb565::GREEN));
        assert_eq!(fb.area(), Rectangle::new(Point::zero(), Size::new(8, 8)));
    }
}
