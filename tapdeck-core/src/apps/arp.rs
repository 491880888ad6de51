//! latching arpeggiator over the diatonic triads of c major

use super::{C4, CHANNEL};
use crate::mode::{back_pressed, draw_bar, BAR_HEIGHT};
use crate::screen::{Align, FontSize};
use crate::{Flow, MidiEvent, MidiOut, Mode, Screen, Tick};
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::{Point, Size},
    primitives::Rectangle,
};

const SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const NAMES: [&str; 7] = ["I", "ii", "iii", "IV", "V", "vi", "vii"];
/// root, third, fifth, octave
const PATTERN: [usize; 4] = [0, 2, 4, 7];
const RATE_H: u32 = 40;
const MIN_STEP_MS: u32 = 60;
const MAX_STEP_MS: u32 = 500;
const VELOCITY: u8 = 100;
const COLOR: Rgb565 = Rgb565::new(8, 44, 30);

pub struct Arp {
    latched: Option<usize>,
    step: usize,
    step_ms: u32,
    elapsed_ms: u32,
    sounding: Option<u8>,
}

impl Default for Arp {
    fn default() -> Self {
        Self::new()
    }
}

impl Arp {
    pub fn new() -> Self {
        Self {
            latched: None,
            step: 0,
            step_ms: 200,
            elapsed_ms: 0,
            sounding: None,
        }
    }

    pub fn latched(&self) -> Option<usize> {
        self.latched
    }

    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }

    /// `step`th note of the triad on scale `degree`
    fn note(degree: usize, step: usize) -> u8 {
        let index = degree + PATTERN[step % PATTERN.len()];
        C4 + 12 * (index / SCALE.len()) as u8 + SCALE[index % SCALE.len()]
    }

    fn columns(area: Rectangle) -> (i32, i32) {
        let width = area.size.width as i32 / NAMES.len() as i32;
        let left = (area.size.width as i32 - width * NAMES.len() as i32) / 2;
        (left, width)
    }

    fn chord_rect(area: Rectangle, index: usize) -> Rectangle {
        let (left, width) = Self::columns(area);
        Rectangle::new(
            Point::new(left + index as i32 * width, BAR_HEIGHT as i32),
            Size::new(
                width as u32,
                area.size.height.saturating_sub(BAR_HEIGHT + RATE_H),
            ),
        )
    }

    fn rate_rect(area: Rectangle) -> Rectangle {
        Rectangle::new(
            Point::new(0, area.size.height as i32 - RATE_H as i32),
            Size::new(area.size.width, RATE_H),
        )
    }

    fn chord_at(area: Rectangle, point: Point) -> Option<usize> {
        (0..NAMES.len()).find(|i| {
            let rect = Self::chord_rect(area, *i);
            point.x >= rect.top_left.x
                && point.x < rect.top_left.x + rect.size.width as i32
                && point.y >= rect.top_left.y
                && point.y < rect.top_left.y + rect.size.height as i32
        })
    }

    fn release(&mut self, midi: &mut dyn MidiOut) {
        if let Some(note) = self.sounding.take() {
            midi.send(MidiEvent::note_off(CHANNEL, note));
        }
    }

    fn advance(&mut self, degree: usize, midi: &mut dyn MidiOut) {
        self.release(midi);
        let note = Self::note(degree, self.step);
        midi.send(MidiEvent::note_on(CHANNEL, note, VELOCITY));
        self.sounding = Some(note);
        self.step = (self.step + 1) % PATTERN.len();
    }

    fn draw_chords(&self, screen: &mut dyn Screen) {
        let area = screen.area();
        for (index, name) in NAMES.iter().enumerate() {
            let rect = Self::chord_rect(area, index);
            let (fg, bg) = if self.latched == Some(index) {
                (Rgb565::BLACK, COLOR)
            } else {
                (COLOR, Rgb565::BLACK)
            };
            screen.fill_rect(rect, bg);
            screen.stroke_rect(rect, COLOR);
            screen.text(name, rect.center(), Align::Center, fg, bg, FontSize::Large);
        }
    }

    fn draw_rate(&self, screen: &mut dyn Screen) {
        let area = screen.area();
        let rect = Self::rate_rect(area);
        screen.fill_rect(rect, Rgb565::BLACK);
        let span = MAX_STEP_MS - MIN_STEP_MS;
        let fill = (self.step_ms - MIN_STEP_MS) * rect.size.width / span;
        screen.fill_rect(
            Rectangle::new(rect.top_left, Size::new(fill, rect.size.height)),
            Rgb565::new(4, 22, 15),
        );
        screen.stroke_rect(rect, COLOR);
        screen.text(
            "rate",
            Point::new(6, rect.center().y),
            Align::Left,
            Rgb565::WHITE,
            Rgb565::BLACK,
            FontSize::Small,
        );
    }
}

impl Mode for Arp {
    fn enter(&mut self, screen: &mut dyn Screen) {
        self.latched = None;
        self.step = 0;
        self.elapsed_ms = 0;
        draw_bar(screen, "arp", COLOR);
        self.draw_chords(screen);
        self.draw_rate(screen);
    }

    fn tick(&mut self, cx: Tick<'_>) -> Flow {
        if back_pressed(&cx.touch) {
            return Flow::Exit;
        }
        let area = cx.screen.area();
        let point = cx.touch.point();

        if cx.touch.pressed && Self::rate_rect(area).top_left.y <= point.y {
            let x = point.x.clamp(0, area.size.width as i32 - 1) as u32;
            let step_ms = MIN_STEP_MS + x * (MAX_STEP_MS - MIN_STEP_MS) / area.size.width;
            if step_ms != self.step_ms {
                self.step_ms = step_ms;
                self.draw_rate(&mut *cx.screen);
            }
        }

        if cx.touch.just_pressed {
            if let Some(index) = Self::chord_at(area, point) {
                if self.latched == Some(index) {
                    self.latched = None;
                    self.release(&mut *cx.midi);
                } else {
                    self.latched = Some(index);
                    self.step = 0;
                    // first note on the latching tick
                    self.elapsed_ms = self.step_ms;
                }
                self.draw_chords(&mut *cx.screen);
            }
        }

        if let Some(degree) = self.latched {
            // never replay a backlog after a stall
            self.elapsed_ms = (self.elapsed_ms + cx.elapsed_ms).min(self.step_ms * 2);
            while self.elapsed_ms >= self.step_ms {
                self.elapsed_ms -= self.step_ms;
                self.advance(degree, &mut *cx.midi);
            }
        }
        Flow::Stay
    }

    fn exit(&mut self, midi: &mut dyn MidiOut) {
        self.latched = None;
        self.elapsed_ms = 0;
        self.release(midi);
    }
}
