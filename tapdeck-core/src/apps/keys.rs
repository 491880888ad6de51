//! two-octave piano keyboard

use super::CHANNEL;
use crate::mode::{back_pressed, body, draw_bar, BAR_HEIGHT};
use crate::{Flow, MidiEvent, MidiOut, Mode, Screen, Tick};
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::{Point, Size},
    primitives::Rectangle,
};

const BASE: u8 = 48;
const OCTAVES: i32 = 2;
const WHITES: i32 = 7 * OCTAVES;
const WHITE_W: i32 = 22;
const BLACK_W: i32 = 14;
const BLACK_H: i32 = 130;
/// semitone of each white key within an octave
const WHITE_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
/// white keys (within an octave) followed by a black key
const BLACK_AFTER: [i32; 5] = [0, 1, 3, 4, 5];
const LIT: Rgb565 = Rgb565::new(30, 50, 8);

pub struct Keys {
    held: Option<u8>,
}

impl Default for Keys {
    fn default() -> Self {
        Self::new()
    }
}

impl Keys {
    pub fn new() -> Self {
        Self { held: None }
    }

    pub fn held(&self) -> Option<u8> {
        self.held
    }

    fn left(width: u32) -> i32 {
        (width as i32 - WHITES * WHITE_W) / 2
    }

    fn black_rect(left: i32, octave: i32, after: i32) -> Rectangle {
        let x = left + (octave * 7 + after + 1) * WHITE_W - BLACK_W / 2;
        Rectangle::new(
            Point::new(x, BAR_HEIGHT as i32),
            Size::new(BLACK_W as u32, BLACK_H as u32),
        )
    }

    fn white_rect(left: i32, index: i32, height: u32) -> Rectangle {
        Rectangle::new(
            Point::new(left + index * WHITE_W, BAR_HEIGHT as i32),
            Size::new(WHITE_W as u32, height),
        )
    }

    fn key_at(area: Rectangle, point: Point) -> Option<u8> {
        let left = Self::left(area.size.width);
        if point.y < BAR_HEIGHT as i32 || point.y >= area.size.height as i32 {
            return None;
        }
        if point.y < BAR_HEIGHT as i32 + BLACK_H {
            for octave in 0..OCTAVES {
                for after in BLACK_AFTER {
                    let rect = Self::black_rect(left, octave, after);
                    if point.x >= rect.top_left.x && point.x < rect.top_left.x + BLACK_W {
                        return Some(
                            BASE + 12 * octave as u8 + WHITE_STEPS[after as usize] + 1,
                        );
                    }
                }
            }
        }
        let offset = point.x - left;
        if offset < 0 || offset >= WHITES * WHITE_W {
            return None;
        }
        let index = offset / WHITE_W;
        Some(BASE + 12 * (index / 7) as u8 + WHITE_STEPS[(index % 7) as usize])
    }

    /// lower on the key plays louder
    fn velocity(area: Rectangle, y: i32) -> u8 {
        let depth = (y - BAR_HEIGHT as i32).max(0) as u32;
        let span = area.size.height.saturating_sub(BAR_HEIGHT).max(1);
        (40 + depth * 87 / span) as u8
    }

    fn draw_keys(&self, screen: &mut dyn Screen) {
        let area = body(&*screen);
        let left = Self::left(area.size.width);
        for index in 0..WHITES {
            let note = BASE + 12 * (index / 7) as u8 + WHITE_STEPS[(index % 7) as usize];
            let rect = Self::white_rect(left, index, area.size.height);
            let color = if self.held == Some(note) { LIT } else { Rgb565::WHITE };
            screen.fill_rect(rect, color);
            screen.stroke_rect(rect, Rgb565::BLACK);
        }
        for octave in 0..OCTAVES {
            for after in BLACK_AFTER {
                let note = BASE + 12 * octave as u8 + WHITE_STEPS[after as usize] + 1;
                let color = if self.held == Some(note) { LIT } else { Rgb565::BLACK };
                screen.fill_rect(Self::black_rect(left, octave, after), color);
            }
        }
    }
}

impl Mode for Keys {
    fn enter(&mut self, screen: &mut dyn Screen) {
        self.held = None;
        draw_bar(screen, "keys", LIT);
        self.draw_keys(screen);
    }

    fn tick(&mut self, cx: Tick<'_>) -> Flow {
        if back_pressed(&cx.touch) {
            return Flow::Exit;
        }
        let area = cx.screen.area();
        let target = if cx.touch.pressed {
            Self::key_at(area, cx.touch.point())
        } else {
            None
        };
        if target != self.held {
            if let Some(note) = self.held.take() {
                cx.midi.send(MidiEvent::note_off(CHANNEL, note));
            }
            if let Some(note) = target {
                let velocity = Self::velocity(area, cx.touch.y);
                cx.midi.send(MidiEvent::note_on(CHANNEL, note, velocity));
                self.held = Some(note);
            }
            self.draw_keys(cx.screen);
        }
        Flow::Stay
    }

    fn exit(&mut self, midi: &mut dyn MidiOut) {
        if let Some(note) = self.held.take() {
            midi.send(MidiEvent::note_off(CHANNEL, note));
        }
    }
}
