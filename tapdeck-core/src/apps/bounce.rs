//! a ball that plays a pentatonic note on every wall it hits

use super::{C4, CHANNEL};
use crate::mode::{back_pressed, body, draw_bar};
use crate::{Flow, MidiEvent, MidiOut, Mode, Screen, Tick};
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::Point,
    primitives::Rectangle,
};
use tinyrand::{Rand, Seeded, Wyrand};

#[cfg(not(test))]
#[allow(unused_imports)]
use micromath::F32Ext;

const PENTATONIC: [u8; 5] = [0, 2, 4, 7, 9];
const RADIUS: u32 = 6;
/// px/s after a kick
const KICK: f32 = 160.;
const NOTE_MS: u32 = 120;
const VELOCITY: u8 = 96;
/// longest step integrated at once; keeps the ball inside after a stall
const MAX_STEP_MS: u32 = 100;
const COLOR: Rgb565 = Rgb565::new(31, 30, 4);

pub struct Bounce {
    rand: Wyrand,
    pos: (f32, f32),
    vel: (f32, f32),
    drawn: Option<Point>,
    sounding: Option<u8>,
    note_left_ms: u32,
}

impl Bounce {
    pub fn new(seed: u64) -> Self {
        Self {
            rand: Wyrand::seed(seed),
            pos: (0., 0.),
            vel: (0., 0.),
            drawn: None,
            sounding: None,
            note_left_ms: 0,
        }
    }

    pub fn sounding(&self) -> Option<u8> {
        self.sounding
    }

    fn point(&self) -> Point {
        Point::new(self.pos.0 as i32, self.pos.1 as i32)
    }

    fn release(&mut self, midi: &mut dyn MidiOut) {
        if let Some(note) = self.sounding.take() {
            midi.send(MidiEvent::note_off(CHANNEL, note));
        }
        self.note_left_ms = 0;
    }

    fn strike(&mut self, midi: &mut dyn MidiOut) {
        self.release(midi);
        let note = C4
            + 12 * self.rand.next_lim_usize(2) as u8
            + PENTATONIC[self.rand.next_lim_usize(PENTATONIC.len())];
        midi.send(MidiEvent::note_on(CHANNEL, note, VELOCITY));
        self.sounding = Some(note);
        self.note_left_ms = NOTE_MS;
    }

    fn kick(&mut self, toward: Point) {
        let dx = toward.x as f32 - self.pos.0;
        let dy = toward.y as f32 - self.pos.1;
        let len = (dx * dx + dy * dy).sqrt();
        if len >= 1. {
            self.vel = (dx / len * KICK, dy / len * KICK);
        }
    }

    /// integrate one step; true if any wall was hit
    fn travel(&mut self, bounds: Rectangle, elapsed_ms: u32) -> bool {
        let dt = elapsed_ms.min(MAX_STEP_MS) as f32 / 1000.;
        let r = RADIUS as f32;
        let min = (bounds.top_left.x as f32 + r, bounds.top_left.y as f32 + r);
        let max = (
            (bounds.top_left.x + bounds.size.width as i32 - 1) as f32 - r,
            (bounds.top_left.y + bounds.size.height as i32 - 1) as f32 - r,
        );
        self.pos.0 += self.vel.0 * dt;
        self.pos.1 += self.vel.1 * dt;

        let mut hit = false;
        if self.pos.0 < min.0 {
            self.pos.0 = 2. * min.0 - self.pos.0;
            self.vel.0 = self.vel.0.abs();
            hit = true;
        } else if self.pos.0 > max.0 {
            self.pos.0 = 2. * max.0 - self.pos.0;
            self.vel.0 = -self.vel.0.abs();
            hit = true;
        }
        if self.pos.1 < min.1 {
            self.pos.1 = 2. * min.1 - self.pos.1;
            self.vel.1 = self.vel.1.abs();
            hit = true;
        } else if self.pos.1 > max.1 {
            self.pos.1 = 2. * max.1 - self.pos.1;
            self.vel.1 = -self.vel.1.abs();
            hit = true;
        }
        self.pos.0 = self.pos.0.clamp(min.0, max.0);
        self.pos.1 = self.pos.1.clamp(min.1, max.1);
        hit
    }

    fn draw_ball(&mut self, screen: &mut dyn Screen) {
        let point = self.point();
        if self.drawn == Some(point) {
            return;
        }
        if let Some(old) = self.drawn {
            screen.fill_circle(old, RADIUS, Rgb565::BLACK);
        }
        screen.fill_circle(point, RADIUS, COLOR);
        self.drawn = Some(point);
    }
}

impl Mode for Bounce {
    fn enter(&mut self, screen: &mut dyn Screen) {
        draw_bar(screen, "bounce", COLOR);
        let center = body(&*screen).center();
        self.pos = (center.x as f32, center.y as f32);
        self.vel = (90., -70.);
        self.drawn = None;
        self.draw_ball(screen);
    }

    fn tick(&mut self, cx: Tick<'_>) -> Flow {
        if back_pressed(&cx.touch) {
            return Flow::Exit;
        }
        let bounds = body(&*cx.screen);

        if self.sounding.is_some() {
            self.note_left_ms = self.note_left_ms.saturating_sub(cx.elapsed_ms);
            if self.note_left_ms == 0 {
                self.release(&mut *cx.midi);
            }
        }
        if cx.touch.just_pressed && cx.touch.y >= bounds.top_left.y {
            self.kick(cx.touch.point());
        }
        if self.travel(bounds, cx.elapsed_ms) {
            self.strike(&mut *cx.midi);
        }
        self.draw_ball(&mut *cx.screen);
        Flow::Stay
    }

    fn exit(&mut self, midi: &mut dyn MidiOut) {
        self.release(midi);
        self.vel = (0., 0.);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Framebuffer, MidiKind, TouchState};

    #[derive(Default)]
    struct Recorder(Vec<MidiEvent>);

    impl MidiOut for Recorder {
        fn send(&mut self, event: MidiEvent) {
            self.0.push(event);
        }
    }

    fn step(ball: &mut Bounce, touch: TouchState, fb: &mut Framebuffer<320, 240>, midi: &mut Recorder) {
        ball.tick(Tick {
            touch,
            elapsed_ms: 20,
            midi,
            screen: fb,
        });
    }

    /// entered, then parked against the right wall heading into it
    fn parked(seed: u64) -> (Bounce, Framebuffer<320, 240>) {
        let mut ball = Bounce::new(seed);
        let mut fb = Framebuffer::new();
        ball.enter(&mut fb);
        ball.pos = (312., 130.);
        ball.vel = (100., 0.);
        (ball, fb)
    }

    fn is_pentatonic(note: u8) -> bool {
        note >= C4 && note < C4 + 24 && PENTATONIC.contains(&((note - C4) % 12))
    }

    #[test]
    fn enter_draws_the_ball_in_the_middle() {
        let mut ball = Bounce::new(1);
        let mut fb = Framebuffer::<320, 240>::new();
        ball.enter(&mut fb);
        let center = body(&fb).center();
        assert_eq!(ball.point(), center);
        assert_eq!(fb.pixel(center), Some(COLOR));
        assert_eq!(fb.pixel(Point::new(5, 230)), Some(Rgb565::BLACK));
    }

    #[test]
    fn wall_hit_plays_a_short_note() {
        let (mut ball, mut fb) = parked(7);
        let mut midi = Recorder::default();

        step(&mut ball, TouchState::default(), &mut fb, &mut midi);
        assert_eq!(midi.0.len(), 1);
        assert_eq!(midi.0[0].kind, MidiKind::NoteOn);
        assert!(is_pentatonic(midi.0[0].data1));
        assert!(ball.vel.0 < 0.);

        for _ in 0..5 {
            step(&mut ball, TouchState::default(), &mut fb, &mut midi);
        }
        assert_eq!(midi.0.len(), 1);
        step(&mut ball, TouchState::default(), &mut fb, &mut midi);
        assert_eq!(midi.0[1], MidiEvent::note_off(CHANNEL, midi.0[0].data1));
        assert_eq!(ball.sounding(), None);
    }

    #[test]
    fn same_seed_same_melody() {
        let notes = |seed| {
            let (mut ball, mut fb) = parked(seed);
            let mut midi = Recorder::default();
            for _ in 0..400 {
                step(&mut ball, TouchState::default(), &mut fb, &mut midi);
            }
            midi.0
        };
        let a = notes(42);
        assert!(a.len() > 2);
        assert_eq!(a, notes(42));
    }

    #[test]
    fn tap_kicks_toward_the_touch() {
        let mut ball = Bounce::new(3);
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();
        ball.enter(&mut fb);

        let above = Point::new(body(&fb).center().x, 60);
        step(&mut ball, TouchState::tap(above), &mut fb, &mut midi);
        assert!(ball.vel.0.abs() < 1e-3);
        assert!((ball.vel.1 + KICK).abs() < 1e-3);
    }

    #[test]
    fn exit_releases_and_stops() {
        let (mut ball, mut fb) = parked(9);
        let mut midi = Recorder::default();
        step(&mut ball, TouchState::default(), &mut fb, &mut midi);
        let note = midi.0[0].data1;

        ball.exit(&mut midi);
        assert_eq!(midi.0.last(), Some(&MidiEvent::note_off(CHANNEL, note)));
        assert_eq!(ball.vel, (0., 0.));
        ball.exit(&mut midi);
        assert_eq!(midi.0.len(), 2);
    }
}
