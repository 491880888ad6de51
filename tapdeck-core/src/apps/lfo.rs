//! low-frequency oscillator driving the modulation wheel (cc 1)

use super::CHANNEL;
use crate::mode::{back_pressed, draw_bar, BAR_HEIGHT};
use crate::screen::{Align, FontSize};
use crate::{Flow, MidiEvent, MidiOut, Mode, Screen, Tick};
use core::fmt::Write;
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::{Point, Size},
    primitives::Rectangle,
};

#[cfg(not(test))]
#[allow(unused_imports)]
use micromath::F32Ext;

const CONTROLLER: u8 = 1;
const STRIP_H: u32 = 32;
const METER_Y: i32 = 200;
const METER_H: u32 = 30;
const MIN_HZ: f32 = 0.1;
const MAX_HZ: f32 = 5.0;
/// segments in the waveform preview
const PLOT_STEPS: i32 = 64;
const COLOR: Rgb565 = Rgb565::new(24, 20, 31);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Triangle,
    Square,
    Saw,
}

impl Wave {
    const ALL: [Wave; 4] = [Wave::Sine, Wave::Triangle, Wave::Square, Wave::Saw];

    fn name(self) -> &'static str {
        match self {
            Wave::Sine => "sine",
            Wave::Triangle => "tri",
            Wave::Square => "square",
            Wave::Saw => "saw",
        }
    }

    /// unipolar level in 0..=1 at `phase` in 0..1
    pub fn level(self, phase: f32) -> f32 {
        match self {
            Wave::Sine => 0.5 + 0.5 * (phase * 2. * core::f32::consts::PI).sin(),
            Wave::Triangle => {
                if phase < 0.5 {
                    phase * 2.
                } else {
                    2. - phase * 2.
                }
            }
            Wave::Square => {
                if phase < 0.5 {
                    1.
                } else {
                    0.
                }
            }
            Wave::Saw => phase,
        }
    }

    /// 7-bit controller value at `phase`
    pub fn value(self, phase: f32) -> u8 {
        ((self.level(phase) * 127. + 0.5) as u8).min(127)
    }
}

pub struct Lfo {
    wave: Wave,
    hz: f32,
    phase: f32,
    /// last value sent; `None` until the first emission
    last: Option<u8>,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Lfo {
    pub fn new() -> Self {
        Self {
            wave: Wave::Sine,
            hz: 1.,
            phase: 0.,
            last: None,
        }
    }

    pub fn wave(&self) -> Wave {
        self.wave
    }

    pub fn hz(&self) -> f32 {
        self.hz
    }

    fn button_rect(area: Rectangle, index: usize) -> Rectangle {
        let width = area.size.width / Wave::ALL.len() as u32;
        Rectangle::new(
            Point::new(index as i32 * width as i32, BAR_HEIGHT as i32),
            Size::new(width, STRIP_H),
        )
    }

    fn plot_rect(area: Rectangle) -> Rectangle {
        let top = (BAR_HEIGHT + STRIP_H) as i32;
        Rectangle::new(
            Point::new(0, top),
            Size::new(area.size.width, (METER_Y - top) as u32),
        )
    }

    fn meter_rect(area: Rectangle) -> Rectangle {
        Rectangle::new(
            Point::new(0, METER_Y),
            Size::new(area.size.width, METER_H),
        )
    }

    fn inside(rect: Rectangle, point: Point) -> bool {
        point.x >= rect.top_left.x
            && point.x < rect.top_left.x + rect.size.width as i32
            && point.y >= rect.top_left.y
            && point.y < rect.top_left.y + rect.size.height as i32
    }

    fn rate_at(area: Rectangle, x: i32) -> f32 {
        let span = (area.size.width as i32 - 1).max(1);
        let x = x.clamp(0, span) as f32 / span as f32;
        MIN_HZ + x * (MAX_HZ - MIN_HZ)
    }

    fn draw_buttons(&self, screen: &mut dyn Screen) {
        let area = screen.area();
        for (index, wave) in Wave::ALL.iter().enumerate() {
            let rect = Self::button_rect(area, index);
            let (fg, bg) = if *wave == self.wave {
                (Rgb565::BLACK, COLOR)
            } else {
                (COLOR, Rgb565::BLACK)
            };
            screen.fill_rect(rect, bg);
            screen.stroke_rect(rect, COLOR);
            screen.text(wave.name(), rect.center(), Align::Center, fg, bg, FontSize::Small);
        }
    }

    fn draw_plot(&self, screen: &mut dyn Screen) {
        let rect = Self::plot_rect(screen.area());
        screen.fill_rect(rect, Rgb565::BLACK);
        let height = rect.size.height as i32 - 20;
        let at = |step: i32| {
            let phase = step as f32 / PLOT_STEPS as f32;
            let level = self.wave.level(phase.min(0.999));
            Point::new(
                rect.top_left.x + step * (rect.size.width as i32 - 1) / PLOT_STEPS,
                rect.top_left.y + 10 + height - (level * height as f32) as i32,
            )
        };
        for step in 0..PLOT_STEPS {
            screen.line(at(step), at(step + 1), COLOR);
        }

        let mut label: heapless::String<16> = heapless::String::new();
        let _ = write!(label, "{:.1} Hz", self.hz);
        screen.text(
            &label,
            Point::new(
                rect.top_left.x + rect.size.width as i32 - 6,
                rect.top_left.y + rect.size.height as i32 - 8,
            ),
            Align::Right,
            Rgb565::WHITE,
            Rgb565::BLACK,
            FontSize::Small,
        );
    }

    fn draw_meter(&self, screen: &mut dyn Screen) {
        let rect = Self::meter_rect(screen.area());
        let value = self.last.unwrap_or(0) as u32;
        screen.fill_rect(rect, Rgb565::BLACK);
        screen.fill_rect(
            Rectangle::new(
                rect.top_left,
                Size::new(value * rect.size.width / 127, rect.size.height),
            ),
            COLOR,
        );
        screen.stroke_rect(rect, Rgb565::WHITE);
    }
}

impl Mode for Lfo {
    fn enter(&mut self, screen: &mut dyn Screen) {
        self.phase = 0.;
        self.last = None;
        draw_bar(screen, "lfo", COLOR);
        self.draw_buttons(screen);
        self.draw_plot(screen);
        self.draw_meter(screen);
    }

    fn tick(&mut self, cx: Tick<'_>) -> Flow {
        if back_pressed(&cx.touch) {
            return Flow::Exit;
        }
        let area = cx.screen.area();
        let point = cx.touch.point();

        if cx.touch.just_pressed {
            let hit = (0..Wave::ALL.len()).find(|i| Self::inside(Self::button_rect(area, *i), point));
            if let Some(index) = hit {
                if Wave::ALL[index] != self.wave {
                    self.wave = Wave::ALL[index];
                    self.draw_buttons(&mut *cx.screen);
                    self.draw_plot(&mut *cx.screen);
                }
            }
        }
        if cx.touch.pressed && Self::inside(Self::plot_rect(area), point) {
            let hz = Self::rate_at(area, point.x);
            if hz != self.hz {
                self.hz = hz;
                self.draw_plot(&mut *cx.screen);
            }
        }

        self.phase += self.hz * cx.elapsed_ms as f32 / 1000.;
        self.phase = self.phase.fract();

        let value = self.wave.value(self.phase);
        if self.last != Some(value) {
            cx.midi
                .send(MidiEvent::control_change(CHANNEL, CONTROLLER, value));
            self.last = Some(value);
            self.draw_meter(&mut *cx.screen);
        }
        Flow::Stay
    }

    fn exit(&mut self, midi: &mut dyn MidiOut) {
        // park the wheel at rest
        if self.last.is_some_and(|v| v != 0) {
            midi.send(MidiEvent::control_change(CHANNEL, CONTROLLER, 0));
        }
        self.phase = 0.;
        self.last = None;
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

    fn step(lfo: &mut Lfo, touch: TouchState, fb: &mut Framebuffer<320, 240>, midi: &mut Recorder) {
        lfo.tick(Tick {
            touch,
            elapsed_ms: 20,
            midi,
            screen: fb,
        });
    }

    #[test]
    fn wave_values() {
        assert_eq!(Wave::Sine.value(0.), 64);
        assert_eq!(Wave::Sine.value(0.25), 127);
        assert_eq!(Wave::Triangle.value(0.5), 127);
        assert_eq!(Wave::Square.value(0.1), 127);
        assert_eq!(Wave::Square.value(0.7), 0);
        assert_eq!(Wave::Saw.value(0.5), 64);
    }

    #[test]
    fn emits_only_on_change() {
        let mut lfo = Lfo::new();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();
        lfo.enter(&mut fb);

        // third button is square
        step(&mut lfo, TouchState::tap(Point::new(200, 40)), &mut fb, &mut midi);
        assert_eq!(lfo.wave(), Wave::Square);
        for _ in 0..26 {
            step(&mut lfo, TouchState::default(), &mut fb, &mut midi);
        }
        assert_eq!(
            midi.0,
            [
                MidiEvent::control_change(CHANNEL, CONTROLLER, 127),
                MidiEvent::control_change(CHANNEL, CONTROLLER, 0),
            ]
        );
        assert!(midi.0.iter().all(|e| e.kind == MidiKind::ControlChange));
    }

    #[test]
    fn touch_x_sets_rate() {
        let mut lfo = Lfo::new();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();
        lfo.enter(&mut fb);

        step(&mut lfo, TouchState::tap(Point::new(0, 120)), &mut fb, &mut midi);
        assert_eq!(lfo.hz(), MIN_HZ);
        step(&mut lfo, TouchState::tap(Point::new(319, 120)), &mut fb, &mut midi);
        assert!((lfo.hz() - MAX_HZ).abs() < 1e-4);
        // the meter row is not part of the rate pad
        step(&mut lfo, TouchState::tap(Point::new(0, 210)), &mut fb, &mut midi);
        assert!((lfo.hz() - MAX_HZ).abs() < 1e-4);
    }

    #[test]
    fn exit_parks_the_wheel() {
        let mut lfo = Lfo::new();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();
        lfo.enter(&mut fb);

        step(&mut lfo, TouchState::default(), &mut fb, &mut midi);
        lfo.exit(&mut midi);
        assert_eq!(
            midi.0.last(),
            Some(&MidiEvent::control_change(CHANNEL, CONTROLLER, 0))
        );
        let sent = midi.0.len();
        lfo.exit(&mut midi);
        assert_eq!(midi.0.len(), sent);
    }
}
