//! touch sampling with rising-edge detection

use embedded_graphics::prelude::Point;

/// raw touch controller, orientation already normalized to display space
pub trait TouchPanel {
    /// last sample; `None` while nothing touches the surface
    fn read(&mut self) -> Option<Point>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchState {
    pub x: i32,
    pub y: i32,
    pub pressed: bool,
    /// true only on the tick `pressed` went false -> true
    pub just_pressed: bool,
}

impl TouchState {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// single-tick tap at `point`
    pub fn tap(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            pressed: true,
            just_pressed: true,
        }
    }
}

pub struct Sampler<P: TouchPanel> {
    panel: P,
    last: TouchState,
}

impl<P: TouchPanel> Sampler<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            last: TouchState::default(),
        }
    }

    /// call once per tick
    pub fn sample(&mut self) -> TouchState {
        let was_pressed = self.last.pressed;
        match self.panel.read() {
            Some(point) => {
                self.last.x = point.x;
                self.last.y = point.y;
                self.last.pressed = true;
            }
            // position holds at the release point
            None => self.last.pressed = false,
        }
        self.last.just_pressed = self.last.pressed && !was_pressed;
        self.last
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}
