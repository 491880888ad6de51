use crate::radio;

use color_eyre::eyre::Result;
use crossterm::event::{
    self, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use embedded_graphics::pixelcolor::RgbColor;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Stylize},
    text::{Line, Text},
    widgets::{Block, Padding, Paragraph, Widget},
    DefaultTerminal, Frame,
};
use std::{
    collections::VecDeque,
    sync::mpsc::{Receiver, Sender},
    time::{Duration, Instant},
};
use tapdeck_core::{
    AppMode, Config, Framebuffer, Link, MidiOut, Orchestrator, Point, Rgb565, Sampler,
    TouchPanel, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};

const LOG_DURATION: Duration = Duration::from_millis(1500);
const PEER_LINES: usize = 12;
const SIDE_WIDTH: u16 = 30;

pub type Display = Framebuffer<{ DISPLAY_WIDTH as usize }, { DISPLAY_HEIGHT as usize }>;

pub enum Cmd {
    Log(String),
    /// a packet as decoded by the radio peer
    Peer(String),
}

/// forwards log records to the status line; stderr belongs to the terminal
pub struct Logger {
    tx: Sender<Cmd>,
}

impl Logger {
    pub fn new(tx: Sender<Cmd>) -> Self {
        Self { tx }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let _ = self
                .tx
                .send(Cmd::Log(format!("{:<5} {}", record.level(), record.args())));
        }
    }

    fn flush(&self) {}
}

/// left mouse button over the rendered display
#[derive(Default)]
pub struct Mouse {
    down: Option<Point>,
    /// a click released before the next sample still touches for one tick
    tapped: Option<Point>,
}

impl TouchPanel for Mouse {
    fn read(&mut self) -> Option<Point> {
        let tapped = self.tapped.take();
        self.down.or(tapped)
    }
}

/// terminal cells -> display pixels; two pixel rows per cell row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Viewport {
    area: Rect,
    scale: u16,
}

impl Viewport {
    fn fit(space: Rect) -> Self {
        let w = DISPLAY_WIDTH as u16;
        let h = DISPLAY_HEIGHT as u16;
        let scale = w
            .div_ceil(space.width.max(1))
            .max(h.div_ceil(space.height.max(1) * 2))
            .max(1);
        let width = w / scale;
        let height = h / (scale * 2);
        let area = Rect {
            x: space.x + space.width.saturating_sub(width) / 2,
            y: space.y + space.height.saturating_sub(height) / 2,
            width: width.min(space.width),
            height: height.min(space.height),
        };
        Self { area, scale }
    }

    /// pixel under the middle of a cell's upper half-block
    fn pixel(&self, column: u16, row: u16) -> Option<Point> {
        let inside = column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height;
        inside.then(|| {
            Point::new(
                ((column - self.area.x) * self.scale + self.scale / 2) as i32,
                ((row - self.area.y) * self.scale * 2 + self.scale / 2) as i32,
            )
        })
    }
}

struct Panel<'a> {
    display: &'a Display,
    scale: u16,
}

fn color(pixel: Rgb565) -> Color {
    Color::Rgb(
        (pixel.r() << 3) | (pixel.r() >> 2),
        (pixel.g() << 2) | (pixel.g() >> 4),
        (pixel.b() << 3) | (pixel.b() >> 2),
    )
}

impl Widget for Panel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.display.rows();
        let step = self.scale as usize;
        for cy in 0..area.height {
            for cx in 0..area.width {
                let x = cx as usize * step;
                let y = cy as usize * step * 2;
                let (Some(top), Some(bottom)) = (
                    rows.get(y).and_then(|r| r.get(x)),
                    rows.get(y + step).and_then(|r| r.get(x)),
                ) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_char('▀').set_fg(color(*top)).set_bg(color(*bottom));
                }
            }
        }
    }
}

pub struct Simulator {
    config: Config,
    link: &'static Link,
    display: Box<Display>,
    sampler: Sampler<Mouse>,
    viewport: Viewport,

    log: Option<(Instant, String)>,
    peer: VecDeque<String>,
    current: AppMode,

    radio_tx: Sender<radio::Cmd>,
    rx: Receiver<Cmd>,
}

impl Simulator {
    pub fn new(
        config: Config,
        link: &'static Link,
        radio_tx: Sender<radio::Cmd>,
        rx: Receiver<Cmd>,
    ) -> Self {
        Self {
            config,
            link,
            display: Box::new(Display::new()),
            sampler: Sampler::new(Mouse::default()),
            viewport: Viewport::fit(Rect::default()),

            log: None,
            peer: VecDeque::with_capacity(PEER_LINES),
            current: AppMode::Menu,

            radio_tx,
            rx,
        }
    }

    /// the device control loop, paced at the configured tick period
    pub fn run(
        &mut self,
        terminal: &mut DefaultTerminal,
        orch: &mut Orchestrator<'_>,
        midi: &mut dyn MidiOut,
    ) -> Result<()> {
        let period = Duration::from_millis(self.config.tick_ms as u64);
        orch.start(&mut *self.display);
        terminal.draw(|frame| self.draw(frame))?;
        let mut last = Instant::now();
        loop {
            let mut flush = false;
            let deadline = last + period;
            while let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                if event::poll(wait)? {
                    if self.input(event::read()?)? {
                        return Ok(());
                    }
                    flush = true;
                }
            }

            let now = Instant::now();
            let elapsed_ms = now.duration_since(last).as_millis().min(u32::MAX as u128) as u32;
            last = now;
            let touch = self.sampler.sample();
            orch.tick(touch, elapsed_ms, &mut *self.display, midi);
            if orch.current() != self.current {
                self.current = orch.current();
                flush = true;
            }

            if let Some((start, ..)) = &self.log {
                if start.elapsed() >= LOG_DURATION {
                    self.log = None;
                    flush = true;
                }
            }
            while let Ok(cmd) = self.rx.try_recv() {
                self.cmd(cmd);
                flush = true;
            }
            if self.display.take_dirty() || flush {
                terminal.draw(|frame| self.draw(frame))?;
            }
        }
    }

    /// returns true if should exit
    fn input(&mut self, event: event::Event) -> Result<bool> {
        match event {
            event::Event::Key(KeyEvent {
                code: KeyCode::Char('q'),
                kind: KeyEventKind::Press,
                ..
            }) => return Ok(true),
            event::Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                kind: KeyEventKind::Press,
                ..
            }) => {
                self.radio_tx.send(radio::Cmd::Connect)?;
                self.log = Some((Instant::now(), "peer connecting".to_string()));
            }
            event::Event::Key(KeyEvent {
                code: KeyCode::Char('d'),
                kind: KeyEventKind::Press,
                ..
            }) => {
                self.radio_tx.send(radio::Cmd::Disconnect)?;
            }
            event::Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => {
                let panel = self.sampler.panel_mut();
                match kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        panel.down = self.viewport.pixel(column, row);
                        panel.tapped = panel.down;
                    }
                    // dragging off the display keeps the last contact
                    MouseEventKind::Drag(MouseButton::Left) => {
                        if let Some(point) = self.viewport.pixel(column, row) {
                            panel.down = Some(point);
                        }
                    }
                    MouseEventKind::Up(MouseButton::Left) => panel.down = None,
                    _ => (),
                }
            }
            _ => (),
        }
        Ok(false)
    }

    fn cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::Log(msg) => self.log = Some((Instant::now(), msg)),
            Cmd::Peer(msg) => {
                if self.peer.len() == PEER_LINES {
                    self.peer.pop_front();
                }
                self.peer.push_back(msg);
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [body, log_area] =
            Layout::vertical([Constraint::Min(4), Constraint::Length(1)]).areas(frame.area());
        let [screen, side] =
            Layout::horizontal([Constraint::Min(10), Constraint::Length(SIDE_WIDTH)]).areas(body);

        self.viewport = Viewport::fit(screen);
        frame.render_widget(
            Panel {
                display: &self.display,
                scale: self.viewport.scale,
            },
            self.viewport.area,
        );
        frame.render_widget(self.side(), side);
        if let Some((_, msg)) = &self.log {
            frame.render_widget(Line::raw(msg.as_str()).italic(), log_area);
        }
    }

    fn side(&self) -> Paragraph<'_> {
        let mut lines = vec![
            Line::raw(format!("mode  {}", self.current)),
            Line::raw(format!("link  {}", self.link.state())),
            Line::raw(format!("tick  {} ms", self.config.tick_ms)),
            Line::raw(format!("scale 1/{}", self.viewport.scale)),
            Line::raw(""),
            Line::raw("peer").bold(),
        ];
        lines.extend(self.peer.iter().map(|p| Line::raw(p.as_str())));
        lines.extend((self.peer.len()..PEER_LINES).map(|_| Line::raw("")));
        lines.extend([
            Line::raw(""),
            Line::raw("mouse  touch").dim(),
            Line::raw("c/d    connect/drop peer").dim(),
            Line::raw("q      quit").dim(),
        ]);
        Paragraph::new(Text::from(lines)).block(
            Block::bordered()
                .title(" tapdeck ")
                .padding(Padding::horizontal(1)),
        )
    }
}
