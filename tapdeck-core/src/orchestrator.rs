//! top-level state machine: menu <-> one mode at a time

use crate::{
    all_notes_off, AppMode, Config, Error, Flow, Layout, Link, MidiOut, Mode, Registry, Screen,
    Tick, TouchState, MAX_APPS,
};

pub struct Orchestrator<'a> {
    config: Config,
    registry: &'a Registry,
    layout: Layout,
    link: &'a Link,
    modes: heapless::Vec<(AppMode, &'a mut dyn Mode), MAX_APPS>,
    current: AppMode,
}

impl<'a> Orchestrator<'a> {
    /// `modes` is the dispatch table; it must cover the registry exactly
    pub fn new(
        config: Config,
        registry: &'a Registry,
        link: &'a Link,
        modes: impl IntoIterator<Item = (AppMode, &'a mut dyn Mode)>,
    ) -> Result<Self, Error> {
        let mut table: heapless::Vec<(AppMode, &'a mut dyn Mode), MAX_APPS> = heapless::Vec::new();
        for (mode, app) in modes {
            if mode == AppMode::Menu {
                return Err(Error::MenuEntry);
            }
            if table.iter().any(|(m, _)| *m == mode) {
                return Err(Error::DuplicateMode(mode));
            }
            if !registry.contains(mode) {
                return Err(Error::Unregistered(mode));
            }
            table
                .push((mode, app))
                .map_err(|_| Error::CapacityExceeded {
                    capacity: MAX_APPS,
                })?;
        }
        if let Some((_, icon)) = registry
            .iter()
            .find(|(_, icon)| !table.iter().any(|(m, _)| *m == icon.mode))
        {
            return Err(Error::Unmapped(icon.mode));
        }
        Ok(Self {
            config,
            registry,
            layout: Layout::new(registry.len(), config.geometry, config.display),
            link,
            modes: table,
            current: AppMode::Menu,
        })
    }

    pub fn current(&self) -> AppMode {
        self.current
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// first paint after power-up
    pub fn start(&mut self, screen: &mut dyn Screen) {
        self.current = AppMode::Menu;
        self.draw_menu(screen);
    }

    /// one control-loop period
    pub fn tick(
        &mut self,
        touch: TouchState,
        elapsed_ms: u32,
        screen: &mut dyn Screen,
        midi: &mut dyn MidiOut,
    ) {
        let pending = self.link.take();
        if pending.sweep {
            all_notes_off(midi, self.config.sweep_channels);
        }

        match self.current {
            AppMode::Menu => {
                if pending.redraw {
                    self.layout.render_header(screen, self.link.state());
                }
                if touch.just_pressed {
                    if let Some(mode) = self.layout.hit_test(touch.point(), self.registry) {
                        self.enter(mode, screen);
                    }
                }
            }
            mode => {
                let Some(app) = self.app(mode) else {
                    self.current = AppMode::Menu;
                    self.draw_menu(screen);
                    return;
                };
                let flow = app.tick(Tick {
                    touch,
                    elapsed_ms,
                    midi: &mut *midi,
                    screen: &mut *screen,
                });
                if flow == Flow::Exit {
                    app.exit(midi);
                    info!("exit {}", mode);
                    self.current = AppMode::Menu;
                    self.draw_menu(screen);
                }
            }
        }
    }

    fn enter(&mut self, mode: AppMode, screen: &mut dyn Screen) {
        let Some(app) = self.app(mode) else {
            return;
        };
        app.enter(screen);
        info!("enter {}", mode);
        self.current = mode;
    }

    fn app(&mut self, mode: AppMode) -> Option<&mut (dyn Mode + 'a)> {
        self.modes
            .iter_mut()
            .find(|(m, _)| *m == mode)
            .map(|(_, app)| &mut **app)
    }

    fn draw_menu(&self, screen: &mut dyn Screen) {
        self.layout.render(screen, self.registry, self.link.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppIcon, Framebuffer, MidiEvent, MidiKind};
    use embedded_graphics::{pixelcolor::{Rgb565, RgbColor}, prelude::Point};

    #[derive(Default)]
    struct Recorder(Vec<MidiEvent>);

    impl MidiOut for Recorder {
        fn send(&mut self, event: MidiEvent) {
            self.0.push(event);
        }
    }

    /// plays note 60 on entry's first tick, leaves on any later tap
    #[derive(Default)]
    struct Scripted {
        entered: usize,
        ticks: usize,
        exited: usize,
    }

    impl Mode for Scripted {
        fn enter(&mut self, screen: &mut dyn Screen) {
            self.entered += 1;
            screen.fill(Rgb565::MAGENTA);
        }

        fn tick(&mut self, cx: Tick<'_>) -> Flow {
            self.ticks += 1;
            if self.ticks == 1 {
                cx.midi.send(MidiEvent::note_on(0, 60, 100));
            }
            if cx.touch.just_pressed {
                Flow::Exit
            } else {
                Flow::Stay
            }
        }

        fn exit(&mut self, midi: &mut dyn MidiOut) {
            self.exited += 1;
            midi.send(MidiEvent::note_off(0, 60));
        }
    }

    fn icons(count: u8) -> Vec<AppIcon> {
        (0..count)
            .map(|id| AppIcon {
                name: "scripted",
                symbol: 'P',
                color: Rgb565::YELLOW,
                mode: AppMode::App(id),
            })
            .collect()
    }

    fn idle() -> TouchState {
        TouchState::default()
    }

    #[test]
    fn dispatch_table_must_match_registry() {
        let registry = Registry::new(&icons(2)).unwrap();
        let link = Link::new();
        let mut a = Scripted::default();
        let mut b = Scripted::default();
        let mut c = Scripted::default();

        let err = Orchestrator::new(
            Config::default(),
            &registry,
            &link,
            [(AppMode::App(0), &mut a as &mut dyn Mode)],
        )
        .err();
        assert_eq!(err, Some(Error::Unmapped(AppMode::App(1))));

        let err = Orchestrator::new(
            Config::default(),
            &registry,
            &link,
            [
                (AppMode::App(0), &mut b as &mut dyn Mode),
                (AppMode::App(7), &mut c as &mut dyn Mode),
            ],
        )
        .err();
        assert_eq!(err, Some(Error::Unregistered(AppMode::App(7))));
    }

    #[test]
    fn menu_to_mode_and_back() {
        let registry = Registry::new(&icons(3)).unwrap();
        let link = Link::new();
        let mut scripted: [Scripted; 3] = Default::default();
        let mut orch = Orchestrator::new(
            Config::default(),
            &registry,
            &link,
            scripted
                .iter_mut()
                .enumerate()
                .map(|(i, p)| (AppMode::App(i as u8), p as &mut dyn Mode)),
        )
        .unwrap();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();
        orch.start(&mut fb);

        let target = orch.layout().cell_rect(1).center();
        orch.tick(TouchState::tap(target), 20, &mut fb, &mut midi);
        assert_eq!(orch.current(), AppMode::App(1));
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Rgb565::MAGENTA));

        orch.tick(idle(), 20, &mut fb, &mut midi);
        orch.tick(TouchState::tap(Point::new(5, 5)), 20, &mut fb, &mut midi);
        assert_eq!(orch.current(), AppMode::Menu);
        assert_eq!(
            midi.0.iter().map(|e| e.kind).collect::<Vec<_>>(),
            [MidiKind::NoteOn, MidiKind::NoteOff]
        );
        drop(orch);
        assert_eq!(scripted[1].entered, 1);
        assert_eq!(scripted[1].ticks, 2);
        assert_eq!(scripted[1].exited, 1);
        assert_eq!(scripted[0].entered + scripted[2].entered, 0);
    }

    #[test]
    fn entering_tap_is_not_forwarded() {
        let registry = Registry::new(&icons(1)).unwrap();
        let link = Link::new();
        let mut scripted = Scripted::default();
        let mut orch = Orchestrator::new(
            Config::default(),
            &registry,
            &link,
            [(AppMode::App(0), &mut scripted as &mut dyn Mode)],
        )
        .unwrap();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();

        let target = orch.layout().cell_rect(0).center();
        orch.tick(TouchState::tap(target), 20, &mut fb, &mut midi);
        assert_eq!(orch.current(), AppMode::App(0));
        assert!(midi.0.is_empty());
    }

    #[test]
    fn held_touch_in_menu_is_ignored() {
        let registry = Registry::new(&icons(1)).unwrap();
        let link = Link::new();
        let mut scripted = Scripted::default();
        let mut orch = Orchestrator::new(
            Config::default(),
            &registry,
            &link,
            [(AppMode::App(0), &mut scripted as &mut dyn Mode)],
        )
        .unwrap();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();

        let mut held = TouchState::tap(orch.layout().cell_rect(0).center());
        held.just_pressed = false;
        orch.tick(held, 20, &mut fb, &mut midi);
        assert_eq!(orch.current(), AppMode::Menu);
    }

    #[test]
    fn disconnect_sweeps_once_on_the_next_tick() {
        let registry = Registry::new(&icons(1)).unwrap();
        let link = Link::new();
        let mut scripted = Scripted::default();
        let config = Config {
            sweep_channels: 1,
            ..Config::default()
        };
        let mut orch = Orchestrator::new(
            config,
            &registry,
            &link,
            [(AppMode::App(0), &mut scripted as &mut dyn Mode)],
        )
        .unwrap();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();

        link.on_connect();
        link.on_disconnect();
        link.on_disconnect();
        orch.tick(idle(), 20, &mut fb, &mut midi);
        assert_eq!(midi.0.len(), 128);
        orch.tick(idle(), 20, &mut fb, &mut midi);
        assert_eq!(midi.0.len(), 128);
    }

    /// centre of the status dot in the menu header
    const STATUS_DOT: Point = Point::new(212, 12);

    #[test]
    fn connect_in_menu_repaints_status() {
        let registry = Registry::new(&icons(1)).unwrap();
        let link = Link::new();
        let mut scripted = Scripted::default();
        let mut orch = Orchestrator::new(
            Config::default(),
            &registry,
            &link,
            [(AppMode::App(0), &mut scripted as &mut dyn Mode)],
        )
        .unwrap();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();
        orch.start(&mut fb);
        assert_ne!(fb.pixel(STATUS_DOT), Some(Rgb565::GREEN));

        link.on_connect();
        orch.tick(idle(), 20, &mut fb, &mut midi);
        assert_eq!(fb.pixel(STATUS_DOT), Some(Rgb565::GREEN));
        assert!(midi.0.is_empty());
    }

    #[test]
    fn connect_in_mode_leaves_mode_screen_alone() {
        let registry = Registry::new(&icons(1)).unwrap();
        let link = Link::new();
        let mut scripted = Scripted::default();
        let mut orch = Orchestrator::new(
            Config::default(),
            &registry,
            &link,
            [(AppMode::App(0), &mut scripted as &mut dyn Mode)],
        )
        .unwrap();
        let mut fb = Framebuffer::<320, 240>::new();
        let mut midi = Recorder::default();
        orch.start(&mut fb);

        let target = orch.layout().cell_rect(0).center();
        orch.tick(TouchState::tap(target), 20, &mut fb, &mut midi);
        assert_eq!(fb.pixel(STATUS_DOT), Some(Rgb565::MAGENTA));

        link.on_connect();
        orch.tick(idle(), 20, &mut fb, &mut midi);
        assert_eq!(orch.current(), AppMode::App(0));
        assert_eq!(fb.pixel(STATUS_DOT), Some(Rgb565::MAGENTA));
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Rgb565::MAGENTA));
    }
}
