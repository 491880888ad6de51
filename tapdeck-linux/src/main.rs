mod midi;
mod radio;
mod tui;

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use std::{sync::mpsc, time::SystemTime};
use tapdeck_core::{
    apps,
    transport::{Wired, Wireless},
    Config, Link, Mode, Orchestrator, Registry, Sink,
};

#[derive(Parser)]
#[command(version, about = "Desktop simulator for the tapdeck touch midi controller.")]
struct Cli {
    /// Control loop period in milliseconds.
    #[arg(long, default_value_t = 20)]
    tick_ms: u32,
    /// Send wired midi to the first output whose name contains this.
    #[arg(short, long)]
    port: Option<String>,
    /// Leave the wired output detached.
    #[arg(long, conflicts_with = "port")]
    no_midi: bool,
    /// List midi outputs and exit.
    #[arg(short, long)]
    list: bool,
    /// Start with the radio peer connected.
    #[arg(short, long)]
    connected: bool,
}

static LINK: Link = Link::new();

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.list {
        for name in midi::list()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let (tui_tx, tui_rx) = mpsc::channel();
    log::set_boxed_logger(Box::new(tui::Logger::new(tui_tx.clone())))?;
    log::set_max_level(log::LevelFilter::Debug);

    let config = Config {
        tick_ms: cli.tick_ms.max(1),
        ..Config::default()
    };
    let registry = Registry::new(&apps::icons())?;
    let seed = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_nanos() as u64;
    let mut keys = apps::Keys::new();
    let mut arp = apps::Arp::new();
    let mut lfo = apps::Lfo::new();
    let mut bounce = apps::Bounce::new(seed);
    let mut orch = Orchestrator::new(
        config,
        &registry,
        &LINK,
        [
            (apps::KEYS, &mut keys as &mut dyn Mode),
            (apps::ARP, &mut arp as &mut dyn Mode),
            (apps::LFO, &mut lfo as &mut dyn Mode),
            (apps::BOUNCE, &mut bounce as &mut dyn Mode),
        ],
    )?;

    let mut wired = if cli.no_midi {
        Wired::detached()
    } else {
        Wired::new(midi::open(cli.port.as_deref())?)
    };

    let (radio_tx, radio_rx) = mpsc::channel();
    let radio = radio::spawn(&LINK, radio_rx, tui_tx);
    if cli.connected {
        radio_tx.send(radio::Cmd::Connect)?;
    }
    let mut wireless = Wireless::new(&LINK, radio::Notifier::new(radio_tx.clone()));

    let mut sink: Sink<'_> = Sink::new();
    sink.attach(&mut wired)?;
    sink.attach(&mut wireless)?;

    let mut sim = tui::Simulator::new(config, &LINK, radio_tx.clone(), tui_rx);
    let mut terminal = ratatui::init();
    if let Err(e) = crossterm::execute!(std::io::stdout(), EnableMouseCapture) {
        ratatui::restore();
        return Err(e.into());
    }
    let result = sim.run(&mut terminal, &mut orch, &mut sink);
    crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
    ratatui::restore();

    let _ = radio_tx.send(radio::Cmd::Quit);
    let _ = radio.join();
    result
}
