//! host midi output standing in for the din uart

use color_eyre::eyre::{eyre, Result};
use embedded_io::ErrorKind;
use midir::{MidiOutput, MidiOutputConnection};

const CLIENT: &str = "tapdeck";

/// a midir connection seen as a byte sink; each write is one whole message
pub struct Port {
    conn: MidiOutputConnection,
}

impl embedded_io::ErrorType for Port {
    type Error = ErrorKind;
}

impl embedded_io::Write for Port {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.conn.send(buf).map_err(|_| ErrorKind::Other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// names of every output port
pub fn list() -> Result<Vec<String>> {
    let output = MidiOutput::new(CLIENT).map_err(|e| eyre!("{}", e))?;
    output
        .ports()
        .iter()
        .map(|port| output.port_name(port).map_err(|e| eyre!("{}", e)))
        .collect()
}

/// first output whose name contains `filter`; without one, a virtual port
/// other programs can subscribe to
pub fn open(filter: Option<&str>) -> Result<Port> {
    let output = MidiOutput::new(CLIENT).map_err(|e| eyre!("{}", e))?;
    match filter {
        Some(filter) => {
            let found = output.ports().into_iter().find_map(|port| {
                let name = output.port_name(&port).ok()?;
                name.contains(filter).then_some((port, name))
            });
            let Some((port, name)) = found else {
                return Err(eyre!("no midi output matches {:?}", filter));
            };
            let conn = output
                .connect(&port, "tapdeck wired")
                .map_err(|e| eyre!("{}", e))?;
            log::info!("wired out on {}", name);
            Ok(Port { conn })
        }
        None => virtual_port(output),
    }
}

#[cfg(unix)]
fn virtual_port(output: MidiOutput) -> Result<Port> {
    use midir::os::unix::VirtualOutput;

    let conn = output
        .create_virtual(CLIENT)
        .map_err(|e| eyre!("{}", e))?;
    log::info!("wired out on virtual port {}", CLIENT);
    Ok(Port { conn })
}

#[cfg(not(unix))]
fn virtual_port(output: MidiOutput) -> Result<Port> {
    let Some(port) = output.ports().into_iter().next() else {
        return Err(eyre!("no midi outputs; pass --no-midi"));
    };
    let name = output.port_name(&port).map_err(|e| eyre!("{}", e))?;
    let conn = output
        .connect(&port, "tapdeck wired")
        .map_err(|e| eyre!("{}", e))?;
    log::info!("wired out on {}", name);
    Ok(Port { conn })
}
