//! Linux sysfs one-wire thermal probe (DS18B20 family).
//!
//! The `w1-therm` kernel driver exposes each probe as
//! `/sys/bus/w1/devices/28-xxxxxxxxxxxx/w1_slave`:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! The first line carries the CRC verdict, the second the reading in
//! millidegrees Celsius.

use std::io;
use std::path::{Path, PathBuf};

use crate::ports::ThermalProbe;

pub const W1_DEVICES_DIR: &str = "/sys/bus/w1/devices";

/// Family code prefix of DS18B20 probes.
const DS18B20_PREFIX: &str = "28-";

#[derive(Debug, Clone)]
pub struct W1Probe {
    slave_file: PathBuf,
}

impl W1Probe {
    /// Probe with the given one-wire id, e.g. `28-00000522ca34`.
    pub fn new(id: &str) -> Self {
        Self::at(Path::new(W1_DEVICES_DIR).join(id).join("w1_slave"))
    }

    /// Probe reading from an explicit `w1_slave` path.
    pub fn at(slave_file: impl Into<PathBuf>) -> Self {
        Self {
            slave_file: slave_file.into(),
        }
    }

    /// First DS18B20 found under `devices_dir`.
    pub fn first_in(devices_dir: &Path) -> io::Result<Self> {
        let mut ids: Vec<String> = std::fs::read_dir(devices_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(DS18B20_PREFIX))
            .collect();
        ids.sort();
        let id = ids.first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no one-wire thermal probe found")
        })?;
        Ok(Self::at(devices_dir.join(id).join("w1_slave")))
    }

    /// First DS18B20 on the system bus.
    pub fn first() -> io::Result<Self> {
        Self::first_in(Path::new(W1_DEVICES_DIR))
    }

    pub fn slave_file(&self) -> &Path {
        &self.slave_file
    }
}

impl ThermalProbe for W1Probe {
    type Error = io::Error;

    fn get_temperature(&self) -> io::Result<f64> {
        let text = std::fs::read_to_string(&self.slave_file)?;
        parse_w1_slave(&text)
    }
}

/// Parse the two-line `w1_slave` report into degrees Celsius.
pub fn parse_w1_slave(text: &str) -> io::Result<f64> {
    let invalid = |msg: &'static str| io::Error::new(io::ErrorKind::InvalidData, msg);

    let mut lines = text.lines();
    let crc_line = lines.next().ok_or_else(|| invalid("empty w1_slave report"))?;
    if !crc_line.trim_end().ends_with("YES") {
        return Err(invalid("w1_slave CRC check failed"));
    }
    let data_line = lines.next().ok_or_else(|| invalid("missing w1_slave data line"))?;
    let (_, millis) = data_line
        .rsplit_once("t=")
        .ok_or_else(|| invalid("missing t= field"))?;
    let millis: i32 = millis
        .trim()
        .parse()
        .map_err(|_| invalid("malformed t= field"))?;
    Ok(f64::from(millis) / 1000.0)
}
