//! # Trace Log Grammar
//!
//! One record per line, newline-terminated:
//!
//! ```text
//! watch <start> <end>                      control, decimal arguments
//! unwatch <start> <end>                    control, decimal arguments
//! toggleTracing <0|1>                      control
//! <instruction-hex>: <R|W> <address-hex>   data, e.g. "0x401a2c: W 0x41a"
//! #eof                                     sentinel, written once at shutdown
//! ```
//!
//! Control arguments are logged exactly as the target passed them, before
//! any normalisation by the registry.

use crate::domain::{Address, TraceError};
use seltrace_common::{ControlEntry, Direction, EOF_SENTINEL};
use std::fmt;
use std::str::FromStr;

/// A control-channel call, as logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRecord {
    Watch { start: u64, end: u64 },
    Unwatch { start: u64, end: u64 },
    ToggleTracing { enable: bool },
}

impl ControlRecord {
    #[must_use]
    pub fn entry(&self) -> ControlEntry {
        match self {
            ControlRecord::Watch { .. } => ControlEntry::Watch,
            ControlRecord::Unwatch { .. } => ControlEntry::Unwatch,
            ControlRecord::ToggleTracing { .. } => ControlEntry::ToggleTracing,
        }
    }
}

impl fmt::Display for ControlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = self.entry().symbol();
        match *self {
            ControlRecord::Watch { start, end } | ControlRecord::Unwatch { start, end } => {
                write!(f, "{keyword} {start} {end}")
            }
            ControlRecord::ToggleTracing { enable } => write!(f, "{keyword} {}", u8::from(enable)),
        }
    }
}

/// One matched memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRecord {
    pub instruction: Address,
    pub direction: Direction,
    pub address: Address,
}

impl fmt::Display for DataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.instruction, self.direction, self.address)
    }
}

/// Any line of a trace log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLine {
    Control(ControlRecord),
    Data(DataRecord),
    Eof,
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceLine::Control(record) => record.fmt(f),
            TraceLine::Data(record) => record.fmt(f),
            TraceLine::Eof => f.write_str(EOF_SENTINEL),
        }
    }
}

impl FromStr for TraceLine {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line == EOF_SENTINEL {
            return Ok(TraceLine::Eof);
        }

        let mut fields = line.split_whitespace();
        let head = fields.next().ok_or("empty line")?;

        if let Some(instruction) = head.strip_suffix(':') {
            let instruction = parse_hex(instruction)?;
            let tag = fields.next().ok_or("missing access direction")?;
            let direction = Direction::from_tag(tag).ok_or_else(|| format!("bad direction '{tag}'"))?;
            let address = parse_hex(fields.next().ok_or("missing data address")?)?;
            expect_end(fields)?;
            return Ok(TraceLine::Data(DataRecord { instruction, direction, address }));
        }

        let entry =
            ControlEntry::from_symbol(head).ok_or_else(|| format!("unknown keyword '{head}'"))?;
        let record = match entry {
            ControlEntry::Watch | ControlEntry::Unwatch => {
                let start = parse_decimal(fields.next().ok_or("missing range start")?)?;
                let end = parse_decimal(fields.next().ok_or("missing range end")?)?;
                if entry == ControlEntry::Watch {
                    ControlRecord::Watch { start, end }
                } else {
                    ControlRecord::Unwatch { start, end }
                }
            }
            ControlEntry::ToggleTracing => match fields.next() {
                Some("0") => ControlRecord::ToggleTracing { enable: false },
                Some("1") => ControlRecord::ToggleTracing { enable: true },
                Some(other) => return Err(format!("bad toggle value '{other}'")),
                None => return Err("missing toggle value".to_string()),
            },
        };
        expect_end(fields)?;
        Ok(TraceLine::Control(record))
    }
}

impl TraceLine {
    /// Parse a line, attaching its 1-based line number to any error
    ///
    /// # Errors
    /// Returns [`TraceError::MalformedLine`] if the line does not match the grammar
    pub fn parse_numbered(line: &str, number: usize) -> Result<Self, TraceError> {
        line.parse()
            .map_err(|reason| TraceError::MalformedLine { line: number, reason })
    }
}

fn parse_hex(field: &str) -> Result<Address, String> {
    let digits = field
        .strip_prefix("0x")
        .ok_or_else(|| format!("address '{field}' lacks 0x prefix"))?;
    u64::from_str_radix(digits, 16)
        .map(Address)
        .map_err(|e| format!("bad address '{field}': {e}"))
}

fn parse_decimal(field: &str) -> Result<u64, String> {
    field.parse().map_err(|e| format!("bad argument '{field}': {e}"))
}

fn expect_end<'a>(mut fields: impl Iterator<Item = &'a str>) -> Result<(), String> {
    match fields.next() {
        Some(extra) => Err(format!("unexpected field '{extra}'")),
        None => Ok(()),
    }
}
