//! Simulation scripts
//!
//! A script is a synthetic target program in JSON: an ordered list of control
//! calls, instruction executions and an optional exit.
//!
//! ```json
//! {
//!   "steps": [
//!     { "call": { "symbol": "watch", "args": [1000, 1099] } },
//!     { "call": { "symbol": "toggleTracing", "args": [1] } },
//!     { "exec": { "instruction": "0x401000",
//!                 "operands": [{ "kind": "write", "address": 1050 }] } },
//!     { "exit": { "code": 0 } }
//!   ]
//! }
//! ```
//!
//! Addresses and arguments are JSON integers or `0x`-prefixed hex strings.
//! A `"flush"` step drops the engine's code cache, so every site is
//! discovered again (and probed per the current trace gate) on its next
//! execution.
//! A script without an `exit` step exits with code 0 after its last step.

use super::{MemoryOperand, SimulatedEngine};
use crate::domain::{Address, TraceError};
use log::warn;
use seltrace_common::ControlEntry;
use serde::Deserialize;
use std::path::Path;

/// An integer given either as a JSON number or as a hex string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(u64),
    Text(String),
}

impl RawValue {
    fn value(&self) -> Result<u64, TraceError> {
        match self {
            RawValue::Number(n) => Ok(*n),
            RawValue::Text(text) => text
                .strip_prefix("0x")
                .and_then(|digits| u64::from_str_radix(digits, 16).ok())
                .ok_or_else(|| TraceError::InvalidScript(format!("bad hex value '{text}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OperandKind {
    Read,
    Write,
    ReadWrite,
}

impl From<OperandKind> for MemoryOperand {
    fn from(kind: OperandKind) -> Self {
        match kind {
            OperandKind::Read => MemoryOperand::READ,
            OperandKind::Write => MemoryOperand::WRITE,
            OperandKind::ReadWrite => MemoryOperand::READ_WRITE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawOperand {
    kind: OperandKind,
    address: RawValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawStep {
    Call { symbol: String, args: Vec<RawValue> },
    Exec { instruction: RawValue, operands: Vec<RawOperand> },
    Flush,
    Exit { code: i32 },
}

#[derive(Debug, Clone, Deserialize)]
struct RawScript {
    steps: Vec<RawStep>,
}

/// One validated step of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Call { entry: ControlEntry, args: Vec<u64> },
    Exec { instruction: Address, operands: Vec<(MemoryOperand, Address)> },
    Flush,
    Exit { code: i32 },
}

/// A validated simulation script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Load and validate a script file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails validation (see [`Script::parse`])
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a script
    ///
    /// Every call must name a control entry point and pass exactly as many
    /// arguments as it takes.
    ///
    /// # Errors
    /// Returns [`TraceError::Json`] for malformed JSON,
    /// [`TraceError::UnknownEntryPoint`] or [`TraceError::ArgumentCount`] for bad
    /// calls, and [`TraceError::InvalidScript`] for bad hex values
    pub fn parse(content: &str) -> Result<Self, TraceError> {
        let raw: RawScript = serde_json::from_str(content)?;
        let steps = raw.steps.into_iter().map(Step::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Drive `engine` through every step, then exit if the script did not
    ///
    /// Returns the exit code. Steps after an `exit` step are skipped.
    pub fn run(&self, engine: &mut SimulatedEngine) -> i32 {
        let mut exit_code = None;
        for (idx, step) in self.steps.iter().enumerate() {
            if let Some(code) = exit_code {
                warn!("skipping {} step(s) after exit({code})", self.steps.len() - idx);
                break;
            }
            match step {
                Step::Call { entry, args } => {
                    engine.call(entry.symbol(), args);
                }
                Step::Exec { instruction, operands } => {
                    engine.execute(*instruction, operands);
                }
                Step::Flush => engine.flush_code_cache(),
                Step::Exit { code } => {
                    engine.exit(*code);
                    exit_code = Some(*code);
                }
            }
        }

        let code = exit_code.unwrap_or(0);
        engine.exit(code);
        code
    }
}

impl TryFrom<RawStep> for Step {
    type Error = TraceError;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        match raw {
            RawStep::Call { symbol, args } => {
                let entry = ControlEntry::from_symbol(&symbol)
                    .ok_or(TraceError::UnknownEntryPoint(symbol))?;
                if args.len() != entry.arity() {
                    return Err(TraceError::ArgumentCount {
                        symbol: entry.symbol(),
                        expected: entry.arity(),
                        actual: args.len(),
                    });
                }
                let args = args.iter().map(RawValue::value).collect::<Result<Vec<_>, _>>()?;
                Ok(Step::Call { entry, args })
            }
            RawStep::Exec { instruction, operands } => {
                let instruction = Address(instruction.value()?);
                let operands = operands
                    .into_iter()
                    .map(|op| -> Result<(MemoryOperand, Address), TraceError> {
                        Ok((op.kind.into(), Address(op.address.value()?)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Step::Exec { instruction, operands })
            }
            RawStep::Flush => Ok(Step::Flush),
            RawStep::Exit { code } => Ok(Step::Exit { code }),
        }
    }
}
