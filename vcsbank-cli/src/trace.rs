use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use vcsbank_core::{Access, Cartridge, SchemeKind};

/// A recorded sequence of bus accesses, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Trace {
    pub scheme: Option<SchemeKind>,

    pub start_bank: Option<u16>,

    #[serde(default, rename = "access")]
    pub accesses: Vec<TraceAccess>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TraceAccess {
    pub address: u16,

    /// Data written; absent for reads
    pub write: Option<u8>,
}

impl TraceAccess {
    pub fn access(&self) -> Access {
        self.write.map_or(Access::Read, Access::Write)
    }
}

impl Trace {
    pub fn from_toml_file<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let trace_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("error reading trace file from '{path:?}'"))?;
        let trace = Self::from_toml_str(&trace_str)
            .with_context(|| format!("error parsing trace file at '{path:?}'"))?;

        Ok(trace)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, anyhow::Error> {
        let trace: Self = toml::from_str(s)?;
        Ok(trace)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub address: u16,
    pub access: Access,
    pub handled: bool,
    pub bank: u16,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let access = match self.access {
            Access::Read => String::from("R   "),
            Access::Write(value) => format!("W {value:02X}"),
        };
        let handled = if self.handled { "switch" } else { "-" };
        write!(f, "{:04X}  {access}  {handled:<6}  bank {}", self.address, self.bank)
    }
}

/// Feed every access in the trace to the cartridge and record the bank after each one.
pub fn replay(cartridge: &mut Cartridge, accesses: &[TraceAccess]) -> Vec<Step> {
    accesses
        .iter()
        .map(|trace_access| {
            let access = trace_access.access();
            let handled = cartridge.on_access(trace_access.address, access);
            Step {
                address: trace_access.address,
                access,
                handled,
                bank: cartridge.active_bank(),
            }
        })
        .collect()
}
