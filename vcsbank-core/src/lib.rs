//! Bank switching for Atari 2600 cartridges.
//!
//! A [`Cartridge`] owns the ROM image in a [`BankStore`] and a [`SwitchDecoder`] for one
//! [`SchemeKind`]. The bus feeds every memory access to [`Cartridge::on_access`]; accesses that hit
//! one of the scheme's hotspots move the active bank, everything else is left to the caller.

pub mod address;
mod bank;
mod cartridge;
mod config;
mod decoder;
mod scheme;
mod serialize;

pub use bank::{BankLayout, BankOutOfRange, BankStore};
pub use cartridge::Cartridge;
pub use config::{CartridgeConfig, ConfigurationError};
pub use decoder::{Access, Decision, SwitchDecoder};
pub use scheme::{ImageSize, OutOfRangePolicy, SchemeKind, TriggerRule};
pub use serialize::{snapshot_from_bytes, snapshot_to_bytes, BankSnapshot, SaveStateError};
