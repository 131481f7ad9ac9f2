use crate::scheme::{ImageSize, SchemeKind};
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("cartridge image is empty")]
    EmptyImage,
    #[error("image size {size} is not a multiple of the {bank_size}-byte bank size")]
    SizeNotMultiple { size: usize, bank_size: usize },
    #[error("{scheme} images must be {expected}; image is {size} bytes")]
    SizeMismatch {
        scheme: SchemeKind,
        size: usize,
        expected: ImageSize,
    },
    #[error("image has {bank_count} banks, more than a bank index can address")]
    TooManyBanks { bank_count: usize },
    #[error("bank layout needs at least {minimum} banks, image has {bank_count}")]
    TooFewBanks { bank_count: u16, minimum: u16 },
    #[error("start bank {start_bank} is out of range for an image with {bank_count} banks")]
    StartBankOutOfRange { start_bank: u16, bank_count: u16 },
}

/// Everything the loader decides about a cartridge before handing over the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeConfig {
    pub scheme: SchemeKind,
    /// Overrides the scheme's power-on bank
    #[serde(default)]
    pub start_bank: Option<u16>,
}

impl CartridgeConfig {
    pub fn new(scheme: SchemeKind) -> Self {
        Self {
            scheme,
            start_bank: None,
        }
    }

    #[must_use]
    pub fn with_start_bank(self, start_bank: u16) -> Self {
        Self {
            start_bank: Some(start_bank),
            ..self
        }
    }
}

impl std::fmt::Display for CartridgeConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "scheme: {}", self.scheme)?;
        writeln!(f, "bank_size: {}", self.scheme.bank_size())?;
        writeln!(f, "address_mask: {:04X}", self.scheme.address_mask())?;
        match self.start_bank {
            Some(start_bank) => writeln!(f, "start_bank: {start_bank}")?,
            None => writeln!(f, "start_bank: <scheme default>")?,
        }

        Ok(())
    }
}
