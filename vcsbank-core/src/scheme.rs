use crate::address;
use crate::bank::BankLayout;
use crate::config::ConfigurationError;
use std::fmt::Formatter;
use vcsbank_proc_macros::SchemeMnemonic;

/// Cartridge bank-switching schemes, named by their conventional mnemonics.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SchemeMnemonic)]
pub enum SchemeKind {
    /// Atari 8KB
    F8,
    /// Atari 16KB
    F6,
    /// Atari 32KB
    F4,
    /// CBS RAM Plus, 12KB
    FA,
    /// Paul Slocum / Homestar Runner 64KB
    EF,
    /// CPUWIZ 128KB
    DF,
    /// CPUWIZ 256KB
    BF,
    /// UA Limited 8KB
    UA,
    /// UA Limited 8KB with the hotspots swapped
    #[mnemonic = "UASW"]
    UaSwapped,
    /// Econobanking 8KB
    #[mnemonic = "0840"]
    Econobanking,
    /// Tigervision 2KB banks, lower half of the window only
    #[mnemonic = "3F"]
    Tigervision,
}

/// The condition under which an access triggers a bank switch, and how the target bank is
/// derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRule {
    /// Any access to a cartridge window address in `first..=last` selects bank `address - first`.
    WindowRange { first: u16, last: u16 },
    /// Any access to a bus address with `address & mask == hotspot` selects the paired bank.
    BusHotspots {
        mask: u16,
        hotspots: &'static [(u16, u16)],
    },
    /// A write to a bus address in `0..=last` selects the written value as the bank.
    BusWrite { last: u16 },
}

impl TriggerRule {
    /// Whether the rule's hotspots live inside the cartridge window (A12 set).
    pub fn in_window(self) -> bool {
        matches!(self, Self::WindowRange { .. })
    }
}

/// What to do with a computed bank index that does not exist in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRangePolicy {
    /// Use the last bank.
    Clamp,
    /// Take the index modulo the bank count.
    Wrap,
}

impl OutOfRangePolicy {
    pub fn resolve(self, requested: u16, bank_count: u16) -> u16 {
        if requested < bank_count {
            return requested;
        }

        match self {
            Self::Clamp => bank_count - 1,
            Self::Wrap => requested % bank_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Exact(usize),
    Multiple {
        bank_size: usize,
        min: usize,
        max: usize,
    },
}

impl ImageSize {
    pub fn accepts(self, size: usize) -> bool {
        match self {
            Self::Exact(expected) => size == expected,
            Self::Multiple {
                bank_size,
                min,
                max,
            } => size % bank_size == 0 && (min..=max).contains(&size),
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(size) => write!(f, "exactly {size} bytes"),
            Self::Multiple {
                bank_size,
                min,
                max,
            } => write!(f, "a multiple of {bank_size} bytes between {min} and {max}"),
        }
    }
}

const UA_HOTSPOTS: &[(u16, u16)] = &[(0x0220, 0), (0x0240, 1)];
const UA_SWAPPED_HOTSPOTS: &[(u16, u16)] = &[(0x0220, 1), (0x0240, 0)];
const ECONOBANKING_HOTSPOTS: &[(u16, u16)] = &[(0x0800, 0), (0x0840, 1)];

const KB: usize = 1024;

impl SchemeKind {
    pub fn rule(self) -> TriggerRule {
        match self {
            Self::F8 => TriggerRule::WindowRange {
                first: 0x0FF8,
                last: 0x0FF9,
            },
            Self::F6 => TriggerRule::WindowRange {
                first: 0x0FF6,
                last: 0x0FF9,
            },
            Self::F4 => TriggerRule::WindowRange {
                first: 0x0FF4,
                last: 0x0FFB,
            },
            Self::FA => TriggerRule::WindowRange {
                first: 0x0FF8,
                last: 0x0FFA,
            },
            Self::EF => TriggerRule::WindowRange {
                first: 0x0FE0,
                last: 0x0FEF,
            },
            Self::DF => TriggerRule::WindowRange {
                first: 0x0FC0,
                last: 0x0FDF,
            },
            Self::BF => TriggerRule::WindowRange {
                first: 0x0F80,
                last: 0x0FBF,
            },
            Self::UA => TriggerRule::BusHotspots {
                mask: 0x1260,
                hotspots: UA_HOTSPOTS,
            },
            Self::UaSwapped => TriggerRule::BusHotspots {
                mask: 0x1260,
                hotspots: UA_SWAPPED_HOTSPOTS,
            },
            Self::Econobanking => TriggerRule::BusHotspots {
                mask: 0x1840,
                hotspots: ECONOBANKING_HOTSPOTS,
            },
            // Writes to TIA addresses $00-$3F are snooped by the cartridge
            Self::Tigervision => TriggerRule::BusWrite { last: 0x003F },
        }
    }

    pub fn layout(self) -> BankLayout {
        match self {
            Self::Tigervision => BankLayout::FixedUpperHalf,
            _ => BankLayout::Full,
        }
    }

    pub fn bank_size(self) -> usize {
        self.layout().bank_size()
    }

    /// Mask applied to an absolute address before the trigger rule sees it.
    pub fn address_mask(self) -> u16 {
        if self.rule().in_window() {
            address::WINDOW_MASK
        } else {
            address::BUS_MASK
        }
    }

    pub fn image_size(self) -> ImageSize {
        match self {
            Self::F8 | Self::UA | Self::UaSwapped | Self::Econobanking => ImageSize::Exact(8 * KB),
            Self::FA => ImageSize::Exact(12 * KB),
            Self::F6 => ImageSize::Exact(16 * KB),
            Self::F4 => ImageSize::Exact(32 * KB),
            Self::EF => ImageSize::Exact(64 * KB),
            Self::DF => ImageSize::Exact(128 * KB),
            Self::BF => ImageSize::Exact(256 * KB),
            // The bank register is a full byte, so at most 256 banks are addressable
            Self::Tigervision => ImageSize::Multiple {
                bank_size: 2 * KB,
                min: 4 * KB,
                max: 512 * KB,
            },
        }
    }

    pub fn validate_image_size(self, size: usize) -> Result<(), ConfigurationError> {
        if size == 0 {
            return Err(ConfigurationError::EmptyImage);
        }

        let bank_size = self.bank_size();
        if size % bank_size != 0 {
            return Err(ConfigurationError::SizeNotMultiple { size, bank_size });
        }

        let expected = self.image_size();
        if !expected.accepts(size) {
            return Err(ConfigurationError::SizeMismatch {
                scheme: self,
                size,
                expected,
            });
        }

        Ok(())
    }

    /// The bank selected at power-on and reset.
    ///
    /// Schemes whose hotspots live in the window start in the last bank, which holds the reset
    /// vector on these carts.
    pub fn default_start_bank(self, bank_count: u16) -> u16 {
        if self.rule().in_window() {
            bank_count.saturating_sub(1)
        } else {
            0
        }
    }

    pub fn out_of_range_policy(self) -> OutOfRangePolicy {
        match self.rule() {
            TriggerRule::BusWrite { .. } => OutOfRangePolicy::Wrap,
            TriggerRule::WindowRange { .. } | TriggerRule::BusHotspots { .. } => {
                OutOfRangePolicy::Clamp
            }
        }
    }
}
