use crate::address;
use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bank {index} requested but the cartridge only has {bank_count} banks")]
pub struct BankOutOfRange {
    pub index: u16,
    pub bank_count: u16,
}

/// How the active bank is mapped into the 4KB cartridge window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankLayout {
    /// The active bank fills the whole window.
    Full,
    /// The active 2KB bank fills the lower half of the window; the upper half is hard-wired to
    /// the last bank in the image.
    FixedUpperHalf,
}

impl BankLayout {
    pub fn bank_size(self) -> usize {
        match self {
            Self::Full => address::WINDOW_SIZE,
            Self::FixedUpperHalf => address::WINDOW_SIZE / 2,
        }
    }

    fn minimum_bank_count(self) -> u16 {
        match self {
            Self::Full => 1,
            Self::FixedUpperHalf => 2,
        }
    }
}

/// Owns the cartridge ROM and the currently active bank index.
///
/// The image is never copied or split; banks are ranges into the one buffer. The active bank is
/// always a valid index into the image.
#[derive(Debug, Clone)]
pub struct BankStore {
    rom: Box<[u8]>,
    layout: BankLayout,
    bank_count: u16,
    active_bank: u16,
}

impl BankStore {
    pub fn new(rom: Vec<u8>, layout: BankLayout, start_bank: u16) -> Result<Self, ConfigurationError> {
        let bank_size = layout.bank_size();

        if rom.is_empty() {
            return Err(ConfigurationError::EmptyImage);
        }

        if rom.len() % bank_size != 0 {
            return Err(ConfigurationError::SizeNotMultiple {
                size: rom.len(),
                bank_size,
            });
        }

        let bank_count = rom.len() / bank_size;
        let Ok(bank_count) = u16::try_from(bank_count) else {
            return Err(ConfigurationError::TooManyBanks { bank_count });
        };

        let minimum = layout.minimum_bank_count();
        if bank_count < minimum {
            return Err(ConfigurationError::TooFewBanks { bank_count, minimum });
        }

        if start_bank >= bank_count {
            return Err(ConfigurationError::StartBankOutOfRange {
                start_bank,
                bank_count,
            });
        }

        Ok(Self {
            rom: rom.into_boxed_slice(),
            layout,
            bank_count,
            active_bank: start_bank,
        })
    }

    /// Read the byte visible at the given window address. Bits above the window are ignored.
    pub fn read(&self, address: u16) -> u8 {
        let (bank, offset) = self.locate(address);
        self.rom[usize::from(bank) * self.layout.bank_size() + offset]
    }

    /// Return the bank that currently backs the given window address.
    pub fn bank_at(&self, address: u16) -> u16 {
        self.locate(address).0
    }

    fn locate(&self, address: u16) -> (u16, usize) {
        let local = usize::from(address & address::WINDOW_MASK);

        match self.layout {
            BankLayout::Full => (self.active_bank, local),
            BankLayout::FixedUpperHalf => {
                let half = self.layout.bank_size();
                if local < half {
                    (self.active_bank, local)
                } else {
                    (self.bank_count - 1, local - half)
                }
            }
        }
    }

    /// Make the given bank visible. Out-of-range indices are rejected and leave the active bank
    /// untouched.
    pub fn set_active_bank(&mut self, index: u16) -> Result<(), BankOutOfRange> {
        if index >= self.bank_count {
            return Err(BankOutOfRange {
                index,
                bank_count: self.bank_count,
            });
        }

        self.active_bank = index;
        Ok(())
    }

    pub fn active_bank(&self) -> u16 {
        self.active_bank
    }

    pub fn bank_count(&self) -> u16 {
        self.bank_count
    }

    pub fn bank_size(&self) -> usize {
        self.layout.bank_size()
    }

    pub fn layout(&self) -> BankLayout {
        self.layout
    }

    /// Get a view of one bank's contents, if the index exists.
    pub fn bank(&self, index: u16) -> Option<&[u8]> {
        let bank_size = self.layout.bank_size();
        let start = usize::from(index) * bank_size;
        self.rom.get(start..start + bank_size)
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every byte in bank N holds N, except the first byte of each bank which holds 0xF0 | N
    fn tagged_rom(bank_count: usize, bank_size: usize) -> Vec<u8> {
        let mut rom = Vec::with_capacity(bank_count * bank_size);
        for bank in 0..bank_count {
            rom.push(0xF0 | bank as u8);
            rom.extend(std::iter::repeat(bank as u8).take(bank_size - 1));
        }
        rom
    }

    #[test]
    fn read_through_active_bank() {
        let mut store = BankStore::new(tagged_rom(4, 0x1000), BankLayout::Full, 3).unwrap();

        assert_eq!(4, store.bank_count());
        assert_eq!(3, store.active_bank());
        assert_eq!(0xF3, store.read(0x0000));
        assert_eq!(0x03, store.read(0x0FFF));

        store.set_active_bank(1).unwrap();

        assert_eq!(1, store.active_bank());
        assert_eq!(0xF1, store.read(0x0000));
        assert_eq!(0x01, store.read(0x0ABC));
    }

    #[test]
    fn read_masks_to_window() {
        let store = BankStore::new(tagged_rom(2, 0x1000), BankLayout::Full, 0).unwrap();

        assert_eq!(store.read(0x0000), store.read(0x1000));
        assert_eq!(store.read(0x0000), store.read(0xF000));
        assert_eq!(store.read(0x0123), store.read(0x3123));
    }

    #[test]
    fn set_active_bank_rejects_out_of_range() {
        let mut store = BankStore::new(tagged_rom(2, 0x1000), BankLayout::Full, 1).unwrap();

        assert_eq!(
            Err(BankOutOfRange {
                index: 2,
                bank_count: 2
            }),
            store.set_active_bank(2)
        );
        assert_eq!(1, store.active_bank());
        assert_eq!(0xF1, store.read(0x0000));
    }

    #[test]
    fn set_active_bank_round_trips() {
        let mut store = BankStore::new(tagged_rom(16, 0x1000), BankLayout::Full, 15).unwrap();

        for bank in 0..16 {
            store.set_active_bank(bank).unwrap();
            assert_eq!(bank, store.active_bank());
            assert_eq!(0xF0 | bank as u8, store.read(0x0000));
        }
    }

    #[test]
    fn fixed_upper_half() {
        let mut store =
            BankStore::new(tagged_rom(4, 0x0800), BankLayout::FixedUpperHalf, 0).unwrap();

        assert_eq!(0x0800, store.bank_size());
        assert_eq!(0xF0, store.read(0x0000));
        assert_eq!(0x00, store.read(0x07FF));
        assert_eq!(0xF3, store.read(0x0800));
        assert_eq!(0x03, store.read(0x0FFF));
        assert_eq!(0, store.bank_at(0x07FF));
        assert_eq!(3, store.bank_at(0x0800));

        store.set_active_bank(2).unwrap();

        assert_eq!(0xF2, store.read(0x1000));
        assert_eq!(0xF3, store.read(0x1800));
        assert_eq!(2, store.bank_at(0x1000));
        assert_eq!(3, store.bank_at(0x1FFF));
    }

    #[test]
    fn bank_views() {
        let store = BankStore::new(tagged_rom(3, 0x1000), BankLayout::Full, 0).unwrap();

        let bank = store.bank(2).unwrap();
        assert_eq!(0x1000, bank.len());
        assert_eq!(0xF2, bank[0]);
        assert_eq!(None, store.bank(3));
        assert_eq!(3 * 0x1000, store.rom().len());
    }

    #[test]
    fn load_errors() {
        assert_eq!(
            Some(ConfigurationError::EmptyImage),
            BankStore::new(Vec::new(), BankLayout::Full, 0).err()
        );
        assert_eq!(
            Some(ConfigurationError::SizeNotMultiple {
                size: 0x1800,
                bank_size: 0x1000
            }),
            BankStore::new(vec![0; 0x1800], BankLayout::Full, 0).err()
        );
        assert_eq!(
            Some(ConfigurationError::TooFewBanks {
                bank_count: 1,
                minimum: 2
            }),
            BankStore::new(vec![0; 0x0800], BankLayout::FixedUpperHalf, 0).err()
        );
        assert_eq!(
            Some(ConfigurationError::StartBankOutOfRange {
                start_bank: 2,
                bank_count: 2
            }),
            BankStore::new(vec![0; 0x2000], BankLayout::Full, 2).err()
        );
    }
}
