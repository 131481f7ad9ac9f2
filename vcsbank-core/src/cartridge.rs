
use crate::bank::{BankOutOfRange, BankStore};
use crate::config::{CartridgeConfig, ConfigurationError};
use crate::decoder::{Access, SwitchDecoder};
use crate::scheme::SchemeKind;
use crate::serialize::{BankSnapshot, SaveStateError};

/// A bank-switched cartridge: the ROM image, the active bank, and the scheme logic that moves it.
///
/// The bus calls [`Cartridge::on_access`] (or [`Cartridge::read`]/[`Cartridge::write`]) for
/// every memory cycle; everything else is for the loader, the debugger and save states.
#[derive(Debug, Clone)]
pub struct Cartridge {
    config: CartridgeConfig,
    start_bank: u16,
    store: BankStore,
    decoder: SwitchDecoder,
}

impl Cartridge {
    pub fn new(rom: Vec<u8>, config: CartridgeConfig) -> Result<Self, ConfigurationError> {
        let scheme = config.scheme;
        scheme.validate_image_size(rom.len())?;

        let rom_len = rom.len();
        // Validated sizes top out at 256 banks
        let bank_count = (rom_len / scheme.bank_size()) as u16;
        let start_bank = config
            .start_bank
            .unwrap_or_else(|| scheme.default_start_bank(bank_count));

        let store = BankStore::new(rom, scheme.layout(), start_bank)?;

        log::debug!(
            "loaded {scheme} cartridge: {rom_len} bytes, {bank_count} banks of {} bytes, start bank {start_bank}",
            scheme.bank_size()
        );

        Ok(Self {
            config,
            start_bank,
            store,
            decoder: SwitchDecoder::new(scheme),
        })
    }

    pub fn scheme(&self) -> SchemeKind {
        self.config.scheme
    }

    pub fn config(&self) -> &CartridgeConfig {
        &self.config
    }

    /// Run one bus access through the switch decoder. Returns `true` if the access hit a hotspot.
    pub fn on_access(&mut self, address: u16, access: Access) -> bool {
        self.decoder.on_access(&mut self.store, address, access)
    }

    /// A CPU read from the cartridge window. Hotspots are processed first, so a read that
    /// switches banks returns a byte from the new bank.
    pub fn read(&mut self, address: u16) -> u8 {
        self.on_access(address, Access::Read);
        self.store.read(address)
    }

    /// A CPU write. ROM is not writable; only hotspots react.
    pub fn write(&mut self, address: u16, value: u8) -> bool {
        self.on_access(address, Access::Write(value))
    }

    /// Read without triggering any hotspots.
    pub fn peek(&self, address: u16) -> u8 {
        self.store.read(address)
    }

    /// Return to the power-on bank.
    pub fn reset(&mut self) {
        if let Err(err) = self.store.set_active_bank(self.start_bank) {
            log::error!("{}: unable to restore start bank: {err}", self.scheme());
        }
        self.decoder.take_bank_changed();
    }

    pub fn active_bank(&self) -> u16 {
        self.store.active_bank()
    }

    pub fn set_active_bank(&mut self, index: u16) -> Result<(), BankOutOfRange> {
        self.store.set_active_bank(index)
    }

    pub fn bank_count(&self) -> u16 {
        self.store.bank_count()
    }

    pub fn start_bank(&self) -> u16 {
        self.start_bank
    }

    pub fn bank_at(&self, address: u16) -> u16 {
        self.store.bank_at(address)
    }

    pub fn bank_store(&self) -> &BankStore {
        &self.store
    }

    pub fn lock_hotspots(&mut self) {
        self.decoder.lock_hotspots();
    }

    pub fn unlock_hotspots(&mut self) {
        self.decoder.unlock_hotspots();
    }

    pub fn hotspots_locked(&self) -> bool {
        self.decoder.hotspots_locked()
    }

    pub fn take_bank_changed(&mut self) -> bool {
        self.decoder.take_bank_changed()
    }

    pub fn snapshot(&self) -> BankSnapshot {
        BankSnapshot {
            scheme: self.scheme(),
            active_bank: self.store.active_bank(),
        }
    }

    pub fn restore(&mut self, snapshot: &BankSnapshot) -> Result<(), SaveStateError> {
        if snapshot.scheme != self.scheme() {
            return Err(SaveStateError::SchemeMismatch {
                expected: self.scheme(),
                actual: snapshot.scheme,
            });
        }

        self.store.set_active_bank(snapshot.active_bank)?;
        Ok(())
    }
}
