use crate::address;
use crate::bank::BankStore;
use crate::scheme::{OutOfRangePolicy, SchemeKind, TriggerRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    NoMatch,
    /// The access hit a hotspot. `requested` is the bank the rule computed, before the scheme's
    /// out-of-range policy is applied.
    Switch { requested: u16 },
}

/// Watches every bus access and switches banks when one hits the scheme's hotspots.
#[derive(Debug, Clone)]
pub struct SwitchDecoder {
    scheme: SchemeKind,
    rule: TriggerRule,
    address_mask: u16,
    policy: OutOfRangePolicy,
    hotspots_locked: bool,
    bank_changed: bool,
}

impl SwitchDecoder {
    pub fn new(scheme: SchemeKind) -> Self {
        Self {
            scheme,
            rule: scheme.rule(),
            address_mask: scheme.address_mask(),
            policy: scheme.out_of_range_policy(),
            hotspots_locked: false,
            bank_changed: false,
        }
    }

    pub fn scheme(&self) -> SchemeKind {
        self.scheme
    }

    /// Decide whether an access is a bank switch trigger. Does not touch any state.
    pub fn decode(&self, address: u16, access: Access) -> Decision {
        let local = address & self.address_mask;

        match self.rule {
            TriggerRule::WindowRange { first, last } => {
                if !address::is_cartridge_address(address) {
                    return Decision::NoMatch;
                }

                if (first..=last).contains(&local) {
                    Decision::Switch {
                        requested: local - first,
                    }
                } else {
                    Decision::NoMatch
                }
            }
            TriggerRule::BusHotspots { mask, hotspots } => hotspots
                .iter()
                .find(|&&(hotspot, _)| local & mask == hotspot)
                .map_or(Decision::NoMatch, |&(_, bank)| Decision::Switch {
                    requested: bank,
                }),
            TriggerRule::BusWrite { last } => match access {
                Access::Write(value) if local <= last => Decision::Switch {
                    requested: value.into(),
                },
                _ => Decision::NoMatch,
            },
        }
    }

    /// Process one bus access. Returns whether the access hit a hotspot; if it did and hotspots
    /// are not locked, the selected bank has been committed to `store`.
    pub fn on_access(&mut self, store: &mut BankStore, address: u16, access: Access) -> bool {
        let Decision::Switch { requested } = self.decode(address, access) else {
            return false;
        };

        if self.hotspots_locked {
            log::trace!(
                "{}: ignoring hotspot {address:04X} while locked, bank stays {}",
                self.scheme,
                store.active_bank()
            );
            return true;
        }

        let bank_count = store.bank_count();
        let bank = self.policy.resolve(requested, bank_count);
        if bank != requested {
            match self.policy {
                OutOfRangePolicy::Clamp => log::warn!(
                    "{}: access to {address:04X} requested bank {requested} but only {bank_count} banks exist; clamping to {bank}",
                    self.scheme
                ),
                OutOfRangePolicy::Wrap => log::trace!(
                    "{}: bank {requested} wraps to {bank} ({bank_count} banks)",
                    self.scheme
                ),
            }
        }

        let previous = store.active_bank();
        match store.set_active_bank(bank) {
            Ok(()) => {
                log::trace!("{}: access to {address:04X} switched bank {previous} -> {bank}", self.scheme);
                if previous != bank {
                    self.bank_changed = true;
                }
            }
            Err(err) => log::error!("{}: dropping bank switch: {err}", self.scheme),
        }

        true
    }

    pub fn lock_hotspots(&mut self) {
        self.hotspots_locked = true;
    }

    pub fn unlock_hotspots(&mut self) {
        self.hotspots_locked = false;
    }

    pub fn hotspots_locked(&self) -> bool {
        self.hotspots_locked
    }

    /// Returns whether any access changed the active bank since the last call.
    pub fn take_bank_changed(&mut self) -> bool {
        std::mem::take(&mut self.bank_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::BankLayout;

    fn ef_store() -> BankStore {
        BankStore::new(vec![0; 16 * 0x1000], BankLayout::Full, 15).unwrap()
    }

    #[test]
    fn decode_window_range_edges() {
        let decoder = SwitchDecoder::new(SchemeKind::EF);

        assert_eq!(Decision::NoMatch, decoder.decode(0x1FDF, Access::Read));
        assert_eq!(
            Decision::Switch { requested: 0 },
            decoder.decode(0x1FE0, Access::Read)
        );
        assert_eq!(
            Decision::Switch { requested: 15 },
            decoder.decode(0x1FEF, Access::Read)
        );
        assert_eq!(Decision::NoMatch, decoder.decode(0x1FF0, Access::Read));

        // Writes hit the same hotspots, data is ignored
        assert_eq!(
            Decision::Switch { requested: 7 },
            decoder.decode(0x1FE7, Access::Write(0xAB))
        );
    }

    #[test]
    fn decode_window_mirrors() {
        let decoder = SwitchDecoder::new(SchemeKind::F8);

        assert_eq!(
            Decision::Switch { requested: 1 },
            decoder.decode(0xFFF9, Access::Read)
        );
        assert_eq!(
            Decision::Switch { requested: 0 },
            decoder.decode(0x3FF8, Access::Read)
        );

        // A12 clear is not a cartridge access
        assert_eq!(Decision::NoMatch, decoder.decode(0x0FF8, Access::Read));
        assert_eq!(Decision::NoMatch, decoder.decode(0x0FF9, Access::Write(0)));
    }

    #[test]
    fn decode_bus_hotspots() {
        let decoder = SwitchDecoder::new(SchemeKind::UA);

        assert_eq!(
            Decision::Switch { requested: 0 },
            decoder.decode(0x0220, Access::Read)
        );
        assert_eq!(
            Decision::Switch { requested: 1 },
            decoder.decode(0x0240, Access::Write(0x00))
        );
        // Mirror: bits outside the decode mask are ignored
        assert_eq!(
            Decision::Switch { requested: 1 },
            decoder.decode(0x02C5, Access::Read)
        );
        assert_eq!(Decision::NoMatch, decoder.decode(0x0260, Access::Read));
        assert_eq!(Decision::NoMatch, decoder.decode(0x1220, Access::Read));

        let swapped = SwitchDecoder::new(SchemeKind::UaSwapped);
        assert_eq!(
            Decision::Switch { requested: 1 },
            swapped.decode(0x0220, Access::Read)
        );
        assert_eq!(
            Decision::Switch { requested: 0 },
            swapped.decode(0x0240, Access::Read)
        );
    }

    #[test]
    fn decode_econobanking() {
        let decoder = SwitchDecoder::new(SchemeKind::Econobanking);

        assert_eq!(
            Decision::Switch { requested: 0 },
            decoder.decode(0x0800, Access::Read)
        );
        assert_eq!(
            Decision::Switch { requested: 1 },
            decoder.decode(0x0840, Access::Read)
        );
        assert_eq!(
            Decision::Switch { requested: 1 },
            decoder.decode(0x0FFF, Access::Read)
        );
        assert_eq!(Decision::NoMatch, decoder.decode(0x1800, Access::Read));
        assert_eq!(Decision::NoMatch, decoder.decode(0x0040, Access::Read));
    }

    #[test]
    fn decode_bus_write() {
        let decoder = SwitchDecoder::new(SchemeKind::Tigervision);

        assert_eq!(
            Decision::Switch { requested: 0x02 },
            decoder.decode(0x0000, Access::Write(0x02))
        );
        assert_eq!(
            Decision::Switch { requested: 0xFF },
            decoder.decode(0x003F, Access::Write(0xFF))
        );
        assert_eq!(Decision::NoMatch, decoder.decode(0x0040, Access::Write(0x02)));
        assert_eq!(Decision::NoMatch, decoder.decode(0x003F, Access::Read));
        assert_eq!(Decision::NoMatch, decoder.decode(0x1000, Access::Write(0x02)));
    }

    #[test]
    fn on_access_commits() {
        let mut store = ef_store();
        let mut decoder = SwitchDecoder::new(SchemeKind::EF);

        assert!(decoder.on_access(&mut store, 0x1FE3, Access::Read));
        assert_eq!(3, store.active_bank());
        assert!(decoder.take_bank_changed());
        assert!(!decoder.take_bank_changed());

        assert!(!decoder.on_access(&mut store, 0x1500, Access::Read));
        assert_eq!(3, store.active_bank());

        // Re-selecting the active bank is handled but does not count as a change
        assert!(decoder.on_access(&mut store, 0x1FE3, Access::Read));
        assert!(!decoder.take_bank_changed());
    }

    #[test]
    fn locked_hotspots_do_not_switch() {
        let mut store = ef_store();
        let mut decoder = SwitchDecoder::new(SchemeKind::EF);

        decoder.lock_hotspots();
        assert!(decoder.hotspots_locked());
        assert!(decoder.on_access(&mut store, 0x1FE3, Access::Read));
        assert_eq!(15, store.active_bank());
        assert!(!decoder.take_bank_changed());

        decoder.unlock_hotspots();
        assert!(decoder.on_access(&mut store, 0x1FE3, Access::Read));
        assert_eq!(3, store.active_bank());
    }

    #[test]
    fn bus_write_wraps() {
        // 3 banks of 2KB; the upper half is fixed to bank 2
        let mut store = BankStore::new(vec![0; 6 * 1024], BankLayout::FixedUpperHalf, 0).unwrap();
        let mut decoder = SwitchDecoder::new(SchemeKind::Tigervision);

        assert!(decoder.on_access(&mut store, 0x003F, Access::Write(1)));
        assert_eq!(1, store.active_bank());

        assert!(decoder.on_access(&mut store, 0x0010, Access::Write(5)));
        assert_eq!(2, store.active_bank());

        assert!(decoder.on_access(&mut store, 0x0010, Access::Write(0xFF)));
        assert_eq!(0xFF % 3, store.active_bank());
    }
}
