//
// CPU bus
//

// The 6507 only brings out 13 address lines
pub const BUS_MASK: u16 = 0x1FFF;

// A12 selects the cartridge
pub const CARTRIDGE_SELECT: u16 = 0x1000;

//
// Cartridge window
//

pub const WINDOW_SIZE: usize = 0x1000;
pub const WINDOW_MASK: u16 = 0x0FFF;

pub fn is_cartridge_address(address: u16) -> bool {
    address & CARTRIDGE_SELECT != 0
}
