use super::{Access, RegBus, RegisterMap};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
enum Window {
    Direct,
    Set,
    Clr,
    Tgl,
}

#[derive(Debug, Clone, Copy)]
struct SimReg {
    address: u32,
    access: Access,
    window: Window,
}

/// A simulated 32-bit register bus.
///
/// `SimBus::new()` stores any address. A bus built with `for_map` only
/// answers the map's registers and their alias windows, starts from the
/// reset values and ignores writes to read-only registers.
#[derive(Debug, Default)]
pub struct SimBus {
    mem: Mutex<HashMap<u32, u32>>,
    layout: Option<HashMap<u32, SimReg>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_map(map: &RegisterMap) -> Self {
        let mut mem = HashMap::new();
        let mut layout = HashMap::new();
        for r in map {
            let address = r.address();
            mem.insert(address, r.reset_value);
            let mut windows = vec![(address, Window::Direct)];
            if let Some(a) = r.aliases {
                let alias = [(a.set, Window::Set), (a.clr, Window::Clr), (a.tgl, Window::Tgl)];
                windows.extend(
                    alias
                        .iter()
                        .filter_map(|(o, w)| r.alias_address(*o).map(|addr| (addr, *w))),
                );
            }
            for (addr, window) in windows {
                layout.insert(
                    addr,
                    SimReg {
                        address,
                        access: r.access,
                        window,
                    },
                );
            }
        }
        SimBus {
            mem: Mutex::new(mem),
            layout: Some(layout),
        }
    }

    /// Current word at `addr`, bypassing access checks.
    pub fn peek(&self, addr: u32) -> Option<u32> {
        self.mem.lock().ok()?.get(&addr).copied()
    }

    /// Forces the word at `addr`, e.g. to model hardware status bits.
    pub fn poke(&self, addr: u32, data: u32) {
        if let Ok(mut mem) = self.mem.lock() {
            mem.insert(addr, data);
        }
    }

    fn resolve(&self, addr: u32) -> Option<SimReg> {
        match &self.layout {
            Some(layout) => layout.get(&addr).copied(),
            None => Some(SimReg {
                address: addr,
                access: Access::ReadWrite,
                window: Window::Direct,
            }),
        }
    }
}

impl RegBus for SimBus {
    fn write(&self, addr: u32, data: u32) -> Option<()> {
        let reg = self.resolve(addr)?;
        let mut mem = self.mem.lock().ok()?;
        if !reg.access.writable() {
            tracing::debug!(target: "sim_bus", "ignore write to read-only {:#010x}", addr);
            return Some(());
        }
        let cur = mem.entry(reg.address).or_insert(0);
        *cur = match reg.window {
            Window::Direct => data,
            Window::Set => *cur | data,
            Window::Clr => *cur & !data,
            Window::Tgl => *cur ^ data,
        };
        Some(())
    }

    fn read(&self, addr: u32) -> Option<u32> {
        let reg = self.resolve(addr)?;
        let mem = self.mem.lock().ok()?;
        Some(mem.get(&reg.address).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg_if::{AliasOffsets, Field, Register};

    static MAP: RegisterMap = RegisterMap {
        peripheral: "RAC",
        revision: "test",
        base_address: 0xa802_0000,
        registers: &[
            Register {
                name: "STATUS",
                peripheral: "RAC",
                base_address: 0xa802_0000,
                offset: 0xc,
                width: 32,
                access: Access::ReadOnly,
                reset_value: 0x10,
                write_mask: 0,
                aliases: Some(AliasOffsets::SET_CLR_TGL),
                description: "",
                fields: &[],
            },
            Register {
                name: "IEN",
                peripheral: "RAC",
                base_address: 0xa802_0000,
                offset: 0x20,
                width: 32,
                access: Access::ReadWrite,
                reset_value: 0,
                write_mask: 0x00ff_0007,
                aliases: Some(AliasOffsets::SET_CLR_TGL),
                description: "",
                fields: &[Field {
                    name: "SEQ",
                    access: Access::ReadWrite,
                    bit_offset: 16,
                    bit_width: 8,
                    enums: &[],
                }],
            },
        ],
    };

    #[test]
    fn free_bus() {
        let bus = SimBus::new();
        assert_eq!(bus.read(0x1234), Some(0));
        assert_eq!(bus.write(0x1234, 7), Some(()));
        assert_eq!(bus.read(0x1234), Some(7));
    }

    #[test]
    fn map_bus() {
        let bus = SimBus::for_map(&MAP);
        assert_eq!(bus.read(0xa802_000c), Some(0x10));
        assert_eq!(bus.read(0xa802_0010), None);
        bus.write(0xa802_000c, 0).unwrap();
        assert_eq!(bus.peek(0xa802_000c), Some(0x10));
        bus.poke(0xa802_000c, 0x11);
        assert_eq!(bus.read(0xa802_000c), Some(0x11));
    }

    #[test]
    fn alias_windows() {
        let bus = SimBus::for_map(&MAP);
        let ien = MAP.lookup("IEN").unwrap();
        ien.set_bits(0x0003_0001, &bus).unwrap();
        assert_eq!(ien.read(&bus).unwrap(), 0x0003_0001);
        ien.clear_bits(0x0001_0000, &bus).unwrap();
        assert_eq!(ien.read(&bus).unwrap(), 0x0002_0001);
        ien.toggle_bits(0x3, &bus).unwrap();
        assert_eq!(ien.read(&bus).unwrap(), 0x0002_0002);
        ien.set_field("SEQ", 0x80, &bus).unwrap();
        assert_eq!(ien.get_field("SEQ", &bus).unwrap(), 0x80);
        assert_eq!(bus.peek(ien.address()), Some(0x0080_0002));
    }

    #[test]
    fn alias_past_address_space() {
        static TOP: RegisterMap = RegisterMap {
            peripheral: "TOP",
            revision: "test",
            base_address: 0xffff_e000,
            registers: &[Register {
                name: "CTRL",
                peripheral: "TOP",
                base_address: 0xffff_e000,
                offset: 0x0,
                width: 32,
                access: Access::ReadWrite,
                reset_value: 0,
                write_mask: 0xff,
                aliases: Some(AliasOffsets::SET_CLR_TGL),
                description: "",
                fields: &[],
            }],
        };
        let bus = SimBus::for_map(&TOP);
        assert_eq!(bus.read(0xffff_e000), Some(0));
        bus.write(0xffff_f000, 0x3).unwrap();
        assert_eq!(bus.peek(0xffff_e000), Some(0x3));
        assert_eq!(bus.read(0x0000_0000), None);
        assert_eq!(bus.read(0x0000_1000), None);
    }
}
