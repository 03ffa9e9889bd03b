use super::{width_mask, Access, Field, RegBus};
use crate::error::{RegError, Result};

/// Offsets of the atomic SET/CLR/TGL windows, relative to the register address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasOffsets {
    pub set: u32,
    pub clr: u32,
    pub tgl: u32,
}

impl AliasOffsets {
    pub const SET_CLR_TGL: AliasOffsets = AliasOffsets {
        set: 0x1000,
        clr: 0x2000,
        tgl: 0x3000,
    };
}

/// A memory mapped register and its fields.
#[derive(Debug, PartialEq, Eq)]
pub struct Register {
    pub name: &'static str,
    pub peripheral: &'static str,
    pub base_address: u32,
    pub offset: u32,
    pub width: u32,
    pub access: Access,
    pub reset_value: u32,
    pub write_mask: u32,
    pub aliases: Option<AliasOffsets>,
    pub description: &'static str,
    pub fields: &'static [Field],
}

impl Register {
    /// Wraps around for layouts `validate` rejects.
    pub const fn address(&self) -> u32 {
        self.base_address.wrapping_add(self.offset)
    }

    /// Address of the alias window at `offset`, `None` past the 32-bit space.
    pub fn alias_address(&self, offset: u32) -> Option<u32> {
        self.base_address.checked_add(self.offset)?.checked_add(offset)
    }

    /// `PERIPHERAL.NAME`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.peripheral, self.name)
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| RegError::not_found("Field", format!("{}.{}", self.full_name(), name)))
    }

    /// Union of all field masks.
    pub fn fields_mask(&self) -> u32 {
        self.fields.iter().fold(0, |acc, f| acc | f.mask())
    }

    fn unsupported(&self, op: &'static str) -> RegError {
        RegError::UnsupportedOperation {
            name: self.full_name(),
            op,
            access: self.access,
        }
    }

    fn bus_read<B: RegBus + ?Sized>(&self, bus: &B, addr: u32) -> Result<u32> {
        let data = bus.read(addr).ok_or(RegError::Bus { address: addr })?;
        tracing::trace!(target: "reg", "read {} @ {:#010x} = {:#x}", self.full_name(), addr, data);
        Ok(data)
    }

    fn bus_write<B: RegBus + ?Sized>(&self, bus: &B, addr: u32, data: u32) -> Result<()> {
        tracing::trace!(target: "reg", "write {} @ {:#010x} = {:#x}", self.full_name(), addr, data);
        bus.write(addr, data).ok_or(RegError::Bus { address: addr })
    }

    pub fn read<B: RegBus + ?Sized>(&self, bus: &B) -> Result<u32> {
        if !self.access.readable() {
            return Err(self.unsupported("read"));
        }
        self.bus_read(bus, self.address())
    }

    /// Writes `raw & write_mask`.
    pub fn write<B: RegBus + ?Sized>(&self, bus: &B, raw: u32) -> Result<()> {
        if !self.access.writable() {
            return Err(self.unsupported("write"));
        }
        self.bus_write(bus, self.address(), raw & self.write_mask)
    }

    pub fn reset<B: RegBus + ?Sized>(&self, bus: &B) -> Result<()> {
        self.write(bus, self.reset_value)
    }

    pub fn get_field<B: RegBus + ?Sized>(&self, name: &str, bus: &B) -> Result<u32> {
        let field = self.field(name)?;
        if !field.access.readable() {
            return Err(RegError::UnsupportedOperation {
                name: format!("{}.{}", self.full_name(), field.name),
                op: "read",
                access: field.access,
            });
        }
        Ok(field.extract(self.read(bus)?))
    }

    /// Read-modify-write of one field. Write-only registers start from the
    /// reset value since they cannot be read back.
    pub fn set_field<B: RegBus + ?Sized>(&self, name: &str, value: u32, bus: &B) -> Result<()> {
        let field = self.field(name)?;
        if !self.access.writable() {
            return Err(self.unsupported("write"));
        }
        let raw = if self.access.readable() {
            self.read(bus)?
        } else {
            self.reset_value
        };
        self.write(bus, field.insert(raw, value)?)
    }

    fn alias_write<B: RegBus + ?Sized>(
        &self,
        bus: &B,
        offset: Option<u32>,
        mask: u32,
        op: &'static str,
        rmw: impl Fn(u32) -> u32,
    ) -> Result<()> {
        if !self.access.writable() {
            return Err(self.unsupported(op));
        }
        let mask = mask & self.write_mask;
        match offset {
            Some(o) => {
                let address = self.alias_address(o).ok_or_else(|| RegError::Layout {
                    name: self.full_name(),
                    reason: format!("alias {:#x} overflows 32 bits", o),
                })?;
                self.bus_write(bus, address, mask)
            }
            None => {
                let raw = if self.access.readable() {
                    self.read(bus)?
                } else {
                    self.reset_value
                };
                self.write(bus, rmw(raw))
            }
        }
    }

    /// Sets `mask` bits, through the SET alias when the register has one.
    pub fn set_bits<B: RegBus + ?Sized>(&self, mask: u32, bus: &B) -> Result<()> {
        self.alias_write(bus, self.aliases.map(|a| a.set), mask, "set bits of", |raw| raw | mask)
    }

    pub fn clear_bits<B: RegBus + ?Sized>(&self, mask: u32, bus: &B) -> Result<()> {
        self.alias_write(bus, self.aliases.map(|a| a.clr), mask, "clear bits of", |raw| {
            raw & !mask
        })
    }

    pub fn toggle_bits<B: RegBus + ?Sized>(&self, mask: u32, bus: &B) -> Result<()> {
        self.alias_write(bus, self.aliases.map(|a| a.tgl), mask, "toggle bits of", |raw| {
            raw ^ mask
        })
    }

    pub fn validate(&self) -> Result<()> {
        let layout = |reason: String| RegError::Layout {
            name: self.full_name(),
            reason,
        };
        if self.width == 0 || self.width > 32 {
            return Err(layout(format!("width {} not in 1..=32", self.width)));
        }
        if self.offset % 4 != 0 {
            return Err(layout(format!("offset {:#x} not word aligned", self.offset)));
        }
        if self.base_address.checked_add(self.offset).is_none() {
            return Err(layout("address overflows 32 bits".to_string()));
        }
        if let Some(a) = self.aliases {
            if [a.set, a.clr, a.tgl].iter().any(|o| self.alias_address(*o).is_none()) {
                return Err(layout("alias window overflows 32 bits".to_string()));
            }
        }
        let limit = width_mask(self.width);
        if self.reset_value & !limit != 0 || self.write_mask & !limit != 0 {
            return Err(layout(format!(
                "reset {:#x} or mask {:#x} exceeds {} bits",
                self.reset_value, self.write_mask, self.width
            )));
        }
        let mut used = 0u32;
        for (i, f) in self.fields.iter().enumerate() {
            if !f.fits(self.width) {
                return Err(layout(format!(
                    "field {} [{}+:{}] out of register",
                    f.name, f.bit_offset, f.bit_width
                )));
            }
            if used & f.mask() != 0 {
                return Err(layout(format!("field {} overlaps", f.name)));
            }
            if self.fields[..i].iter().any(|o| o.name == f.name) {
                return Err(layout(format!("field {} defined twice", f.name)));
            }
            used |= f.mask();
        }
        Ok(())
    }
}
