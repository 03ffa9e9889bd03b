use super::{Field, Register};
use crate::error::{RegError, Result};
use std::collections::HashSet;

/// Registers of one peripheral instance for one silicon revision.
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterMap {
    pub peripheral: &'static str,
    pub revision: &'static str,
    pub base_address: u32,
    pub registers: &'static [Register],
}

impl RegisterMap {
    pub fn lookup(&self, name: &str) -> Result<&Register> {
        self.registers
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RegError::not_found("Register", format!("{}.{}", self.peripheral, name)))
    }

    pub fn find_by_address(&self, address: u32) -> Option<&Register> {
        self.registers.iter().find(|r| r.address() == address)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Register> {
        self.registers.iter()
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut offsets = HashSet::new();
        for r in self.registers {
            r.validate()?;
            if r.peripheral != self.peripheral || r.base_address != self.base_address {
                return Err(RegError::Layout {
                    name: r.full_name(),
                    reason: format!("not located in {}", self.peripheral),
                });
            }
            if !names.insert(r.name) || !offsets.insert(r.offset) {
                return Err(RegError::Layout {
                    name: r.full_name(),
                    reason: format!("name or offset {:#x} defined twice", r.offset),
                });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RegisterMap {
    type Item = &'a Register;
    type IntoIter = std::slice::Iter<'a, Register>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Register maps of one part family at one silicon revision.
#[derive(Debug, PartialEq, Eq)]
pub struct Device {
    pub family: &'static str,
    pub revision: &'static str,
    pub peripherals: &'static [RegisterMap],
}

impl Device {
    pub fn peripheral(&self, name: &str) -> Result<&RegisterMap> {
        self.peripherals
            .iter()
            .find(|p| p.peripheral == name)
            .ok_or_else(|| RegError::not_found("Peripheral", name))
    }

    /// Looks up `"PERIPHERAL.REGISTER"`.
    pub fn lookup(&self, path: &str) -> Result<&Register> {
        match path.split_once('.') {
            Some((p, r)) => self.peripheral(p)?.lookup(r),
            None => Err(RegError::not_found("Register", path)),
        }
    }

    /// Looks up `"PERIPHERAL.REGISTER.FIELD"` together with its register.
    pub fn field(&self, path: &str) -> Result<(&Register, &Field)> {
        match path.rsplit_once('.') {
            Some((reg, field)) => {
                let reg = self.lookup(reg)?;
                Ok((reg, reg.field(field)?))
            }
            None => Err(RegError::not_found("Field", path)),
        }
    }

    pub fn registers(&self) -> impl Iterator<Item = &Register> {
        self.peripherals.iter().flat_map(|p| p.iter())
    }

    pub fn find_by_address(&self, address: u32) -> Option<&Register> {
        self.peripherals
            .iter()
            .find_map(|p| p.find_by_address(address))
    }

    pub fn validate(&self) -> Result<()> {
        self.peripherals.iter().try_for_each(|p| p.validate())
    }
}
