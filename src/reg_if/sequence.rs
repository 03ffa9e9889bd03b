//! Batches of register writes, packed the way radio configurations are
//! loaded: contiguous words become one burst, registers owned by the radio
//! firmware are dropped, and registers with firmware-owned fields are
//! updated with an AND/OR pair that leaves those fields alone.

use super::{Device, RegBus, Register};
use crate::error::{RegError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusAction {
    /// Consecutive words starting at `address`.
    Write {
        address: u32,
        values: Vec<u32>,
        names: Vec<String>,
    },
    And {
        address: u32,
        mask: u32,
        name: String,
    },
    Or {
        address: u32,
        value: u32,
        name: String,
    },
}

/// Registers and fields a write sequence must not touch.
#[derive(Debug, Default, Clone)]
pub struct Protection {
    registers: HashSet<u32>,
    fields: HashMap<u32, u32>,
}

impl Protection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every write to `"PERIPHERAL.REGISTER"`.
    pub fn protect_register(mut self, device: &Device, path: &str) -> Result<Self> {
        let reg = device.lookup(path)?;
        self.registers.insert(reg.address());
        Ok(self)
    }

    /// Keeps `fields` of `"PERIPHERAL.REGISTER"` at their current value.
    pub fn protect_fields(mut self, device: &Device, path: &str, fields: &[&str]) -> Result<Self> {
        let reg = device.lookup(path)?;
        let mut mask = 0;
        for f in fields {
            mask |= reg.field(f)?.mask();
        }
        *self.fields.entry(reg.address()).or_insert(0) |= mask;
        Ok(self)
    }

    pub fn is_protected(&self, address: u32) -> bool {
        self.registers.contains(&address)
    }

    pub fn field_mask(&self, address: u32) -> Option<u32> {
        self.fields.get(&address).copied()
    }
}

#[derive(Debug, Clone)]
struct Pending {
    name: String,
    value: u32,
}

#[derive(Debug, Default, Clone)]
pub struct WriteSequence {
    writes: BTreeMap<u32, Pending>,
}

impl WriteSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Queues a whole register value. Repeating an identical write is
    /// tolerated, a different value for the same register is a `Conflict`.
    pub fn write(&mut self, reg: &Register, value: u32) -> Result<()> {
        if !reg.access.writable() {
            return Err(RegError::UnsupportedOperation {
                name: reg.full_name(),
                op: "queue write to",
                access: reg.access,
            });
        }
        let value = value & reg.write_mask;
        if let Some(p) = self.writes.get(&reg.address()) {
            if p.value != value {
                return Err(RegError::Conflict {
                    name: p.name.clone(),
                    address: reg.address(),
                    first: p.value,
                    second: value,
                });
            }
            tracing::warn!(target: "sequence", "duplicate write of {} = {:#x}", p.name, value);
            return Ok(());
        }
        self.writes.insert(
            reg.address(),
            Pending {
                name: reg.full_name(),
                value,
            },
        );
        Ok(())
    }

    /// Queues one field, merged into the pending value of its register or
    /// into the reset value.
    pub fn write_field(&mut self, reg: &Register, field: &str, value: u32) -> Result<()> {
        let f = reg.field(field)?;
        let base = self
            .writes
            .get(&reg.address())
            .map_or(reg.reset_value, |p| p.value);
        let raw = f.insert(base, value)?;
        match self.writes.get_mut(&reg.address()) {
            Some(p) => {
                p.value = raw & reg.write_mask;
                Ok(())
            }
            None => self.write(reg, raw),
        }
    }

    pub fn actions(&self, protection: &Protection) -> Vec<BusAction> {
        let mut actions = vec![];
        let mut start = 0;
        let mut run: Vec<(u32, &str)> = vec![];
        for (&address, p) in self.writes.iter() {
            if protection.is_protected(address) {
                tracing::debug!(target: "sequence", "drop protected {}", p.name);
                continue;
            }
            if run.is_empty() || address - start != 4 * run.len() as u32 {
                encode_run(start, &run, protection, &mut actions);
                start = address;
                run.clear();
            }
            run.push((p.value, p.name.as_str()));
        }
        encode_run(start, &run, protection, &mut actions);
        actions
    }

    pub fn apply<B: RegBus + ?Sized>(&self, protection: &Protection, bus: &B) -> Result<()> {
        for action in self.actions(protection) {
            tracing::trace!(target: "sequence", "{:x?}", action);
            match action {
                BusAction::Write {
                    address, values, ..
                } => {
                    for (i, v) in values.into_iter().enumerate() {
                        let addr = address + 4 * i as u32;
                        bus.write(addr, v).ok_or(RegError::Bus { address: addr })?;
                    }
                }
                BusAction::And { address, mask, .. } => {
                    let cur = bus.read(address).ok_or(RegError::Bus { address })?;
                    bus.write(address, cur & mask)
                        .ok_or(RegError::Bus { address })?;
                }
                BusAction::Or { address, value, .. } => {
                    let cur = bus.read(address).ok_or(RegError::Bus { address })?;
                    bus.write(address, cur | value)
                        .ok_or(RegError::Bus { address })?;
                }
            }
        }
        Ok(())
    }
}

fn encode_run(start: u32, run: &[(u32, &str)], protection: &Protection, actions: &mut Vec<BusAction>) {
    let mut i = 0;
    while i < run.len() {
        let j = (i..run.len())
            .find(|&k| protection.field_mask(start + 4 * k as u32).is_some())
            .unwrap_or(run.len());
        if j > i {
            actions.push(BusAction::Write {
                address: start + 4 * i as u32,
                values: run[i..j].iter().map(|(v, _)| *v).collect(),
                names: run[i..j].iter().map(|(_, n)| n.to_string()).collect(),
            });
        }
        if let Some((value, name)) = run.get(j) {
            let address = start + 4 * j as u32;
            let mask = protection.field_mask(address).unwrap_or(0);
            if mask != u32::MAX {
                if value & !mask != !mask {
                    actions.push(BusAction::And {
                        address,
                        mask,
                        name: name.to_string(),
                    });
                }
                if value & !mask != 0 {
                    actions.push(BusAction::Or {
                        address,
                        value: value & !mask,
                        name: name.to_string(),
                    });
                }
            }
        }
        i = j + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg_if::{Access, Field, RegisterMap, SimBus};

    const fn reg(name: &'static str, offset: u32, fields: &'static [Field]) -> Register {
        Register {
            name,
            peripheral: "MODEM",
            base_address: 0x4008_6000,
            offset,
            width: 32,
            access: Access::ReadWrite,
            reset_value: 0,
            write_mask: 0xffff_ffff,
            aliases: None,
            description: "",
            fields,
        }
    }

    const C_FIELDS: &[Field] = &[
        Field {
            name: "RAMADDR",
            access: Access::ReadWrite,
            bit_offset: 0,
            bit_width: 4,
            enums: &[],
        },
        Field {
            name: "MODE",
            access: Access::ReadWrite,
            bit_offset: 4,
            bit_width: 4,
            enums: &[],
        },
    ];

    static DEVICE: Device = Device {
        family: "TOY",
        revision: "revA",
        peripherals: &[RegisterMap {
            peripheral: "MODEM",
            revision: "revA",
            base_address: 0x4008_6000,
            registers: &[
                reg("A", 0x0, &[]),
                reg("B", 0x4, &[]),
                reg("C", 0x8, C_FIELDS),
                reg("D", 0xc, &[]),
                reg("E", 0x14, &[]),
                reg("F", 0x18, &[]),
                Register {
                    access: Access::ReadOnly,
                    ..reg("G", 0x1c, &[])
                },
            ],
        }],
    };

    fn protection() -> Protection {
        Protection::new()
            .protect_register(&DEVICE, "MODEM.F")
            .unwrap()
            .protect_fields(&DEVICE, "MODEM.C", &["RAMADDR"])
            .unwrap()
    }

    fn sequence(values: &[(&str, u32)]) -> WriteSequence {
        let mut seq = WriteSequence::new();
        for (name, v) in values {
            seq.write(DEVICE.lookup(name).unwrap(), *v).unwrap();
        }
        seq
    }

    #[test]
    fn group_and_split() {
        let seq = sequence(&[
            ("MODEM.E", 5),
            ("MODEM.A", 1),
            ("MODEM.B", 2),
            ("MODEM.C", 0x35),
            ("MODEM.D", 4),
            ("MODEM.F", 6),
        ]);
        let actions = seq.actions(&protection());
        assert_eq!(
            actions,
            vec![
                BusAction::Write {
                    address: 0x4008_6000,
                    values: vec![1, 2],
                    names: vec!["MODEM.A".to_string(), "MODEM.B".to_string()],
                },
                BusAction::And {
                    address: 0x4008_6008,
                    mask: 0xf,
                    name: "MODEM.C".to_string(),
                },
                BusAction::Or {
                    address: 0x4008_6008,
                    value: 0x30,
                    name: "MODEM.C".to_string(),
                },
                BusAction::Write {
                    address: 0x4008_600c,
                    values: vec![4],
                    names: vec!["MODEM.D".to_string()],
                },
                BusAction::Write {
                    address: 0x4008_6014,
                    values: vec![5],
                    names: vec!["MODEM.E".to_string()],
                },
            ]
        );
    }

    #[test]
    fn all_unprotected_bits_set_skips_and() {
        let seq = sequence(&[("MODEM.C", 0xffff_fff0)]);
        assert_eq!(
            seq.actions(&protection()),
            vec![BusAction::Or {
                address: 0x4008_6008,
                value: 0xffff_fff0,
                name: "MODEM.C".to_string(),
            }]
        );
        let seq = sequence(&[("MODEM.C", 0x3)]);
        assert_eq!(
            seq.actions(&protection()),
            vec![BusAction::And {
                address: 0x4008_6008,
                mask: 0xf,
                name: "MODEM.C".to_string(),
            }]
        );
    }

    #[test_log::test]
    fn apply_keeps_protected() {
        let seq = sequence(&[
            ("MODEM.A", 1),
            ("MODEM.B", 2),
            ("MODEM.C", 0x35),
            ("MODEM.F", 6),
        ]);
        let bus = SimBus::new();
        bus.poke(0x4008_6008, 0xffff_ff0a);
        seq.apply(&protection(), &bus).unwrap();
        assert_eq!(bus.peek(0x4008_6000), Some(1));
        assert_eq!(bus.peek(0x4008_6004), Some(2));
        assert_eq!(bus.peek(0x4008_6008), Some(0x3a));
        assert_eq!(bus.peek(0x4008_6018), None);
    }

    #[test]
    fn duplicates_and_conflicts() {
        let a = DEVICE.lookup("MODEM.A").unwrap();
        let mut seq = WriteSequence::new();
        seq.write(a, 1).unwrap();
        seq.write(a, 1).unwrap();
        assert_eq!(seq.len(), 1);
        assert!(matches!(seq.write(a, 2), Err(RegError::Conflict { .. })));
        assert!(matches!(
            seq.write(DEVICE.lookup("MODEM.G").unwrap(), 1),
            Err(RegError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn field_writes_merge() {
        let c = DEVICE.lookup("MODEM.C").unwrap();
        let mut seq = WriteSequence::new();
        seq.write_field(c, "MODE", 0x3).unwrap();
        seq.write_field(c, "RAMADDR", 0x1).unwrap();
        assert_eq!(
            seq.actions(&Protection::new()),
            vec![BusAction::Write {
                address: 0x4008_6008,
                values: vec![0x31],
                names: vec!["MODEM.C".to_string()],
            }]
        );
        assert!(seq.write_field(c, "NOPE", 0).is_err());
        assert!(Protection::new()
            .protect_fields(&DEVICE, "MODEM.C", &["NOPE"])
            .is_err());
    }
}
