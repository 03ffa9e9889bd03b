use super::{macro_name, GenError, ObjGenHeader, Result};
use std::collections::HashSet;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    RO,
    WO,
    RW,
}

impl RegisterAccess {
    fn render(&self) -> &'static str {
        match self {
            RegisterAccess::RO => "Access::ReadOnly",
            RegisterAccess::WO => "Access::WriteOnly",
            RegisterAccess::RW => "Access::ReadWrite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasDesc {
    pub set: u32,
    pub clr: u32,
    pub tgl: u32,
}

/// SET/CLR/TGL windows of series-2 peripherals.
pub const SET_CLR_TGL: AliasDesc = AliasDesc {
    set: 0x1000,
    clr: 0x2000,
    tgl: 0x3000,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDesc {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone)]
pub struct RegisterField {
    pub name: String,
    pub lsb: u32,
    pub msb: u32,
    pub access: RegisterAccess,
    pub enums: Vec<EnumDesc>,
}

impl RegisterField {
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }

    pub fn mask(&self) -> u64 {
        ((1u64 << self.width()) - 1) << self.lsb
    }
}

#[derive(Debug, Clone)]
pub struct RegisterDesc {
    pub name: String,
    pub offset: u32,
    pub width: u32,
    pub access: RegisterAccess,
    pub reset_value: u32,
    pub write_mask: u32,
    pub aliases: Option<AliasDesc>,
    pub description: String,
    pub fields: Vec<RegisterField>,
}

impl RegisterDesc {
    pub fn validate(&self, peripheral: &str) -> Result<()> {
        let full_name = format!("{}.{}", peripheral, self.name);
        let layout = |reason: String| GenError::Layout {
            name: full_name.clone(),
            reason,
        };
        if self.width == 0 || self.width > 32 {
            return Err(layout(format!("width {} not in 1..=32", self.width)));
        }
        if self.offset % 4 != 0 {
            return Err(layout(format!("offset {:#x} not word aligned", self.offset)));
        }
        let limit = if self.width == 32 {
            u32::MAX as u64
        } else {
            (1u64 << self.width) - 1
        };
        if self.reset_value as u64 > limit || self.write_mask as u64 > limit {
            return Err(layout(format!(
                "reset {:#x} or mask {:#x} exceeds {} bits",
                self.reset_value, self.write_mask, self.width
            )));
        }
        let mut used = 0u64;
        let mut names = HashSet::new();
        for f in &self.fields {
            if f.msb < f.lsb || f.msb >= self.width {
                return Err(layout(format!(
                    "field {} [{}:{}] out of register",
                    f.name, f.msb, f.lsb
                )));
            }
            if used & f.mask() != 0 {
                return Err(layout(format!("field {} overlaps", f.name)));
            }
            if !names.insert(f.name.as_str()) {
                return Err(layout(format!("field {} defined twice", f.name)));
            }
            used |= f.mask();
            for e in &f.enums {
                if (e.value as u64) >= (1u64 << f.width()) {
                    return Err(layout(format!(
                        "enum {}.{} = {:#x} does not fit",
                        f.name, e.name, e.value
                    )));
                }
            }
        }
        Ok(())
    }

    fn gen_rust<W: Write>(&self, peripheral: &str, base_address: u32, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "            Register {{")?;
        writeln!(out, "                name: {:?},", self.name)?;
        writeln!(out, "                peripheral: {:?},", peripheral)?;
        writeln!(out, "                base_address: {:#x},", base_address)?;
        writeln!(out, "                offset: {:#x},", self.offset)?;
        writeln!(out, "                width: {},", self.width)?;
        writeln!(out, "                access: {},", self.access.render())?;
        writeln!(out, "                reset_value: {:#x},", self.reset_value)?;
        writeln!(out, "                write_mask: {:#x},", self.write_mask)?;
        match &self.aliases {
            Some(a) => writeln!(
                out,
                "                aliases: Some(AliasOffsets {{ set: {:#x}, clr: {:#x}, tgl: {:#x} }}),",
                a.set, a.clr, a.tgl
            )?,
            None => writeln!(out, "                aliases: None,")?,
        }
        writeln!(out, "                description: {:?},", self.description)?;
        writeln!(out, "                fields: &[")?;
        for f in &self.fields {
            write!(
                out,
                "                    Field {{ name: {:?}, access: {}, bit_offset: {}, bit_width: {}, enums: &[",
                f.name,
                f.access.render(),
                f.lsb,
                f.width()
            )?;
            for e in &f.enums {
                write!(out, "EnumVariant {{ name: {:?}, value: {:#x} }}, ", e.name, e.value)?;
            }
            writeln!(out, "] }},")?;
        }
        writeln!(out, "                ],")?;
        writeln!(out, "            }},")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PeripheralDesc {
    pub name: String,
    pub base_address: u32,
    pub registers: Vec<RegisterDesc>,
}

impl PeripheralDesc {
    pub fn validate(&self) -> Result<()> {
        let mut offsets = HashSet::new();
        let mut names = HashSet::new();
        for r in &self.registers {
            r.validate(&self.name)?;
            if !offsets.insert(r.offset) || !names.insert(r.name.as_str()) {
                return Err(GenError::Layout {
                    name: format!("{}.{}", self.name, r.name),
                    reason: format!("register name or offset {:#x} defined twice", r.offset),
                });
            }
            if self.base_address.checked_add(r.offset).is_none() {
                return Err(GenError::Layout {
                    name: format!("{}.{}", self.name, r.name),
                    reason: "address overflows 32 bits".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// All peripherals of one part family at one silicon revision.
#[derive(Debug, Clone)]
pub struct DeviceDesc {
    pub family: String,
    pub revision: String,
    pub peripherals: Vec<PeripheralDesc>,
}

impl DeviceDesc {
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for p in &self.peripherals {
            if !names.insert(p.name.as_str()) {
                return Err(GenError::Layout {
                    name: p.name.clone(),
                    reason: format!("peripheral defined twice in {}", self.family),
                });
            }
            p.validate()?;
        }
        Ok(())
    }

    pub fn static_name(&self) -> String {
        macro_name(&format!("{}_{}", self.family, self.revision))
    }
}

impl ObjGenHeader for DeviceDesc {
    fn render_name(&self) -> &str {
        &self.family
    }

    fn gen_rust_header<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "pub static {}: Device = Device {{", self.static_name())?;
        writeln!(out, "    family: {:?},", self.family)?;
        writeln!(out, "    revision: {:?},", self.revision)?;
        writeln!(out, "    peripherals: &[")?;
        for p in &self.peripherals {
            writeln!(out, "        RegisterMap {{")?;
            writeln!(out, "        peripheral: {:?},", p.name)?;
            writeln!(out, "        revision: {:?},", self.revision)?;
            writeln!(out, "        base_address: {:#x},", p.base_address)?;
            writeln!(out, "        registers: &[")?;
            for r in &p.registers {
                r.gen_rust(&p.name, p.base_address, out)?;
            }
            writeln!(out, "        ],")?;
            writeln!(out, "        }},")?;
        }
        writeln!(out, "    ],")?;
        writeln!(out, "}};")?;
        Ok(())
    }
}

/// Emits every device followed by the `DEVICES` registry.
pub fn gen_device_tables<W: Write>(devices: &[DeviceDesc], out: &mut W) -> std::io::Result<()> {
    writeln!(out, "// This file is auto generated!")?;
    for d in devices {
        d.gen_header(&super::HeaderType::Rust, out)?;
    }
    write!(out, "pub static DEVICES: &[&Device] = &[")?;
    for d in devices {
        write!(out, "&{}, ", d.static_name())?;
    }
    writeln!(out, "];")?;
    Ok(())
}
