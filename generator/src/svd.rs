//! Reads CMSIS-SVD register descriptions into [`DeviceDesc`].
//!
//! Files are named `<family>_<revision>.svd`, e.g. `efr32xg21_revB0.svd`.
//! Register properties fall back from register to peripheral to device
//! defaults, then to a 32-bit read-write register resetting to zero with
//! every bit writable. Register arrays and clusters are flattened.

use super::*;
use std::fs;
use std::path::{Path, PathBuf};
use svd_parser::svd::{
    self, Access, DimElement, MaybeArray, RegisterCluster, RegisterProperties,
};

/// Families whose radio peripherals have SET/CLR/TGL alias windows.
const ALIASED_FAMILY_PREFIX: &str = "EFR32XG2";

pub fn split_name(path: &Path) -> Result<(String, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| GenError::Name(path.display().to_string()))?;
    match stem.split_once('_') {
        Some((family, revision)) if !family.is_empty() && !revision.is_empty() => {
            Ok((family.to_uppercase(), revision.to_string()))
        }
        _ => Err(GenError::Name(stem.to_string())),
    }
}

pub fn aliases_for(family: &str) -> Option<AliasDesc> {
    if family.to_uppercase().starts_with(ALIASED_FAMILY_PREFIX) {
        Some(SET_CLR_TGL)
    } else {
        None
    }
}

pub fn load(path: &Path) -> Result<DeviceDesc> {
    let (family, revision) = split_name(path)?;
    let xml = fs::read_to_string(path).map_err(|e| GenError::Io(path.to_path_buf(), e))?;
    let device = parse(&xml, &family, &revision)
        .map_err(|e| GenError::Svd(path.to_path_buf(), e))?;
    device.validate()?;
    Ok(device)
}

/// Loads every `*.svd` in `dir`, sorted by file name.
pub fn load_dir(dir: &Path) -> Result<Vec<DeviceDesc>> {
    let mut paths = fs::read_dir(dir)
        .map_err(|e| GenError::Io(dir.to_path_buf(), e))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case("svd"))
        })
        .collect::<Vec<PathBuf>>();
    paths.sort();
    paths.iter().map(|p| load(p)).collect()
}

pub fn parse(xml: &str, family: &str, revision: &str) -> std::result::Result<DeviceDesc, String> {
    let device = svd_parser::parse(xml).map_err(|e| format!("{:#}", e))?;
    let aliases = aliases_for(family);
    let mut peripherals = vec![];
    for p in device.peripherals.iter() {
        let registers = match (&p.registers, &p.derived_from) {
            (Some(regs), _) => regs,
            (None, Some(base)) => device
                .peripherals
                .iter()
                .find(|b| &b.name == base)
                .and_then(|b| b.registers.as_ref())
                .ok_or_else(|| format!("{} derives from unknown {}", p.name, base))?,
            (None, None) => continue,
        };
        let defaults = merge(&p.default_register_properties, &device.default_register_properties);
        let mut out = vec![];
        collect(registers, 0, "", &defaults, aliases, &mut out)?;
        out.sort_by_key(|r| r.offset);
        let base_address = u32::try_from(p.base_address)
            .map_err(|_| format!("{} base address {:#x} exceeds 32 bits", p.name, p.base_address))?;
        match p {
            MaybeArray::Single(_) => peripherals.push(PeripheralDesc {
                name: p.name.clone(),
                base_address,
                registers: out,
            }),
            MaybeArray::Array(_, dim) => {
                for (i, name) in expand_names(&p.name, dim).into_iter().enumerate() {
                    peripherals.push(PeripheralDesc {
                        name,
                        base_address: base_address + i as u32 * dim.dim_increment,
                        registers: out.clone(),
                    });
                }
            }
        }
    }
    Ok(DeviceDesc {
        family: family.to_string(),
        revision: revision.to_string(),
        peripherals,
    })
}

fn merge(inner: &RegisterProperties, outer: &RegisterProperties) -> RegisterProperties {
    let mut p = outer.clone();
    if inner.size.is_some() {
        p.size = inner.size;
    }
    if inner.access.is_some() {
        p.access = inner.access;
    }
    if inner.reset_value.is_some() {
        p.reset_value = inner.reset_value;
    }
    if inner.reset_mask.is_some() {
        p.reset_mask = inner.reset_mask;
    }
    p
}

fn access(a: Option<Access>) -> RegisterAccess {
    match a {
        Some(Access::ReadOnly) => RegisterAccess::RO,
        Some(Access::WriteOnly) | Some(Access::WriteOnce) => RegisterAccess::WO,
        Some(Access::ReadWrite) | Some(Access::ReadWriteOnce) | None => RegisterAccess::RW,
    }
}

fn expand_names(name: &str, dim: &DimElement) -> Vec<String> {
    (0..dim.dim)
        .map(|i| {
            let index = dim
                .dim_index
                .as_ref()
                .and_then(|idx| idx.get(i as usize).cloned())
                .unwrap_or_else(|| i.to_string());
            name.replace("[%s]", &index).replace("%s", &index)
        })
        .collect()
}

fn collect(
    items: &[RegisterCluster],
    offset: u32,
    prefix: &str,
    defaults: &RegisterProperties,
    aliases: Option<AliasDesc>,
    out: &mut Vec<RegisterDesc>,
) -> std::result::Result<(), String> {
    for item in items {
        match item {
            RegisterCluster::Register(r) => {
                let props = merge(&r.properties, defaults);
                let desc = register(r, &props, aliases)?;
                let instances = match r {
                    MaybeArray::Single(_) => vec![(desc.name.clone(), 0)],
                    MaybeArray::Array(_, dim) => expand_names(&r.name, dim)
                        .into_iter()
                        .enumerate()
                        .map(|(i, n)| (n, i as u32 * dim.dim_increment))
                        .collect(),
                };
                for (name, step) in instances {
                    out.push(RegisterDesc {
                        name: format!("{}{}", prefix, name),
                        offset: offset + r.address_offset + step,
                        ..desc.clone()
                    });
                }
            }
            RegisterCluster::Cluster(c) => {
                let props = merge(&c.default_register_properties, defaults);
                let instances = match c {
                    MaybeArray::Single(_) => vec![(c.name.clone(), 0)],
                    MaybeArray::Array(_, dim) => expand_names(&c.name, dim)
                        .into_iter()
                        .enumerate()
                        .map(|(i, n)| (n, i as u32 * dim.dim_increment))
                        .collect(),
                };
                for (name, step) in instances {
                    collect(
                        &c.children,
                        offset + c.address_offset + step,
                        &format!("{}{}_", prefix, name),
                        &props,
                        aliases,
                        out,
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn register(
    r: &svd::RegisterInfo,
    props: &RegisterProperties,
    aliases: Option<AliasDesc>,
) -> std::result::Result<RegisterDesc, String> {
    let width = props.size.unwrap_or(32);
    let all = if width >= 32 {
        u32::MAX as u64
    } else {
        (1u64 << width) - 1
    };
    let to_u32 = |v: u64, what: &str| {
        u32::try_from(v).map_err(|_| format!("{} {} {:#x} exceeds 32 bits", r.name, what, v))
    };
    let reg_access = access(props.access);
    let mut fields = vec![];
    for f in r.fields.iter().flatten() {
        if let MaybeArray::Array(..) = f {
            return Err(format!("{}.{}: field arrays are not supported", r.name, f.name));
        }
        let lsb = f.bit_range.offset;
        let w = f.bit_range.width;
        if w == 0 {
            return Err(format!("{}.{} has zero width", r.name, f.name));
        }
        let enums = f
            .enumerated_values
            .iter()
            .flat_map(|ev| ev.values.iter())
            .filter_map(|v| {
                v.value.map(|value| EnumDesc {
                    name: v.name.clone(),
                    value: value as u32,
                })
            })
            .collect();
        fields.push(RegisterField {
            name: f.name.clone(),
            lsb,
            msb: lsb + w - 1,
            access: f.access.map(|a| access(Some(a))).unwrap_or(reg_access),
            enums,
        });
    }
    fields.sort_by_key(|f| f.lsb);
    Ok(RegisterDesc {
        name: r.name.clone(),
        offset: r.address_offset,
        width,
        access: reg_access,
        reset_value: to_u32(props.reset_value.unwrap_or(0) & all, "reset value")?,
        write_mask: to_u32(props.reset_mask.unwrap_or(all) & all, "reset mask")?,
        aliases,
        description: r
            .description
            .as_deref()
            .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default(),
        fields,
    })
}
