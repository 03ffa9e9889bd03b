use super::{width_mask, Device, RegisterMap};
use radio_regmap_generator::{macro_name, HeaderType, ObjGenHeader};
use std::io::Write;

impl ObjGenHeader for RegisterMap {
    fn render_name(&self) -> &str {
        self.peripheral
    }

    fn gen_c_header<W: Write>(&self, header: &mut W) -> std::io::Result<()> {
        let periph = macro_name(self.peripheral);
        writeln!(header, "#define {}_BASE {:#x}", periph, self.base_address)?;
        for r in self {
            let reg_name = format!("{}_{}", periph, macro_name(r.name));
            writeln!(header, "")?;
            if r.description.is_empty() {
                writeln!(header, "// {}.{} ({})", self.peripheral, r.name, r.access)?;
            } else {
                writeln!(header, "// {}.{} ({}): {}", self.peripheral, r.name, r.access, r.description)?;
            }
            writeln!(header, "#define {}_OFFSET {:#x}", &reg_name, r.offset)?;
            writeln!(header, "#define {}_ADDR {:#x}", &reg_name, r.address())?;
            writeln!(header, "#define {}_RESET {:#x}", &reg_name, r.reset_value)?;
            writeln!(header, "#define {}_MASK {:#x}", &reg_name, r.write_mask)?;
            if let Some(a) = r.aliases {
                for (alias, o) in [("SET", a.set), ("CLR", a.clr), ("TGL", a.tgl)] {
                    if let Some(addr) = r.alias_address(o) {
                        writeln!(header, "#define {}_{}_ADDR {:#x}", &reg_name, alias, addr)?;
                    }
                }
            }
            for f in r.fields {
                let field_name = format!("{}_{}", &reg_name, macro_name(f.name));
                writeln!(header, "#define {}_POS {}", &field_name, f.bit_offset)?;
                writeln!(header, "#define {}_FLAGS {:#x}", &field_name, width_mask(f.bit_width))?;
                if !f.enums.is_empty() {
                    write!(header, "//Enum:")?;
                    for v in f.enums.iter() {
                        write!(header, " {} : {:#x};", v.name, v.value)?;
                    }
                    write!(header, "\n")?;
                }
                writeln!(header, "#define {}(x) (((x) >> {}_POS) & {}_FLAGS)", &field_name, &field_name, &field_name)?;
                writeln!(header, "#define SET_{}(x) (((x) & {}_FLAGS) << {}_POS)", &field_name, &field_name, &field_name)?;
            }
        }
        Ok(())
    }
}

impl ObjGenHeader for Device {
    fn render_name(&self) -> &str {
        self.family
    }

    fn gen_c_header<W: Write>(&self, header: &mut W) -> std::io::Result<()> {
        writeln!(header, "// {} {}", self.family, self.revision)?;
        for p in self.peripherals {
            p.gen_header(&HeaderType::C, header)?;
        }
        Ok(())
    }
}
