use clap::{App, Arg};
use radio_regmap::parts::DEVICES;
use radio_regmap::reg_if::{Device, HeaderType, ObjGenHeader};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    let matches = App::new("radio_regmap_header_gen")
        .author("shady83123 <shady831213@126.com>")
        .arg(
            Arg::with_name("path")
                .index(1)
                .required(true)
                .value_name("OUT_PATH")
                .validator(|path| {
                    if Path::new(path.as_str()).is_dir() {
                        Ok(())
                    } else {
                        Err(format!("{} is not dir!", path))
                    }
                })
                .help("header files output path"),
        )
        .arg(
            Arg::with_name("language")
                .short("l")
                .long("lang")
                .value_name("LANG")
                .require_delimiter(true)
                .takes_value(true)
                .validator(
                    |raw| match raw.split_whitespace().collect::<String>().as_str() {
                        "c" => Ok(()),
                        _ => Err(String::from("only support 'c'")),
                    },
                )
                .default_value("c")
                .help("header files language"),
        )
        .get_matches();
    let path = PathBuf::from(matches.value_of("path").unwrap_or("."));
    let languages = matches.values_of("language").unwrap_or_default();
    let mut failed = false;
    for l in languages {
        for device in DEVICES.iter() {
            if let Err(e) = gen_device(&path, l, device) {
                eprintln!(
                    "Gen regs of {} for '{}' to {} failed: {}",
                    device.render_name(),
                    l,
                    path.display(),
                    e
                );
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

fn gen_device(path: &Path, lang: &str, device: &Device) -> std::io::Result<()> {
    let header_ty = match lang {
        "c" => HeaderType::C,
        _ => HeaderType::Rust,
    };
    let out_path = path.join(lang);
    if !out_path.is_dir() {
        fs::create_dir_all(&out_path)?;
    }
    let stem = format!(
        "{}_{}_regs",
        device.family.to_ascii_lowercase(),
        device.revision.to_ascii_lowercase()
    );
    let guard = format!("__{}_H__", stem.to_ascii_uppercase());
    let out_file_path = out_path.join(format!("{}.h", stem));
    let mut out_file = fs::File::create(&out_file_path)?;
    writeln!(out_file, "// This file is auto generated!")?;
    writeln!(out_file, "#ifndef {}", guard)?;
    writeln!(out_file, "#define {}", guard)?;
    writeln!(out_file, "#include <stdint.h>")?;
    device.gen_header(&header_ty, &mut out_file)?;
    writeln!(out_file, "#endif")?;
    println!("Gen {} successfully!", out_file_path.display());
    Ok(())
}
