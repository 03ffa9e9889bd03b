use radio_regmap_generator::svd;
use radio_regmap_generator::gen_device_tables;
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let desc_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join("regdesc");
    println!("cargo:rerun-if-changed={}", desc_dir.display());
    let devices = svd::load_dir(&desc_dir)?;
    for d in &devices {
        println!("cargo:rerun-if-changed={}", desc_dir.join(format!("{}_{}.svd", d.family.to_lowercase(), d.revision)).display());
    }
    let out_path = PathBuf::from(env::var("OUT_DIR")?).join("regmaps.rs");
    let mut out_file = fs::File::create(&out_path)?;
    gen_device_tables(&devices, &mut out_file)?;
    Ok(())
}
