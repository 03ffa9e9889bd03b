use clap::{App, Arg};
use radio_regmap::logger;
use radio_regmap::radioconf::engine::{Configurator, ExternalConfigurator};
use radio_regmap::radioconf::{self, GenConfig};
use std::path::PathBuf;

fn main() {
    let matches = App::new("radioconf_gen")
        .author("shady83123 <shady831213@126.com>")
        .about("Generates rail_config.c/h from a .radioconf file")
        .arg(
            Arg::with_name("inputs")
                .index(1)
                .required(true)
                .multiple(true)
                .value_name("INPUT")
                .help(".radioconf files or directories containing them"),
        )
        .arg(
            Arg::with_name("outdir")
                .short("o")
                .long("outdir")
                .value_name("OUT_DIR")
                .takes_value(true)
                .default_value(".")
                .help("output directory, created if missing"),
        )
        .arg(
            Arg::with_name("engine")
                .short("e")
                .long("engine")
                .value_name("CMD")
                .takes_value(true)
                .validator(|cmd| {
                    if cmd.trim().is_empty() {
                        Err(String::from("engine command is empty"))
                    } else {
                        Ok(())
                    }
                })
                .help("configurator engine command split on whitespace, defaults to $RADIOCONF_ENGINE"),
        )
        .arg(
            Arg::with_name("engine_path")
                .short("p")
                .long("engine-path")
                .value_name("PROGRAM")
                .takes_value(true)
                .conflicts_with("engine")
                .help("configurator engine program, taken verbatim"),
        )
        .arg(
            Arg::with_name("engine_args")
                .short("a")
                .long("engine-arg")
                .value_name("ARG")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .requires("engine_path")
                .help("argument passed verbatim to --engine-path, repeatable"),
        )
        .get_matches();
    let guard = logger::init();
    let config = GenConfig {
        inputs: matches
            .values_of("inputs")
            .map(|v| v.map(PathBuf::from).collect())
            .unwrap_or_default(),
        outdir: PathBuf::from(matches.value_of("outdir").unwrap_or(".")),
    };
    let engine = ExternalConfigurator::select(
        matches.value_of("engine"),
        matches.value_of("engine_path"),
        matches
            .values_of("engine_args")
            .map(|v| v.map(String::from).collect())
            .unwrap_or_default(),
    );
    let code = radioconf::run(
        &config,
        engine.as_ref().map(|e| e as &dyn Configurator),
        &mut std::io::stdout(),
    );
    drop(guard);
    std::process::exit(code);
}
