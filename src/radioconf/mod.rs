//! `.radioconf` to RAIL source generation.
pub mod engine;
pub mod input;
pub mod log;
pub mod xml;
use crate::logger;
use engine::Configurator;
use log::GenerationResult;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const RADIOCONF_EXT: &str = "radioconf";
pub const LOG_FILE_NAME: &str = "radioconf_generation_log.json";

const STATICS_TAR: &str = "radioconf";

#[derive(thiserror::Error, Debug)]
pub enum ConfError {
    #[error("No .radioconf file found.")]
    NoInput,
    #[error("{} does not exist.", .0.display())]
    MissingPath(PathBuf),
    #[error("Io error on {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Invalid radioconf xml: {0}")]
    Xml(#[from] xmltree::ParseError),
    #[error("Cannot serialize radioconf xml: {0}")]
    XmlWrite(#[from] xmltree::Error),
    #[error("Configurator engine: {0}")]
    Engine(String),
    #[error("Invalid configurator output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No configurator engine, use --engine or set RADIOCONF_ENGINE.")]
    NoEngine,
    #[error("Invalid output file name '{0}'.")]
    OutputName(String),
}

/// Command line configuration of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    pub inputs: Vec<PathBuf>,
    pub outdir: PathBuf,
}

/// What a generation run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub files: Vec<PathBuf>,
    pub log_path: PathBuf,
    pub results: Vec<GenerationResult>,
}

impl Generation {
    pub fn failed(&self) -> bool {
        self.results.iter().any(|r| r.failed())
    }
}

/// Only the file name part of an engine supplied name is honoured. Names must
/// be unique and must not collide with the generation log.
fn output_path(outdir: &Path, name: &str) -> Result<PathBuf, ConfError> {
    Path::new(name)
        .file_name()
        .map(|n| outdir.join(n))
        .ok_or_else(|| ConfError::OutputName(name.to_string()))
}

/// Runs `engine` on the radioconf at `input` and writes its files plus the
/// generation log into `outdir`.
pub fn generate<C: Configurator + ?Sized>(
    input: &Path,
    outdir: &Path,
    engine: &C,
) -> Result<Generation, ConfError> {
    let span = tracing::span!(target: STATICS_TAR, logger::STATICS_LEVEL, "generate", input = %input.display());
    let _enter = span.enter();
    let raw = fs::read_to_string(input).map_err(|e| ConfError::Io(input.to_path_buf(), e))?;
    let xml = xml::lowercase_tags(&raw)?;
    let output = engine.configure(&xml)?;
    let mut files = vec![];
    for f in &output.output_files.file {
        let path = output_path(outdir, &f.name)?;
        if path.file_name() == Some(std::ffi::OsStr::new(LOG_FILE_NAME)) || files.contains(&path) {
            return Err(ConfError::OutputName(f.name.clone()));
        }
        files.push(path);
    }
    fs::create_dir_all(outdir).map_err(|e| ConfError::Io(outdir.to_path_buf(), e))?;
    for (path, f) in files.iter().zip(&output.output_files.file) {
        fs::write(path, f.source_code.as_bytes()).map_err(|e| ConfError::Io(path.clone(), e))?;
        tracing::event!(target: STATICS_TAR, logger::STATICS_LEVEL, name = "file written", path = %path.display());
    }
    let results = GenerationResult::collect(&output);
    let log_path = outdir.join(LOG_FILE_NAME);
    log::write_log(&log_path, &results)?;
    for r in results.iter().filter(|r| r.failed()) {
        tracing::event!(
            target: STATICS_TAR,
            tracing::Level::ERROR,
            name = "channel failed",
            channel = %r.channel_name,
            code = r.result_code
        );
    }
    Ok(Generation {
        files,
        log_path,
        results,
    })
}

/// The whole command: resolve the input, generate, report to `msg`.
/// Returns the process exit status.
pub fn run<W: Write>(config: &GenConfig, engine: Option<&dyn Configurator>, msg: &mut W) -> i32 {
    run_inner(config, engine, msg).unwrap_or_else(|e| {
        let _ = writeln!(msg, "Error: {}", e);
        1
    })
}

fn run_inner<W: Write>(
    config: &GenConfig,
    engine: Option<&dyn Configurator>,
    msg: &mut W,
) -> Result<i32, ConfError> {
    let resolved = match input::find_radioconf(&config.inputs) {
        Err(ConfError::NoInput) => {
            let _ = writeln!(msg, "Warning: no .{} file found in the given inputs.", RADIOCONF_EXT);
            return Ok(1);
        }
        r => r?,
    };
    if !resolved.ignored.is_empty() {
        let _ = writeln!(
            msg,
            "Warning: {} .{} files found, using {}.",
            resolved.ignored.len() + 1,
            RADIOCONF_EXT,
            resolved.path.display()
        );
    }
    let engine = engine.ok_or(ConfError::NoEngine)?;
    let generation = generate(&resolved.path, &config.outdir, engine)?;
    for f in generation.files.iter().chain(std::iter::once(&generation.log_path)) {
        let _ = writeln!(msg, "Gen {} successfully!", f.display());
    }
    if generation.failed() {
        for r in generation.results.iter().filter(|r| r.failed()) {
            let _ = writeln!(msg, "Error: channel {} failed ({}): {}", r.channel_name, r.result_code, r.error_message);
        }
        return Ok(1);
    }
    Ok(0)
}
