use super::ConfError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// The multi-PHY radio configurator: turns a lower-cased radioconf document
/// into generated sources and per-channel results.
pub trait Configurator {
    fn configure(&self, xml: &str) -> Result<ConfiguratorOutput, ConfError>;
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorOutput {
    #[serde(default)]
    pub output_files: OutputFiles,
    #[serde(default)]
    pub base_channel_configurations: Vec<BaseChannelConfiguration>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFiles {
    #[serde(default)]
    pub file: Vec<OutputFile>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub name: String,
    #[serde(default)]
    pub source_code: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseChannelConfiguration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub channel_config_entries: Vec<ChannelConfigEntry>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfigEntry {
    pub name: String,
    #[serde(default)]
    pub radio_configurator_output_model: Option<OutputModel>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputModel {
    #[serde(default)]
    pub result_code: i32,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    SvdRegField,
    RailConfig,
    Info,
    Log,
    Warning,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileOutput {
    pub name: String,
    #[serde(default)]
    pub kind: OutputKind,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub outputs: Vec<ProfileOutput>,
}

impl Profile {
    pub fn get_outputs(&self, kind: OutputKind) -> impl Iterator<Item = &ProfileOutput> {
        self.outputs.iter().filter(move |o| o.kind == kind)
    }
}

/// Runs an engine program: the document goes to its stdin, the JSON
/// [`ConfiguratorOutput`] comes back on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalConfigurator {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalConfigurator {
    pub const ENV: &'static str = "RADIOCONF_ENGINE";

    pub fn new<P: Into<PathBuf>>(program: P, args: Vec<String>) -> Self {
        ExternalConfigurator {
            program: program.into(),
            args,
        }
    }

    /// `"program arg1 arg2"`, split on whitespace without any quoting, so the
    /// program path cannot contain spaces. Use [`ExternalConfigurator::new`]
    /// for such paths.
    pub fn from_command_line(cmd: &str) -> Option<Self> {
        let mut words = cmd.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program, words.map(String::from).collect()))
    }

    /// `$RADIOCONF_ENGINE`, split like [`ExternalConfigurator::from_command_line`].
    pub fn from_env() -> Option<Self> {
        std::env::var(Self::ENV)
            .ok()
            .and_then(|cmd| Self::from_command_line(&cmd))
    }

    /// Engine chosen by `radioconf_gen`: `path` and `args` taken verbatim,
    /// else the `cmd` command line, else the environment.
    pub fn select(cmd: Option<&str>, path: Option<&str>, args: Vec<String>) -> Option<Self> {
        match (path, cmd) {
            (Some(path), _) => Some(Self::new(path, args)),
            (None, Some(cmd)) => Self::from_command_line(cmd),
            (None, None) => Self::from_env(),
        }
    }
}

impl Configurator for ExternalConfigurator {
    fn configure(&self, xml: &str) -> Result<ConfiguratorOutput, ConfError> {
        tracing::debug!(target: "radioconf", "run {} {:?}", self.program.display(), self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConfError::Engine(format!("cannot start {}: {}", self.program.display(), e)))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ConfError::Engine("engine stdin unavailable".to_string()))?;
        let input = xml.to_string();
        let feeder = std::thread::spawn(move || stdin.write_all(input.as_bytes()));
        let output = child
            .wait_with_output()
            .map_err(|e| ConfError::Engine(format!("{} failed: {}", self.program.display(), e)))?;
        match feeder.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(ConfError::Engine(format!("write to engine: {}", e))),
            Err(_) => return Err(ConfError::Engine("engine feeder panicked".to_string())),
        }
        if !output.status.success() {
            return Err(ConfError::Engine(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
