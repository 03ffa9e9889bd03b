use super::engine::{ConfiguratorOutput, OutputKind};
use super::ConfError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Result code reported for a channel the engine returned no model for.
pub const NO_MODEL_RESULT_CODE: i32 = -1;

/// One entry of `radioconf_generation_log.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub channel_name: String,
    pub result_code: i32,
    pub error_message: String,
    pub logs: Vec<String>,
    pub cfg_logs: Vec<String>,
}

impl GenerationResult {
    pub fn failed(&self) -> bool {
        self.result_code != 0
    }

    /// One result per channel config entry, in engine order.
    pub fn collect(output: &ConfiguratorOutput) -> Vec<GenerationResult> {
        output
            .base_channel_configurations
            .iter()
            .flat_map(|base| base.channel_config_entries.iter())
            .map(|entry| match &entry.radio_configurator_output_model {
                Some(model) => GenerationResult {
                    channel_name: entry.name.clone(),
                    result_code: model.result_code,
                    error_message: model.error_message.clone(),
                    logs: model.logs.clone(),
                    cfg_logs: model
                        .profile
                        .get_outputs(OutputKind::Log)
                        .map(|o| match &o.value {
                            serde_json::Value::String(s) => format!("{}: {}", o.name, s),
                            v => format!("{}: {}", o.name, v),
                        })
                        .collect(),
                },
                None => GenerationResult {
                    channel_name: entry.name.clone(),
                    result_code: NO_MODEL_RESULT_CODE,
                    error_message: "no radio configurator output".to_string(),
                    logs: vec![],
                    cfg_logs: vec![],
                },
            })
            .collect()
    }
}

pub fn write_log(path: &Path, results: &[GenerationResult]) -> Result<(), ConfError> {
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json).map_err(|e| ConfError::Io(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radioconf::engine::*;
    use crate::radioconf::tests::scratch_dir;

    fn output() -> ConfiguratorOutput {
        ConfiguratorOutput {
            output_files: OutputFiles::default(),
            base_channel_configurations: vec![BaseChannelConfiguration {
                name: "base".to_string(),
                channel_config_entries: vec![
                    ChannelConfigEntry {
                        name: "ch0".to_string(),
                        radio_configurator_output_model: Some(OutputModel {
                            result_code: 0,
                            error_message: String::new(),
                            logs: vec!["ok".to_string()],
                            profile: Profile {
                                outputs: vec![
                                    ProfileOutput {
                                        name: "bitrate".to_string(),
                                        kind: OutputKind::Log,
                                        value: serde_json::json!("38400"),
                                    },
                                    ProfileOutput {
                                        name: "deviation".to_string(),
                                        kind: OutputKind::Log,
                                        value: serde_json::json!(20000),
                                    },
                                    ProfileOutput {
                                        name: "MODINDEX".to_string(),
                                        kind: OutputKind::SvdRegField,
                                        value: serde_json::json!(3),
                                    },
                                ],
                            },
                        }),
                    },
                    ChannelConfigEntry {
                        name: "ch1".to_string(),
                        radio_configurator_output_model: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn collect_results() {
        let results = GenerationResult::collect(&output());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].cfg_logs, vec!["bitrate: 38400", "deviation: 20000"]);
        assert!(!results[0].failed());
        assert!(results[1].failed());
    }

    #[test]
    fn log_file() {
        let dir = scratch_dir("log_file");
        let path = dir.join("radioconf_generation_log.json");
        write_log(&path, &GenerationResult::collect(&output())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["channel_name"], "ch0");
        assert_eq!(entries[0]["result_code"], 0);
        assert_eq!(entries[0]["logs"][0], "ok");
        assert_eq!(entries[1]["result_code"], -1);
    }
}
