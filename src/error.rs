use crate::reg_if::Access;

/// Errors of the register access layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegError {
    #[error("Value {value:#x} does not fit {width}-bit field {name}.")]
    OutOfRange { name: String, value: u32, width: u32 },
    #[error("{kind} '{name}' not found.")]
    NotFound { kind: &'static str, name: String },
    #[error("Cannot {op} {access} '{name}'.")]
    UnsupportedOperation {
        name: String,
        op: &'static str,
        access: Access,
    },
    #[error("Bus access to {address:#010x} failed.")]
    Bus { address: u32 },
    #[error("Invalid layout of '{name}': {reason}")]
    Layout { name: String, reason: String },
    #[error("Conflicting writes to {name} ({address:#010x}): {first:#x} and {second:#x}.")]
    Conflict {
        name: String,
        address: u32,
        first: u32,
        second: u32,
    },
}

pub type Result<T> = std::result::Result<T, RegError>;

impl RegError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        RegError::NotFound {
            kind,
            name: name.into(),
        }
    }
}
