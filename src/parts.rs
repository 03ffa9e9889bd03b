//! Register maps of the supported parts, generated at build time from
//! `regdesc/<family>_<revision>.svd`.

use crate::error::{RegError, Result};
use crate::reg_if::*;

include!(concat!(env!("OUT_DIR"), "/regmaps.rs"));

/// Finds the device of `family`, case-insensitively. Without a revision the
/// newest one is returned.
pub fn device(family: &str, revision: Option<&str>) -> Result<&'static Device> {
    let mut candidates = DEVICES
        .iter()
        .copied()
        .filter(|d| d.family.eq_ignore_ascii_case(family));
    let found = match revision {
        Some(rev) => candidates.find(|d| d.revision.eq_ignore_ascii_case(rev)),
        None => candidates.max_by(|a, b| {
            a.revision
                .to_ascii_lowercase()
                .cmp(&b.revision.to_ascii_lowercase())
        }),
    };
    found.ok_or_else(|| {
        RegError::not_found(
            "Device",
            match revision {
                Some(rev) => format!("{}_{}", family, rev),
                None => family.to_string(),
            },
        )
    })
}

/// Parses `"efr32xg21"` or `"efr32xg21_revB0"`.
pub fn device_by_part(part: &str) -> Result<&'static Device> {
    match part.split_once('_') {
        Some((family, revision)) => device(family, Some(revision)),
        None => device(part, None),
    }
}
