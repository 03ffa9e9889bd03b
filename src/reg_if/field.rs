use super::EnumVariant;
use crate::error::{RegError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    pub fn readable(&self) -> bool {
        !matches!(self, Access::WriteOnly)
    }
    pub fn writable(&self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::ReadOnly => "read-only",
            Access::WriteOnly => "write-only",
            Access::ReadWrite => "read-write",
        })
    }
}

/// Right aligned mask of `width` bits, `width` in `1..=32`.
pub const fn width_mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// A bitfield of a register.
#[derive(Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub access: Access,
    pub bit_offset: u32,
    pub bit_width: u32,
    pub enums: &'static [EnumVariant],
}

impl Field {
    /// In-place mask of the field bits.
    pub const fn mask(&self) -> u32 {
        width_mask(self.bit_width) << self.bit_offset
    }

    pub fn extract(&self, raw: u32) -> u32 {
        (raw >> self.bit_offset) & width_mask(self.bit_width)
    }

    /// Replaces the field bits of `raw` with `value`.
    ///
    /// Read-only fields are rejected with `UnsupportedOperation` rather than
    /// silently returning `raw`.
    pub fn insert(&self, raw: u32, value: u32) -> Result<u32> {
        if !self.access.writable() {
            return Err(RegError::UnsupportedOperation {
                name: self.name.to_string(),
                op: "insert into",
                access: self.access,
            });
        }
        if value > width_mask(self.bit_width) {
            return Err(RegError::OutOfRange {
                name: self.name.to_string(),
                value,
                width: self.bit_width,
            });
        }
        Ok((raw & !self.mask()) | (value << self.bit_offset))
    }

    pub fn enum_value(&self, name: &str) -> Result<u32> {
        self.enums
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.value)
            .ok_or_else(|| RegError::not_found("Enum", format!("{}.{}", self.name, name)))
    }

    pub fn enum_name(&self, value: u32) -> Option<&'static str> {
        self.enums.iter().find(|e| e.value == value).map(|e| e.name)
    }

    pub(crate) fn fits(&self, width: u32) -> bool {
        self.bit_width >= 1
            && self.bit_width <= 32
            && self
                .bit_offset
                .checked_add(self.bit_width)
                .map_or(false, |end| end <= width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAR: Field = Field {
        name: "BAR",
        access: Access::ReadWrite,
        bit_offset: 0,
        bit_width: 3,
        enums: &[],
    };

    const STATE: Field = Field {
        name: "STATE",
        access: Access::ReadOnly,
        bit_offset: 24,
        bit_width: 4,
        enums: &[
            EnumVariant { name: "OFF", value: 0 },
            EnumVariant { name: "RXWARM", value: 1 },
        ],
    };

    const WORD: Field = Field {
        name: "WORD",
        access: Access::ReadWrite,
        bit_offset: 0,
        bit_width: 32,
        enums: &[],
    };

    #[test]
    fn toy_extract_insert() {
        assert_eq!(BAR.extract(0x0000_0005), 5);
        assert_eq!(BAR.insert(0x0000_0000, 5), Ok(0x0000_0005));
        assert_eq!(BAR.insert(0xffff_fff8, 7), Ok(0xffff_ffff));
    }

    #[test]
    fn insert_extract_roundtrip() {
        for raw in [0u32, 0x5, 0xdead_beef, u32::MAX, 0x8000_0001] {
            assert_eq!(BAR.insert(raw, BAR.extract(raw)), Ok(raw));
            assert_eq!(WORD.insert(raw, WORD.extract(raw)), Ok(raw));
        }
    }

    #[test]
    fn out_of_range() {
        assert_eq!(
            BAR.insert(0, 8),
            Err(RegError::OutOfRange {
                name: "BAR".to_string(),
                value: 8,
                width: 3
            })
        );
        assert_eq!(WORD.insert(0, u32::MAX), Ok(u32::MAX));
    }

    #[test]
    fn read_only_insert() {
        assert!(matches!(
            STATE.insert(0, 1),
            Err(RegError::UnsupportedOperation { .. })
        ));
        assert_eq!(STATE.extract(0x0100_0000), 1);
    }

    #[test]
    fn enums() {
        assert_eq!(STATE.enum_value("rxwarm"), Ok(1));
        assert_eq!(STATE.enum_name(0), Some("OFF"));
        assert!(matches!(
            STATE.enum_value("TX"),
            Err(RegError::NotFound { .. })
        ));
    }

    #[test]
    fn masks() {
        assert_eq!(WORD.mask(), u32::MAX);
        assert_eq!(STATE.mask(), 0x0f00_0000);
        assert!(STATE.fits(32));
        assert!(!STATE.fits(24));
    }
}
