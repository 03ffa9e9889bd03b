mod register;
pub mod svd;
pub use convert_case::*;
pub use radio_regmap_generator_macros::*;
pub use register::*;

/// One named value of an enumerated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: &'static str,
    pub value: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum GenError {
    #[error("Io error on {}: {}", .0.display(), .1)]
    Io(std::path::PathBuf, std::io::Error),
    #[error("Invalid svd {}: {}", .0.display(), .1)]
    Svd(std::path::PathBuf, String),
    #[error("Description file name '{}' is not '<family>_<revision>.svd'.", .0)]
    Name(String),
    #[error("Invalid layout of '{name}': {reason}")]
    Layout { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, GenError>;

#[derive(Debug)]
pub enum HeaderType {
    C,
    Rust,
}

pub trait ObjGenHeader {
    fn render_name(&self) -> &str;
    fn gen_header<W: std::io::Write>(
        &self,
        header_type: &HeaderType,
        header: &mut W,
    ) -> std::io::Result<()> {
        writeln!(header, "")?;
        match header_type {
            HeaderType::C => self.gen_c_header(header),
            HeaderType::Rust => self.gen_rust_header(header),
        }?;
        writeln!(header, "")?;
        Ok(())
    }

    fn gen_c_header<W: std::io::Write>(&self, _header: &mut W) -> std::io::Result<()> {
        Err(unsupported(self.render_name(), "c"))
    }

    fn gen_rust_header<W: std::io::Write>(&self, _header: &mut W) -> std::io::Result<()> {
        Err(unsupported(self.render_name(), "rust"))
    }
}

fn unsupported(name: &str, lang: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("{}: unsupport {} header!", name, lang),
    )
}

/// Upper snake case name used for C macros and Rust statics, e.g. `efr32xg21_revB0` -> `EFR32XG21_REVB0`.
pub fn macro_name(s: &str) -> String {
    s.from_case(Case::Snake).to_case(Case::UpperSnake)
}
