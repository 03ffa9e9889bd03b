pub mod error;
pub mod logger;
pub mod parts;
pub mod radioconf;
pub mod reg_if;
pub use error::{RegError, Result};
