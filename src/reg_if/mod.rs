mod field;
mod header;
mod map;
mod register;
pub mod sequence;
mod sim_bus;
pub use field::*;
pub use map::*;
pub use radio_regmap_generator::{reg_map, EnumVariant, HeaderType, ObjGenHeader};
pub use register::*;
pub use sim_bus::SimBus;

/// Word access to the peripheral address space. `None` reports a failed
/// transfer. Implementations serialize concurrent accesses themselves.
pub trait RegBus {
    fn write(&self, addr: u32, data: u32) -> Option<()>;
    fn read(&self, addr: u32) -> Option<u32>;
}

impl<T: RegBus + ?Sized> RegBus for std::sync::Arc<T> {
    fn write(&self, addr: u32, data: u32) -> Option<()> {
        (**self).write(addr, data)
    }
    fn read(&self, addr: u32) -> Option<u32> {
        (**self).read(addr)
    }
}
