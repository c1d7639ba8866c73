//! 命令定义和实现

pub mod checksum;
pub mod params;
pub mod simulate;

pub use checksum::ChecksumCommand;
pub use params::ParamsCommand;
pub use simulate::SimulateCommand;
