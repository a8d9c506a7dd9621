pub mod device;
pub mod remote;

pub use device::TestDevice;
pub use remote::MemoryRemote;
