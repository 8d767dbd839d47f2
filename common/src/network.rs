pub mod device;
pub mod interface;
pub mod subnet;
