mod file;

pub use file::IpStateStore;
