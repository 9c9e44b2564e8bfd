mod credentials;

pub use credentials::resolve_credentials;
