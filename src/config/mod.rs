mod settings;

pub use settings::{expand_home, FileCredentials, Settings, UpdaterConfig};
