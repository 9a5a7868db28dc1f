mod acquisition_config;
mod env_vars;

pub use acquisition_config::{executable_directory, AcquisitionConfig};

pub use env_vars::expand_env_vars;
