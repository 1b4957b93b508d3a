pub mod config;
pub mod dataset;
pub mod model_file;
