pub mod languages;
pub mod types;

pub use types::{DownloadProgress, Region, TextAlign};
