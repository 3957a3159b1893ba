pub mod import;
pub mod quality;
