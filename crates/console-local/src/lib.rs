// Filesystem-backed host facilities

pub mod filesystem;
pub mod download;
