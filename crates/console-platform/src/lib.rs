// Host facilities the console needs from its environment

pub mod filesystem;
pub mod download;
