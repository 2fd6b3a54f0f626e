pub mod config;
pub mod info;
pub mod init;
pub mod simulate;
pub mod validate;
