//! CLI command implementations

pub mod add;
pub mod delete;
pub mod init;
pub mod list;
pub mod mask;
pub mod presets;
pub mod validate;
