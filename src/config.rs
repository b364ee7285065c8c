//! Settings for the player, the library scanner and logging.
//!
//! Values come from struct defaults, an optional TOML file and `PLAYBOT__*`
//! environment variables, in increasing order of precedence.

mod load;
mod schema;

pub use load::{CONFIG_PATH_VAR, default_config_path, resolve_config_path};
pub use schema::*;

#[cfg(test)]
mod tests;
