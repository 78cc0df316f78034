pub mod prelude;

pub mod guild_configs;
pub mod joinable_links;
