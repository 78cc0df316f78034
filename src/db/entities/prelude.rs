pub use super::guild_configs::Entity as GuildConfigs;
pub use super::joinable_links::Entity as JoinableLinks;
