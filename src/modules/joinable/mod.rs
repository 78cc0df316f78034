//! Joinable channels: private channels members enter and leave by reacting to
//! an announcement in the guild's join channel.

pub mod announcement;
pub mod authorization;
pub mod commands;
pub mod config;
pub mod error;
pub mod provisioner;
pub mod reactions;
pub mod saga;
#[cfg(test)]
pub mod testing;

use super::{Module, ModuleDefinition};

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "joinable",
            name_key: "module-joinable-name",
            description_key: "module-joinable-description",
        },
        commands: commands::commands(),
    }
}
