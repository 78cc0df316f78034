pub mod commands;

use super::{Module, ModuleDefinition};

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "setup",
            name_key: "module-setup-name",
            description_key: "module-setup-description",
        },
        commands: commands::commands(),
    }
}
