pub mod commands;

use super::{Module, ModuleDefinition};

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "general",
            name_key: "module-general-name",
            description_key: "module-general-description",
        },
        commands: commands::commands(),
    }
}
