use packsmith_model::OperationKind;
use packsmith_model::catalog::{FRAMEWORK_VERSIONS, OS_VERSIONS, framework_label};

use crate::cli::CatalogCommands;

pub fn run(command: &CatalogCommands) {
    print!("{}", render(command));
}

fn render(command: &CatalogCommands) -> String {
    match command {
        CatalogCommands::Operations => OperationKind::ALL
            .iter()
            .map(|kind| {
                let (area, method) = kind.area_method();
                format!(
                    "{:<22} {:<24} {area}/{method}\n",
                    kind.tag(),
                    kind.display_name()
                )
            })
            .collect(),
        CatalogCommands::Os => OS_VERSIONS
            .iter()
            .map(|(name, version)| format!("{name:<30} {version}\n"))
            .collect(),
        CatalogCommands::Frameworks => FRAMEWORK_VERSIONS
            .iter()
            .map(|version| format!("{}\n", framework_label(version)))
            .collect(),
    }
}
