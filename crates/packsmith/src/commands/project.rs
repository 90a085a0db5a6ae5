use packsmith_core::{TransferSettings, UpdateProject};

use super::Context;
use crate::cli::ProjectCommands;
use crate::error::AppError;

pub fn run(context: &Context, command: ProjectCommands) -> Result<(), AppError> {
    match command {
        ProjectCommands::Init {
            name,
            update_uri,
            local_root,
            http_url,
            username,
            statistics,
        } => {
            let transfer = match (local_root, http_url) {
                (Some(root), None) => TransferSettings::Local { root },
                (None, Some(base_url)) => TransferSettings::Http { base_url, username },
                _ => {
                    return Err(AppError::invalid_argument(
                        "transfer",
                        "pass either --local-root or --http-url",
                    ));
                }
            };
            let project =
                UpdateProject::create(&context.paths, &name, &update_uri, transfer, statistics)
                    .map_err(|error| AppError::project_failed("create", error))?;
            println!("Created project {} ({})", project.name, project.guid);
            Ok(())
        }
        ProjectCommands::Show { name } => {
            let project = context.load_project(&name)?;
            print!("{}", describe(&project));
            Ok(())
        }
        ProjectCommands::List => {
            let names = UpdateProject::list(&context.paths)
                .map_err(|error| AppError::project_failed("list", error))?;
            if names.is_empty() {
                println!("No projects in {}", context.paths.projects_dir().display());
            }
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn describe(project: &UpdateProject) -> String {
    let transfer = match &project.transfer {
        TransferSettings::Local { root } => format!("local directory {}", root.display()),
        TransferSettings::Http { base_url, username } => match username {
            Some(user) => format!("HTTP {base_url} as {user}"),
            None => format!("HTTP {base_url}"),
        },
    };

    let mut out = format!(
        "{}\n  GUID:        {}\n  Updates at:  {}\n  Transfer:    {transfer}\n  Statistics:  {}\n",
        project.name,
        project.guid,
        project.update_directory_uri,
        if project.use_statistics { "on" } else { "off" }
    );

    if project.packages.is_empty() {
        out.push_str("  No packages\n");
        return out;
    }

    let mut packages: Vec<_> = project.packages.iter().collect();
    packages.sort_by_key(|entry| entry.version);
    out.push_str("  Packages:\n");
    for entry in packages {
        out.push_str(&format!(
            "    {:<20} {:<10} {}  {}\n",
            entry.version.description(),
            if entry.is_released { "released" } else { "draft" },
            entry.created_at.format("%Y-%m-%d"),
            entry.description
        ));
    }
    out
}
