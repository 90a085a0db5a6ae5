use std::path::Path;

use packsmith_core::{
    PackageDraft, PackageEditor, SaveOutcome, UpdateProject, create_package, delete_package,
    publish_configuration, publish_package,
};
use packsmith_model::catalog::parse_framework_label;
use packsmith_model::{
    Architecture, Locale, Operation, OperationKind, PackageConfiguration, RequirementVersion,
    Transfer, UpdateRequirement, UpdateVersion,
};
use packsmith_transfer::create_transfer;

use super::{Context, parse_version};
use crate::async_helpers::Attempts;
use crate::cli::{EditArgs, PackageCommands};
use crate::error::AppError;

pub async fn run(context: &Context, command: PackageCommands) -> Result<(), AppError> {
    match command {
        PackageCommands::Create {
            project,
            version,
            changelog,
            changelog_file,
            description,
        } => {
            let changelog = match (changelog, changelog_file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_changelog_file("--changelog-file", &path)?,
                (None, None) => {
                    return Err(AppError::invalid_argument(
                        "--changelog",
                        "an English changelog is required",
                    ));
                }
            };
            create(context, &project, &version, &changelog, &description)
        }
        PackageCommands::Show {
            project,
            version,
            json,
        } => show(context, &project, &version, json),
        PackageCommands::Edit(args) => edit(context, &args).await,
        PackageCommands::Validate { project, version } => validate(context, &project, &version),
        PackageCommands::Publish {
            project,
            version,
            auth,
        } => publish(context, &project, &version, auth.password).await,
        PackageCommands::Delete { project, version } => delete(context, &project, &version),
    }
}

fn create(
    context: &Context,
    project_name: &str,
    version: &str,
    changelog: &str,
    description: &str,
) -> Result<(), AppError> {
    let _lock = context.lock_project(project_name)?;
    let mut project = context.load_project(project_name)?;
    let mut set = context.load_packages(project_name)?;
    let version = parse_version("version", version)?;

    create_package(
        &mut set,
        &mut project,
        &context.paths,
        version,
        changelog,
        description,
    )
    .map_err(|error| AppError::package_failed("create", error))?;

    if let Some(index) = set.position(&version)
        && let Some(mut config) = set.find(&version).cloned()
    {
        config.architecture = context.settings.default_architecture;
        set.replace(index, config);
    }

    context.save_packages(project_name, &set)?;
    project
        .save(&context.paths)
        .map_err(|error| AppError::project_failed("save", error))?;
    println!(
        "Created package {} in {}",
        version.description(),
        project.name
    );
    Ok(())
}

fn show(context: &Context, project_name: &str, version: &str, json: bool) -> Result<(), AppError> {
    let project = context.load_project(project_name)?;
    let set = context.load_packages(project_name)?;
    let version = parse_version("version", version)?;
    let config = set.find(&version).ok_or_else(|| {
        AppError::package_failed("find", format!("{version} is not part of {project_name}"))
    })?;

    if json {
        let content = serde_json::to_string_pretty(config)
            .map_err(|error| AppError::package_failed("serialize", error))?;
        println!("{content}");
    } else {
        print!("{}", render(&project, &version, config));
    }
    Ok(())
}

fn render(project: &UpdateProject, version: &UpdateVersion, config: &PackageConfiguration) -> String {
    let entry = project.entry(version);
    let mut out = format!(
        "{} ({})\n",
        version.description(),
        if entry.is_some_and(|entry| entry.is_released) {
            "released"
        } else {
            "draft"
        }
    );
    if let Some(entry) = entry.filter(|entry| !entry.description.is_empty()) {
        out.push_str(&format!("  {}\n", entry.description));
    }
    out.push_str(&format!(
        "  Necessary:     {}\n  Architecture:  {}\n  Statistics:    {}\n",
        yes_no(config.necessary_update),
        config.architecture,
        yes_no(config.use_statistics)
    ));
    if let Some(uri) = &config.update_package_uri {
        out.push_str(&format!("  Package URI:   {uri}\n"));
    }

    out.push_str("  Changelog:\n");
    for (locale, text) in config.changelog.iter() {
        out.push_str(&format!("    [{locale}] {}\n", text.trim()));
    }

    match config.unsupported_versions.as_deref() {
        Some(versions) if !versions.is_empty() => {
            out.push_str(&format!("  Unsupported:   {}\n", versions.join(", ")));
        }
        _ => out.push_str("  Unsupported:   none, all versions supported\n"),
    }

    if !config.update_requirements.is_empty() {
        out.push_str("  Requirements:\n");
        for (position, requirement) in config.update_requirements.iter().enumerate() {
            out.push_str(&format!("    {}. {requirement}\n", position + 1));
        }
    }

    if !config.operations.is_empty() {
        out.push_str("  Operations:\n");
        for (position, operation) in config.operations.iter().enumerate() {
            out.push_str(&format!("    {}. {}\n", position + 1, operation.summary()));
        }
    }
    out
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn validate(context: &Context, project_name: &str, version: &str) -> Result<(), AppError> {
    let set = context.load_packages(project_name)?;
    let version = parse_version("version", version)?;
    let config = set.find(&version).ok_or_else(|| {
        AppError::package_failed("find", format!("{version} is not part of {project_name}"))
    })?;

    config
        .validate()
        .map_err(|error| AppError::package_failed("validate", error))?;
    println!("Package {} is valid", version.description());
    Ok(())
}

async fn edit(context: &Context, args: &EditArgs) -> Result<(), AppError> {
    let _lock = context.lock_project(&args.project)?;
    let mut project = context.load_project(&args.project)?;
    let mut set = context.load_packages(&args.project)?;
    let version = parse_version("version", &args.version)?;

    let mut editor = PackageEditor::open(&set, &version)
        .map_err(|error| AppError::package_failed("open", error))?;
    apply_edits(editor.draft_mut(), args)?;
    let outcome = editor
        .save(&mut set, &mut project, &context.paths)
        .map_err(|error| AppError::package_failed("save", error))?;

    println!(
        "Saved package {}{}",
        outcome.new_version.description(),
        if outcome.renamed {
            format!(" (was {})", outcome.old_version.description())
        } else {
            String::new()
        }
    );

    if !outcome.needs_publish || args.no_publish {
        if outcome.needs_publish {
            println!("Package is released; run `package publish` to upload the change");
        }
        return project
            .save(&context.paths)
            .map_err(|error| AppError::project_failed("save", error));
    }

    let client = context.http_client()?;
    let transfer = create_transfer(&project.transfer, client, args.auth.password.clone());
    let result = republish(context, transfer.as_ref(), &outcome, &project).await;
    if result.is_err() {
        // The local edit stands even if the upload failed.
        project
            .save(&context.paths)
            .map_err(|error| AppError::project_failed("save", error))?;
    } else {
        println!("Configuration uploaded via {}", transfer.name());
    }
    result
}

async fn republish(
    context: &Context,
    transfer: &dyn Transfer,
    outcome: &SaveOutcome,
    project: &UpdateProject,
) -> Result<(), AppError> {
    let paths = &context.paths;
    Attempts::new(
        "Publish",
        &context.settings.retry_delays_secs,
        context.upload_timeout(),
    )
    .run(
        move || publish_configuration(transfer, outcome, paths, project),
        |error| AppError::publish_failed("uploading the configuration", error),
    )
    .await
}

async fn publish(
    context: &Context,
    project_name: &str,
    version: &str,
    password: Option<String>,
) -> Result<(), AppError> {
    let _lock = context.lock_project(project_name)?;
    let project = context.load_project(project_name)?;
    let set = context.load_packages(project_name)?;
    let version = parse_version("version", version)?;
    let config = set.find(&version).ok_or_else(|| {
        AppError::package_failed("find", format!("{version} is not part of {project_name}"))
    })?;
    config
        .validate()
        .map_err(|error| AppError::package_failed("validate", error))?;

    let client = context.http_client()?;
    let transfer = create_transfer(&project.transfer, client, password);
    let transfer_ref = transfer.as_ref();
    let paths = &context.paths;

    // Each attempt works on a fresh copy of the stored project.
    Attempts::new(
        "Publish",
        &context.settings.retry_delays_secs,
        context.upload_timeout(),
    )
    .run(
        || {
            let mut attempt = project.clone();
            async move { publish_package(transfer_ref, paths, &mut attempt, &version).await }
        },
        |error| AppError::publish_failed("publishing the package", error),
    )
    .await?;

    println!(
        "Published {} via {}",
        version.description(),
        transfer.name()
    );
    Ok(())
}

fn delete(context: &Context, project_name: &str, version: &str) -> Result<(), AppError> {
    let _lock = context.lock_project(project_name)?;
    let mut project = context.load_project(project_name)?;
    let mut set = context.load_packages(project_name)?;
    let version = parse_version("version", version)?;

    if project.entry(&version).is_some_and(|entry| entry.is_released) {
        log::warn!("Deleting released package {version}; remote files are left in place");
    }
    delete_package(&mut set, &mut project, &context.paths, &version)
        .map_err(|error| AppError::package_failed("delete", error))?;

    context.save_packages(project_name, &set)?;
    project
        .save(&context.paths)
        .map_err(|error| AppError::project_failed("save", error))?;
    println!("Deleted package {}", version.description());
    Ok(())
}

fn position(argument: &'static str, position: usize) -> Result<usize, AppError> {
    position
        .checked_sub(1)
        .ok_or_else(|| AppError::invalid_argument(argument, "positions start at 1"))
}

/// Positions in descending order, so removing one does not shift the rest.
fn removal_order(argument: &'static str, positions: &[usize]) -> Result<Vec<usize>, AppError> {
    let mut indices = positions
        .iter()
        .map(|&value| position(argument, value))
        .collect::<Result<Vec<_>, _>>()?;
    indices.sort_unstable_by(|a, b| b.cmp(a));
    indices.dedup();
    Ok(indices)
}

fn split_assignment<'a>(
    argument: &'static str,
    value: &'a str,
) -> Result<(&'a str, &'a str), AppError> {
    value
        .split_once('=')
        .ok_or_else(|| AppError::invalid_argument(argument, format!("expected KEY=VALUE, got \"{value}\"")))
}

fn parse_requirement(value: &str) -> Result<UpdateRequirement, AppError> {
    let invalid = || {
        AppError::invalid_argument(
            "--requirement",
            format!("\"{value}\" is neither a known OS nor a framework version"),
        )
    };
    let value = value.trim();

    if let Some(os) = value.strip_prefix("os:") {
        return os
            .trim()
            .parse::<RequirementVersion>()
            .ok()
            .map(UpdateRequirement::os)
            .or_else(|| UpdateRequirement::from_os_name(os))
            .ok_or_else(invalid);
    }
    if let Some(framework) = value.strip_prefix("framework:") {
        return parse_framework_label(framework)
            .map(UpdateRequirement::framework)
            .ok_or_else(invalid);
    }
    if value.starts_with(".NET") {
        return parse_framework_label(value)
            .map(UpdateRequirement::framework)
            .ok_or_else(invalid);
    }
    UpdateRequirement::from_os_name(value).ok_or_else(invalid)
}

fn read_changelog_file(argument: &'static str, path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|error| {
        AppError::invalid_argument(argument, format!("cannot read {}: {error}", path.display()))
    })
}

fn parse_operation(argument: &'static str, json: &str) -> Result<Operation, AppError> {
    serde_json::from_str(json).map_err(|error| AppError::invalid_argument(argument, error))
}

fn out_of_range(argument: &'static str, index: usize) -> AppError {
    AppError::invalid_argument(argument, format!("there is no entry at position {}", index + 1))
}

fn apply_edits(draft: &mut PackageDraft, args: &EditArgs) -> Result<(), AppError> {
    if let Some(new_version) = &args.new_version {
        draft.set_version(parse_version("--new-version", new_version)?);
    }

    for assignment in &args.changelogs {
        let (locale, text) = split_assignment("--changelog", assignment)?;
        let locale: Locale = locale
            .parse()
            .map_err(|error: packsmith_model::LocaleError| {
                AppError::invalid_argument("--changelog", error.to_string())
            })?;
        if !draft.set_changelog(locale.clone(), text) {
            log::debug!("Dropped empty changelog for {locale}");
        }
    }
    for assignment in &args.changelog_files {
        let (locale, path) = split_assignment("--changelog-file", assignment)?;
        let locale: Locale = locale
            .parse()
            .map_err(|error: packsmith_model::LocaleError| {
                AppError::invalid_argument("--changelog-file", error.to_string())
            })?;
        let text = read_changelog_file("--changelog-file", Path::new(path))?;
        if !draft.set_changelog(locale.clone(), text) {
            log::debug!("Dropped empty changelog for {locale}");
        }
    }
    for locale in &args.remove_changelogs {
        let locale: Locale = locale
            .parse()
            .map_err(|error: packsmith_model::LocaleError| {
                AppError::invalid_argument("--remove-changelog", error.to_string())
            })?;
        if locale.is_english() {
            return Err(AppError::invalid_argument(
                "--remove-changelog",
                "the English changelog cannot be removed",
            ));
        }
        draft.remove_changelog(&locale);
    }

    if let Some(description) = &args.description {
        draft.set_description(description.clone());
    }
    if let Some(necessary) = args.necessary {
        draft.set_necessary_update(necessary);
    }
    if let Some(statistics) = args.statistics {
        draft.set_use_statistics(statistics);
    }
    if let Some(architecture) = &args.architecture {
        let architecture = Architecture::from_name(architecture).ok_or_else(|| {
            AppError::invalid_argument(
                "--architecture",
                format!("\"{architecture}\" is not x86, x64 or AnyCPU"),
            )
        })?;
        draft.set_architecture(architecture);
    }

    for index in removal_order("--remove-unsupported", &args.remove_unsupported)? {
        draft
            .remove_unsupported_version(index)
            .ok_or_else(|| out_of_range("--remove-unsupported", index))?;
    }
    for literal in &args.unsupported {
        let version = parse_version("--unsupported", literal)?;
        draft
            .add_unsupported_version(version)
            .map_err(|error| AppError::invalid_argument("--unsupported", error))?;
    }
    if args.all_supported {
        draft.set_all_versions_supported(true);
    }

    for index in removal_order("--remove-operation", &args.remove_operations)? {
        draft
            .remove_operation(index)
            .ok_or_else(|| out_of_range("--remove-operation", index))?;
    }
    for assignment in &args.replace_operations {
        let (target, json) = split_assignment("--replace-operation", assignment)?;
        let index = target
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_argument("--replace-operation", "invalid position"))
            .and_then(|value| position("--replace-operation", value))?;
        let operation = parse_operation("--replace-operation", json)?;
        draft
            .replace_operation(index, operation)
            .map_err(|_| out_of_range("--replace-operation", index))?;
    }
    for json in &args.operations {
        draft.push_operation(parse_operation("--operation", json)?);
    }
    for tag in &args.operation_templates {
        let kind = OperationKind::from_tag(tag.trim()).ok_or_else(|| {
            AppError::invalid_argument(
                "--operation-template",
                format!("unknown operation kind \"{tag}\""),
            )
        })?;
        draft.add_operation(kind);
    }
    for &value in &args.move_up {
        let index = position("--move-up", value)?;
        if !draft.move_operation_up(index) {
            log::debug!("Operation {value} is already first or does not exist");
        }
    }
    for &value in &args.move_down {
        let index = position("--move-down", value)?;
        if !draft.move_operation_down(index) {
            log::debug!("Operation {value} is already last or does not exist");
        }
    }

    for index in removal_order("--remove-requirement", &args.remove_requirements)? {
        draft
            .remove_requirement(index)
            .ok_or_else(|| out_of_range("--remove-requirement", index))?;
    }
    for assignment in &args.replace_requirements {
        let (target, value) = split_assignment("--replace-requirement", assignment)?;
        let index = target
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_argument("--replace-requirement", "invalid position"))
            .and_then(|value| position("--replace-requirement", value))?;
        draft
            .replace_requirement(index, parse_requirement(value)?)
            .map_err(|_| out_of_range("--replace-requirement", index))?;
    }
    for value in &args.requirements {
        if !draft.add_requirement(parse_requirement(value)?) {
            log::debug!("Requirement {value} is already listed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use packsmith_core::{PackageStore, TransferSettings};
    use packsmith_model::{Changelog, PackageSet, RequirementKind};
    use packsmith_platform::AppPaths;

    use super::*;
    use crate::settings::AppSettings;

    fn draft() -> PackageDraft {
        let version = UpdateVersion::new(1, 0, 0, 0);
        let set = PackageSet::from(vec![PackageConfiguration::new(
            version,
            Changelog::new("Initial release"),
        )]);
        PackageEditor::open(&set, &version)
            .expect("editor should open")
            .draft()
            .clone()
    }

    fn args() -> EditArgs {
        EditArgs {
            project: "Example".to_string(),
            version: "1.0".to_string(),
            ..EditArgs::default()
        }
    }

    #[test]
    fn requirement_arguments_resolve_catalog_names() {
        let os = parse_requirement("os:Windows 7 Service Pack 1").expect("os name should parse");
        assert_eq!(os.kind, RequirementKind::OsVersion);
        assert_eq!(os.version, RequirementVersion::new(6, 1, 7601, 0));

        let raw = parse_requirement("os:10.0").expect("os version should parse");
        assert_eq!(raw.version, RequirementVersion::new(10, 0, 0, 0));

        let framework =
            parse_requirement(".NET Framework 4.7.2").expect("framework label should parse");
        assert_eq!(framework.kind, RequirementKind::DotNetFramework);
        assert_eq!(framework.version, RequirementVersion::short(4, 7, 2));

        assert!(parse_requirement("os:Windows 95").is_err());
    }

    #[test]
    fn edits_apply_changelogs_operations_and_requirements() {
        let mut draft = draft();
        let args = EditArgs {
            changelogs: vec!["de-de=Neu".to_string(), "en=Updated".to_string()],
            operations: vec![
                r#"{"Area":"Services","Method":"Stop","Value":"Spooler","Value2":null}"#
                    .to_string(),
            ],
            operation_templates: vec!["StartService".to_string()],
            move_up: vec![2],
            requirements: vec!["framework:4.8".to_string()],
            architecture: Some("x64".to_string()),
            ..args()
        };

        apply_edits(&mut draft, &args).expect("edits should apply");

        assert_eq!(draft.changelog().english(), "Updated");
        assert_eq!(
            draft
                .changelog()
                .get(&"de-DE".parse().expect("locale should parse")),
            Some("Neu")
        );
        let kinds: Vec<_> = draft.operations().iter().map(Operation::kind).collect();
        assert_eq!(
            kinds,
            vec![OperationKind::StartService, OperationKind::StopService]
        );
        assert_eq!(draft.requirements().len(), 1);
        assert_eq!(draft.architecture(), Architecture::X64);
    }

    #[test]
    fn changelog_files_are_read_into_their_locale() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let notes = temp_dir.path().join("fr.txt");
        std::fs::write(&notes, "Corrections\n- plantage au démarrage\n")
            .expect("notes should be written");
        let mut draft = draft();
        let args = EditArgs {
            changelog_files: vec![format!("fr={}", notes.display())],
            ..args()
        };

        apply_edits(&mut draft, &args).expect("edits should apply");

        assert_eq!(
            draft
                .changelog()
                .get(&"fr".parse().expect("locale should parse")),
            Some("Corrections\n- plantage au démarrage\n")
        );
    }

    #[test]
    fn unreadable_changelog_file_is_an_argument_error() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let mut draft = draft();
        let args = EditArgs {
            changelog_files: vec![format!(
                "en={}",
                temp_dir.path().join("absent.txt").display()
            )],
            ..args()
        };

        let error = apply_edits(&mut draft, &args).expect_err("edit should fail");

        assert!(matches!(
            error,
            AppError::InvalidArgument {
                argument: "--changelog-file",
                ..
            }
        ));
        assert_eq!(draft.changelog().english(), "Initial release");
    }

    #[test]
    fn removing_english_changelog_is_refused() {
        let mut draft = draft();
        let args = EditArgs {
            remove_changelogs: vec!["en".to_string()],
            ..args()
        };

        let error = apply_edits(&mut draft, &args).expect_err("edit should fail");

        assert!(matches!(
            error,
            AppError::InvalidArgument {
                argument: "--remove-changelog",
                ..
            }
        ));
    }

    #[test]
    fn zero_positions_and_missing_entries_are_errors() {
        let mut draft = draft();
        let zero = EditArgs {
            remove_operations: vec![0],
            ..args()
        };
        assert!(apply_edits(&mut draft, &zero).is_err());

        let missing = EditArgs {
            remove_requirements: vec![3],
            ..args()
        };
        assert!(apply_edits(&mut draft, &missing).is_err());
    }

    #[test]
    fn unsupported_zero_version_is_rejected() {
        let mut draft = draft();
        let args = EditArgs {
            unsupported: vec!["0.0.0.0".to_string()],
            ..args()
        };

        let error = apply_edits(&mut draft, &args).expect_err("edit should fail");

        assert!(matches!(
            error,
            AppError::InvalidArgument {
                argument: "--unsupported",
                ..
            }
        ));
    }

    #[test]
    fn removal_order_is_descending_and_unique() {
        assert_eq!(
            removal_order("--remove-operation", &[1, 3, 3, 2]).expect("positions are valid"),
            vec![2, 1, 0]
        );
    }

    #[tokio::test]
    async fn edit_without_publish_saves_project_and_set() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let context = Context {
            paths: AppPaths::with_root(temp_dir.path()),
            settings: AppSettings::default(),
        };
        let mut project = UpdateProject::create(
            &context.paths,
            "Example",
            "https://updates.example.com",
            TransferSettings::Local {
                root: temp_dir.path().join("remote"),
            },
            false,
        )
        .expect("project should be created");
        let store = PackageStore::for_project(&context.paths, "Example");
        let mut set = PackageSet::new();
        create_package(
            &mut set,
            &mut project,
            &context.paths,
            UpdateVersion::new(1, 0, 0, 0),
            "Initial release",
            "",
        )
        .expect("package should be created");
        store.save(&set).expect("set should be saved");
        project.save(&context.paths).expect("project should be saved");

        let args = EditArgs {
            new_version: Some("1.0.1".to_string()),
            description: Some("Patch".to_string()),
            ..args()
        };
        edit(&context, &args).await.expect("edit should succeed");

        let stored = store.load().expect("set should load");
        assert!(stored.contains_version(&UpdateVersion::new(1, 0, 1, 0)));
        let reloaded = context.load_project("Example").expect("project should load");
        let entry = reloaded
            .entry(&UpdateVersion::new(1, 0, 1, 0))
            .expect("renamed entry should exist");
        assert_eq!(entry.description, "Patch");
    }
}
