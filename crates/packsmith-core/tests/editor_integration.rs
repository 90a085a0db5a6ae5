use packsmith_core::{
    EditorError, PackageEditor, PackageStore, TransferSettings, UpdateProject, create_package,
    delete_package,
};
use packsmith_model::{
    Operation, OperationKind, PackageSet, RequirementVersion, UpdateRequirement, UpdateVersion,
    ValidationError,
};
use packsmith_platform::AppPaths;
use tempfile::tempdir;

fn version(literal: &str) -> UpdateVersion {
    literal.parse().expect("version should parse")
}

fn setup(paths: &AppPaths) -> (UpdateProject, PackageSet) {
    let mut project = UpdateProject::create(
        paths,
        "Example",
        "https://updates.example.com/example",
        TransferSettings::Local {
            root: paths.data_dir.join("remote"),
        },
        false,
    )
    .expect("create project");
    let store = PackageStore::for_project(paths, "Example");
    let mut set = store.load().expect("load empty set");

    create_package(
        &mut set,
        &mut project,
        paths,
        version("1.0"),
        "Initial release",
        "First public build",
    )
    .expect("create package");
    store.save(&set).expect("save set");
    project.save(paths).expect("save project");
    (project, set)
}

#[test]
fn version_change_moves_directory_and_updates_project_entry() {
    let temp_dir = tempdir().expect("create temp dir");
    let paths = AppPaths::with_root(temp_dir.path());
    let (mut project, mut set) = setup(&paths);
    std::fs::write(
        paths.package_dir("Example", "1.0.0.0").join("payload.zip"),
        b"zip",
    )
    .expect("write payload");

    let mut editor = PackageEditor::open(&set, &version("1.0")).expect("open editor");
    let draft = editor.draft_mut();
    draft.set_version(version("1.1b1"));
    draft.set_description("Beta of the next release");
    draft.push_operation(Operation::DeleteFile {
        directory: "%program%".to_string(),
        files: vec!["obsolete.dll".to_string()],
    });
    draft.add_requirement(UpdateRequirement::os(RequirementVersion::new(6, 1, 7601, 0)));

    let outcome = editor
        .save(&mut set, &mut project, &paths)
        .expect("save package");
    project.save(&paths).expect("save project");

    assert!(outcome.renamed);
    assert!(!outcome.needs_publish);
    assert_eq!(outcome.new_version, version("1.1b1"));
    assert!(!paths.package_dir("Example", "1.0.0.0").exists());
    assert!(
        paths
            .package_dir("Example", "1.1.0.0b1")
            .join("payload.zip")
            .is_file()
    );

    let stored = PackageStore::for_project(&paths, "Example")
        .load()
        .expect("reload set");
    let config = stored.find(&version("1.1b1")).expect("renamed package");
    assert_eq!(config.operations.len(), 1);
    assert_eq!(config.update_requirements.len(), 1);
    assert_eq!(
        config.update_package_uri.as_deref(),
        Some(format!("https://updates.example.com/example/1.1.0.0b1/{}.zip", project.guid).as_str())
    );

    let reloaded = UpdateProject::load(&paths, "Example").expect("reload project");
    let entry = reloaded.entry(&version("1.1b1")).expect("project entry");
    assert_eq!(entry.description, "Beta of the next release");
    assert!(reloaded.entry(&version("1.0")).is_none());
}

#[test]
fn failed_validation_leaves_files_untouched() {
    let temp_dir = tempdir().expect("create temp dir");
    let paths = AppPaths::with_root(temp_dir.path());
    let (mut project, mut set) = setup(&paths);
    let before = std::fs::read_to_string(paths.package_config_file("Example"))
        .expect("read configuration");

    let mut editor = PackageEditor::open(&set, &version("1.0")).expect("open editor");
    editor.draft_mut().set_version(version("2.0"));
    editor.draft_mut().add_operation(OperationKind::RenameFile);

    let result = editor.save(&mut set, &mut project, &paths);

    assert!(matches!(
        result,
        Err(EditorError::Validation(ValidationError::InvalidOperation {
            index: 0,
            ..
        }))
    ));
    assert!(paths.package_dir("Example", "1.0.0.0").is_dir());
    assert!(!paths.package_dir("Example", "2.0.0.0").exists());
    let after = std::fs::read_to_string(paths.package_config_file("Example"))
        .expect("read configuration");
    assert_eq!(before, after);
}

#[test]
fn duplicate_package_cannot_be_created() {
    let temp_dir = tempdir().expect("create temp dir");
    let paths = AppPaths::with_root(temp_dir.path());
    let (mut project, mut set) = setup(&paths);

    let result = create_package(
        &mut set,
        &mut project,
        &paths,
        version("1.0.0.0"),
        "Again",
        "",
    );

    assert!(matches!(
        result,
        Err(EditorError::Validation(ValidationError::DuplicateVersion { .. }))
    ));
    assert_eq!(set.len(), 1);
}

#[test]
fn delete_removes_configuration_entry_and_directory() {
    let temp_dir = tempdir().expect("create temp dir");
    let paths = AppPaths::with_root(temp_dir.path());
    let (mut project, mut set) = setup(&paths);

    let removed =
        delete_package(&mut set, &mut project, &paths, &version("1.0")).expect("delete package");

    assert_eq!(removed.literal_version, "1.0.0.0");
    assert!(set.is_empty());
    assert!(project.packages.is_empty());
    assert!(!paths.package_dir("Example", "1.0.0.0").exists());
    assert!(matches!(
        PackageEditor::open(&set, &version("1.0")),
        Err(EditorError::EmptyConfiguration)
    ));
}

#[test]
fn failed_store_write_reverts_directory_move() {
    let temp_dir = tempdir().expect("create temp dir");
    let paths = AppPaths::with_root(temp_dir.path());
    let (mut project, mut set) = setup(&paths);
    let config_file = paths.package_config_file("Example");
    std::fs::remove_file(&config_file).expect("remove configuration");
    std::fs::create_dir(&config_file).expect("block configuration path");
    let set_before = set.clone();

    let mut editor = PackageEditor::open(&set, &version("1.0")).expect("open editor");
    editor.draft_mut().set_version(version("1.1"));
    let result = editor.save(&mut set, &mut project, &paths);

    assert!(matches!(result, Err(EditorError::Store(_))));
    assert!(paths.package_dir("Example", "1.0.0.0").is_dir());
    assert!(!paths.package_dir("Example", "1.1.0.0").exists());
    assert_eq!(set, set_before);
    assert!(project.entry(&version("1.0")).is_some());
    assert!(project.entry(&version("1.1")).is_none());

    std::fs::remove_dir(&config_file).expect("unblock configuration path");
    let mut editor = PackageEditor::open(&set, &version("1.0")).expect("open editor");
    editor.draft_mut().set_version(version("1.1"));
    let outcome = editor
        .save(&mut set, &mut project, &paths)
        .expect("retried save should succeed");

    assert!(outcome.renamed);
    assert!(paths.package_dir("Example", "1.1.0.0").is_dir());
}

#[test]
fn failed_store_write_removes_created_directory() {
    let temp_dir = tempdir().expect("create temp dir");
    let paths = AppPaths::with_root(temp_dir.path());
    let (mut project, mut set) = setup(&paths);
    std::fs::remove_dir(paths.package_dir("Example", "1.0.0.0")).expect("remove package dir");
    let config_file = paths.package_config_file("Example");
    std::fs::remove_file(&config_file).expect("remove configuration");
    std::fs::create_dir(&config_file).expect("block configuration path");

    let mut editor = PackageEditor::open(&set, &version("1.0")).expect("open editor");
    editor.draft_mut().set_version(version("1.2"));
    let result = editor.save(&mut set, &mut project, &paths);

    assert!(matches!(result, Err(EditorError::Store(_))));
    assert!(!paths.package_dir("Example", "1.2.0.0").exists());
}

#[test]
fn occupied_target_directory_changes_nothing() {
    let temp_dir = tempdir().expect("create temp dir");
    let paths = AppPaths::with_root(temp_dir.path());
    let (mut project, mut set) = setup(&paths);
    std::fs::create_dir_all(paths.package_dir("Example", "1.1.0.0")).expect("occupy target");
    let before = std::fs::read_to_string(paths.package_config_file("Example"))
        .expect("read configuration");
    let set_before = set.clone();

    let mut editor = PackageEditor::open(&set, &version("1.0")).expect("open editor");
    editor.draft_mut().set_version(version("1.1"));
    let result = editor.save(&mut set, &mut project, &paths);

    assert!(matches!(result, Err(EditorError::DirectoryExists { .. })));
    assert!(paths.package_dir("Example", "1.0.0.0").is_dir());
    assert_eq!(set, set_before);
    assert!(project.entry(&version("1.0")).is_some());
    let after = std::fs::read_to_string(paths.package_config_file("Example"))
        .expect("read configuration");
    assert_eq!(before, after);
}
