use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "packsmith")]
#[command(version)]
#[command(about = "Author and publish update packages", long_about = None)]
pub struct Cli {
    /// Keep settings and projects below this directory
    #[arg(long, global = true, env = packsmith_platform::DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging for this run
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage update projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Create, edit and publish packages of a project
    Package {
        #[command(subcommand)]
        command: PackageCommands,
    },
    /// List supported operations and requirement values
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Send feedback to the developers
    Feedback(FeedbackArgs),
    /// Show or change application settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a new project
    Init {
        name: String,
        /// Base URI clients download updates from
        #[arg(long)]
        update_uri: String,
        /// Publish by copying into this directory
        #[arg(long, conflicts_with = "http_url")]
        local_root: Option<PathBuf>,
        /// Publish to this WebDAV/HTTP base URL
        #[arg(long)]
        http_url: Option<String>,
        /// User name for the HTTP transfer
        #[arg(long, requires = "http_url")]
        username: Option<String>,
        /// Allow packages to report statistics
        #[arg(long)]
        statistics: bool,
    },
    /// Show a project and its packages
    Show { name: String },
    /// List all projects
    List,
}

#[derive(Subcommand, Debug)]
pub enum PackageCommands {
    /// Add a new, unreleased package
    Create {
        project: String,
        version: String,
        /// English changelog
        #[arg(long, required_unless_present = "changelog_file")]
        changelog: Option<String>,
        /// Read the English changelog from a text file
        #[arg(long, value_name = "PATH", conflicts_with = "changelog")]
        changelog_file: Option<PathBuf>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Print the stored configuration
    Show {
        project: String,
        version: String,
        /// Print the raw JSON entry
        #[arg(long)]
        json: bool,
    },
    /// Edit a package. Changes are applied in the order the options are
    /// listed here, then validated and saved.
    Edit(EditArgs),
    /// Validate a stored package configuration
    Validate { project: String, version: String },
    /// Upload a package and mark it released
    Publish {
        project: String,
        version: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Remove a package and its local directory
    Delete { project: String, version: String },
}

#[derive(Args, Debug, Default)]
pub struct AuthArgs {
    /// Password for the HTTP transfer
    #[arg(long, env = "PACKSMITH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct EditArgs {
    pub project: String,
    pub version: String,

    /// Change the package version
    #[arg(long)]
    pub new_version: Option<String>,
    /// Set a changelog, as LOCALE=TEXT
    #[arg(long = "changelog", value_name = "LOCALE=TEXT")]
    pub changelogs: Vec<String>,
    /// Set a changelog from a text file, as LOCALE=PATH
    #[arg(long = "changelog-file", value_name = "LOCALE=PATH")]
    pub changelog_files: Vec<String>,
    /// Remove a translated changelog
    #[arg(long = "remove-changelog", value_name = "LOCALE")]
    pub remove_changelogs: Vec<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Mark the update as mandatory
    #[arg(long)]
    pub necessary: Option<bool>,
    /// Report statistics (only if the project allows it)
    #[arg(long)]
    pub statistics: Option<bool>,
    /// x86, x64 or AnyCPU
    #[arg(long)]
    pub architecture: Option<String>,

    /// Remove an unsupported version by its position (1-based)
    #[arg(long = "remove-unsupported", value_name = "POSITION")]
    pub remove_unsupported: Vec<usize>,
    /// Add a client version that must not receive this package
    #[arg(long = "unsupported", value_name = "VERSION")]
    pub unsupported: Vec<String>,
    /// Offer the package to every client version
    #[arg(long)]
    pub all_supported: bool,

    /// Remove an operation by its position (1-based)
    #[arg(long = "remove-operation", value_name = "POSITION")]
    pub remove_operations: Vec<usize>,
    /// Replace an operation, as POSITION=JSON
    #[arg(long = "replace-operation", value_name = "POSITION=JSON")]
    pub replace_operations: Vec<String>,
    /// Append an operation given as JSON ({"Area", "Method", "Value", "Value2"})
    #[arg(long = "operation", value_name = "JSON")]
    pub operations: Vec<String>,
    /// Append the empty template of an operation kind, for example DeleteFile
    #[arg(long = "operation-template", value_name = "KIND")]
    pub operation_templates: Vec<String>,
    /// Move an operation one position up
    #[arg(long = "move-up", value_name = "POSITION")]
    pub move_up: Vec<usize>,
    /// Move an operation one position down
    #[arg(long = "move-down", value_name = "POSITION")]
    pub move_down: Vec<usize>,

    /// Remove a requirement by its position (1-based)
    #[arg(long = "remove-requirement", value_name = "POSITION")]
    pub remove_requirements: Vec<usize>,
    /// Replace a requirement, as POSITION=REQUIREMENT
    #[arg(long = "replace-requirement", value_name = "POSITION=REQUIREMENT")]
    pub replace_requirements: Vec<String>,
    /// Add a requirement: os:<name or version> or framework:<version>
    #[arg(long = "requirement", value_name = "REQUIREMENT")]
    pub requirements: Vec<String>,

    /// Save locally without re-publishing a released package
    #[arg(long)]
    pub no_publish: bool,
    #[command(flatten)]
    pub auth: AuthArgs,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List operation kinds
    Operations,
    /// List known operating system versions
    Os,
    /// List known .NET Framework versions
    Frameworks,
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    /// Message text
    pub content: String,
    /// Override the configured feedback endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,
    /// Turn persistent debug logging on or off
    SetDebug {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Set the URL feedback is sent to
    SetFeedbackEndpoint { url: String },
}
