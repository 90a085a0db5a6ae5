use super::Context;
use crate::cli::SettingsCommands;
use crate::error::AppError;

pub fn run(context: &Context, command: SettingsCommands) -> Result<(), AppError> {
    match command {
        SettingsCommands::Show => {
            let content = serde_json::to_string_pretty(&context.settings)
                .map_err(|error| AppError::message(error.to_string()))?;
            println!("{content}");
            println!("Stored at {}", context.paths.settings_file().display());
            Ok(())
        }
        SettingsCommands::SetDebug { enabled } => {
            let mut settings = context.settings.clone();
            settings.debug_logging = enabled;
            settings
                .save(&context.paths)
                .map_err(AppError::settings_save_failed)?;
            println!(
                "Debug logging {}",
                if enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
        SettingsCommands::SetFeedbackEndpoint { url } => {
            if reqwest::Url::parse(&url).is_err() {
                return Err(AppError::invalid_argument("url", format!("\"{url}\" is not a URL")));
            }
            let mut settings = context.settings.clone();
            settings.feedback_endpoint = Some(url);
            settings
                .save(&context.paths)
                .map_err(AppError::settings_save_failed)?;
            println!("Feedback endpoint saved");
            Ok(())
        }
    }
}
