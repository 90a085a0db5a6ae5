use packsmith_core::{FeedbackMessage, send_feedback};

use super::Context;
use crate::async_helpers::with_deadline;
use crate::cli::FeedbackArgs;
use crate::error::AppError;

pub async fn run(context: &Context, args: FeedbackArgs) -> Result<(), AppError> {
    let Some(endpoint) = args
        .endpoint
        .or_else(|| context.settings.feedback_endpoint.clone())
    else {
        return Err(AppError::invalid_argument(
            "endpoint",
            "no feedback endpoint configured, pass --endpoint or run `settings set-feedback-endpoint`",
        ));
    };

    let message = FeedbackMessage {
        name: args.name,
        email: args.email,
        content: args.content,
    };
    message.validate().map_err(AppError::feedback_failed)?;

    let client = context.http_client()?;
    with_deadline(
        std::time::Duration::from_secs(context.settings.http_timeout_secs),
        "Feedback",
        send_feedback(&client, &endpoint, &message),
        AppError::feedback_failed,
    )
    .await?;

    println!("Feedback sent. Thank you!");
    Ok(())
}
