//! Concrete [`Transfer`] providers and the selection helper used by the CLI.

mod http;
mod local;

pub use http::{Credentials, HttpTransfer};
pub use local::LocalTransfer;

use packsmith_core::TransferSettings;
use packsmith_model::Transfer;

/// Builds the provider configured for a project. `password` is only used by
/// HTTP transfers that name a user.
#[must_use]
pub fn create_transfer(
    settings: &TransferSettings,
    client: reqwest::Client,
    password: Option<String>,
) -> Box<dyn Transfer> {
    match settings {
        TransferSettings::Local { root } => Box::new(LocalTransfer::new(root.clone())),
        TransferSettings::Http { base_url, username } => {
            let credentials = username.as_ref().map(|username| Credentials {
                username: username.clone(),
                password,
            });
            Box::new(HttpTransfer::new(client, base_url.clone(), credentials))
        }
    }
}
