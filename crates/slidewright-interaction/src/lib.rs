//! Interaction layer for Slidewright: the Slides REST client and the
//! credential providers that authorize it.

pub mod env_token_provider;
pub mod oauth_authorizer;
pub mod slides_api_client;

pub use env_token_provider::EnvTokenProvider;
pub use oauth_authorizer::{ConsentPrompt, OAuthAuthorizer, StdioConsentPrompt};
pub use slides_api_client::SlidesApiClient;
