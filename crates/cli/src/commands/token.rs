//! Multipass token commands.
//!
//! # Environment Variables
//!
//! - `MULTIPASS_SECRET` - Shared Multipass secret
//! - `SHOPIFY_CUSTOM_DOMAIN` / `SHOPIFY_STORE` - Storefront domain

use std::io::Write;

use rep_portal::config::MultipassConfig;
use rep_portal::multipass::{IdentityClaim, MultipassIssuer};
use rep_portal_core::Email;

use super::CommandError;

/// Path segment that precedes the token in a sign-in URL.
const LOGIN_PATH: &str = "/account/login/multipass/";

fn issuer() -> Result<MultipassIssuer, CommandError> {
    dotenvy::dotenv().ok();
    Ok(MultipassIssuer::new(&MultipassConfig::from_env()?))
}

/// Issue a token for `email` and print the sign-in URL.
pub fn issue(email: &str, return_to: Option<&str>) -> Result<(), CommandError> {
    let issuer = issuer()?;

    let mut claim = IdentityClaim::new(Email::parse(email)?);
    if let Some(path) = return_to {
        claim = claim.with_return_to(path)?;
    }

    let token = issuer.issue(claim)?;
    tracing::info!(storefront = issuer.storefront_domain(), "Issued Multipass token");

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", issuer.login_url(&token))?;
    Ok(())
}

/// Verify a token (or sign-in URL) and print its claim as JSON.
pub fn inspect(token: &str) -> Result<(), CommandError> {
    let issuer = issuer()?;

    let claim = issuer.decode(strip_login_url(token))?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string_pretty(&claim)?)?;
    Ok(())
}

/// Accept either a bare token or a full sign-in URL.
fn strip_login_url(input: &str) -> &str {
    let input = input.trim();
    input
        .rsplit_once(LOGIN_PATH)
        .map_or(input, |(_, token)| token)
}
