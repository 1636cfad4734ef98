//! Account commands.
//!
//! Passwords are read from `MEDICART_PASSWORD` when not given as a flag.

use medicart_client::AppContext;
use medicart_client::auth::Registration;
use medicart_core::UserProfile;

use super::CliError;

fn signed_in(user: &UserProfile) -> String {
    format!("Signed in as {} <{}>", user.name, user.email)
}

pub async fn login(ctx: &mut AppContext, email: &str, password: &str) -> Result<String, CliError> {
    let user = ctx.auth_mut().login(email, password).await?;
    Ok(signed_in(user))
}

pub async fn register(
    ctx: &mut AppContext,
    name: &str,
    email: &str,
    password: &str,
    confirm_password: Option<&str>,
) -> Result<String, CliError> {
    let form = Registration {
        name,
        email,
        password,
        confirm_password: confirm_password.unwrap_or(password),
    };
    let user = ctx.auth_mut().register(&form).await?;
    Ok(signed_in(user))
}

pub fn logout(ctx: &mut AppContext) -> String {
    if ctx.auth().is_authenticated() {
        ctx.auth_mut().logout();
        "Signed out.".to_string()
    } else {
        "Not signed in.".to_string()
    }
}

pub fn whoami(ctx: &AppContext) -> String {
    ctx.auth()
        .current_user()
        .map_or_else(|| "Not signed in.".to_string(), signed_in)
}
