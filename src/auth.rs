//! Session boundary: login and the bearer credential
//!
//! The client never manages login state beyond this file. Login happens once
//! before the TUI starts; the resulting [`Credential`] is passed explicitly
//! into every authenticated request. When the server later rejects it, the
//! controller emits [`SessionEvent::Expired`] and the main loop shuts the
//! session down; nothing here is retried or refreshed.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Bearer token issued by `POST /api/login`.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log the token itself.
        f.write_str("Credential(***)")
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionUser {
    pub username: String,
    #[allow(dead_code)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: SessionUser,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Events the controller pushes to the session manager.
#[derive(Debug)]
pub enum SessionEvent {
    /// The server rejected the credential mid-session. Forces
    /// re-authentication; stored credentials are not cleared here.
    Expired,
}

pub async fn login(
    http: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<(Credential, SessionUser)> {
    tracing::info!(username, "logging in");

    let response = http
        .post(format!("{base_url}/api/login"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .context("login request failed")?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        bail!("invalid username/email or password");
    }
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("login failed with status {status}"));
        bail!(message);
    }

    let body: LoginResponse = response.json().await.context("malformed login response")?;
    tracing::info!(username = %body.user.username, "login successful");
    Ok((Credential::new(body.token), body.user))
}

/// Ask for the password on the terminal, before raw mode is enabled.
pub fn prompt_password(username: &str) -> Result<String> {
    print!("Password for {username}: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
