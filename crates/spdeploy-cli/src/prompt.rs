//! Credential prompts.
//!
//! Fills in a missing username or password before validation when the
//! terminal is interactive. Uses dialoguer for terminal UI prompts.

use anyhow::Result;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use spdeploy_core::config::DeployOptions;

/// Which credentials still need asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissingCredentials {
    pub username: bool,
    pub password: bool,
}

impl MissingCredentials {
    pub fn of(options: &DeployOptions) -> Self {
        Self {
            username: is_blank(options.username.as_deref()),
            password: options.password.as_deref().is_none_or(str::is_empty),
        }
    }

    pub fn any(&self) -> bool {
        self.username || self.password
    }
}

/// Prompts for whatever [`MissingCredentials`] reports.
pub struct CredentialPrompt {
    theme: ColorfulTheme,
}

impl CredentialPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    pub fn complete(&self, options: DeployOptions) -> Result<DeployOptions> {
        let missing = MissingCredentials::of(&options);
        let mut options = options;

        if missing.username {
            let username: String = Input::with_theme(&self.theme)
                .with_prompt("Username")
                .interact_text()?;
            options = options.with_username(username);
        }

        if missing.password {
            let prompt = match options.username.as_deref() {
                Some(user) => format!("Password for {}", user.trim()),
                None => "Password".to_string(),
            };
            let password = Password::with_theme(&self.theme)
                .with_prompt(prompt)
                .interact()?;
            options = options.with_password(password);
        }

        Ok(options)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
