//! `pt login`: exchange credentials for a session and persist it.

use std::io::BufRead;

use clap::Args;
use petitions_core::api::Credentials;
use petitions_core::error::ErrorCode;
use petitions_core::session::SessionError;
use petitions_core::validate;
use serde::Serialize;

use crate::context::Context;
use crate::output::{CliError, fail, render};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email.
    #[arg(long)]
    pub email: String,

    /// Account password.
    #[arg(long, env = "PETITIONS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read the password from the first line of stdin.
    #[arg(long, conflicts_with = "password")]
    pub password_stdin: bool,
}

#[derive(Debug, Serialize)]
struct LoginReport<'a> {
    user: &'a petitions_core::model::user::User,
    api_url: &'a str,
}

fn read_password_line(input: &mut dyn BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn run_login(args: &LoginArgs, ctx: &Context) -> anyhow::Result<()> {
    let password = if args.password_stdin {
        read_password_line(&mut std::io::stdin().lock())?
    } else {
        args.password.clone().unwrap_or_default()
    };

    let email = match validate::required("email", &args.email) {
        Ok(email) => email.to_string(),
        Err(e) => return fail(ctx.output, &CliError::from_code(e.code(), e.to_string())),
    };
    if password.is_empty() {
        return fail(
            ctx.output,
            &CliError::with_details(
                "password must not be empty",
                "pass --password, set PETITIONS_PASSWORD, or use --password-stdin",
                ErrorCode::InvalidField.code(),
            ),
        );
    }

    let api = ctx.anonymous_api();
    let session = match ctx.store.login(&api, &Credentials { email, password }) {
        Ok(session) => session,
        Err(SessionError::Login(e)) => {
            return fail(
                ctx.output,
                &CliError::from_code(e.code(), e.user_message("Login failed")),
            );
        }
        Err(e) => return fail(ctx.output, &CliError::from_code(e.code(), e.to_string())),
    };

    let report = LoginReport {
        user: &session.user,
        api_url: &ctx.config.api_url,
    };
    render(ctx.output, &report, |r, w| {
        writeln!(w, "Signed in as {} ({})", r.user.first_name, r.user.role)
    })
}
