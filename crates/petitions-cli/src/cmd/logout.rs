//! `pt logout`: remove the persisted session.


use serde::Serialize;

use crate::context::Context;
use crate::output::{CliError, fail, render};

#[derive(Debug, Serialize)]
struct LogoutReport {
    signed_out: bool,
}

pub fn run_logout(ctx: &Context) -> anyhow::Result<()> {
    let signed_out = match ctx.store.logout() {
        Ok(removed) => removed,
        Err(e) => return fail(ctx.output, &CliError::from_code(e.code(), e.to_string())),
    };
    render(ctx.output, &LogoutReport { signed_out }, |r, w| {
        if r.signed_out {
            writeln!(w, "Signed out")
        } else {
            writeln!(w, "No active session")
        }
    })
}
