//! `pt routes`: the route table and what the guard decides for the current
//! session.


use clap::Args;
use petitions_core::error::ErrorCode;
use petitions_core::guard::{self, GuardDecision, Route};
use petitions_core::session::SessionState;
use serde::Serialize;

use crate::context::Context;
use crate::output::{CliError, OutputMode, fail, pretty_section, render};

#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// Check a single path instead of listing the table (e.g. /petitions/create).
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
struct RouteEntry {
    path: String,
    access: String,
    decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

fn table() -> Vec<Route> {
    vec![
        Route::Login,
        Route::Register,
        Route::Home,
        Route::Dashboard,
        Route::Petitions,
        Route::CreatePetition,
        Route::PetitionDetail(":id".to_string()),
        Route::Profile,
    ]
}

fn access(route: &Route) -> String {
    if route.is_public() {
        return "public".to_string();
    }
    route.required_roles().map_or_else(
        || "signed in".to_string(),
        |roles| {
            roles
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(",")
        },
    )
}

const fn decision_name(decision: &GuardDecision) -> &'static str {
    match decision {
        GuardDecision::Loading => "loading",
        GuardDecision::Render => "render",
        GuardDecision::RedirectToLogin => "redirect_login",
        GuardDecision::RedirectToDefault => "redirect_default",
    }
}

fn entry(state: &SessionState, route: &Route) -> RouteEntry {
    let decision = guard::check_route(state, route);
    RouteEntry {
        path: route.path(),
        access: access(route),
        decision: decision_name(&decision),
        redirect: decision.redirect().map(|r| r.path()),
    }
}

pub fn run_routes(args: &RoutesArgs, ctx: &Context) -> anyhow::Result<()> {
    let state = match ctx.store.state() {
        Ok(state) => state,
        Err(e) => return fail(ctx.output, &CliError::from_code(e.code(), e.to_string())),
    };

    let routes = match &args.path {
        Some(path) => match Route::parse(path) {
            Some(route) => vec![route],
            None => {
                return fail(
                    ctx.output,
                    &CliError::from_code(ErrorCode::InvalidField, format!("unknown route '{path}'")),
                );
            }
        },
        None => table(),
    };
    let entries: Vec<RouteEntry> = routes.iter().map(|r| entry(&state, r)).collect();

    render(ctx.output, &entries, |rows, w| {
        if ctx.output == OutputMode::Pretty {
            pretty_section(w, "Routes")?;
        }
        for row in rows {
            let outcome = row
                .redirect
                .as_ref()
                .map_or_else(|| row.decision.to_string(), |to| format!("-> {to}"));
            writeln!(w, "{:<20} {:<12} {}", row.path, row.access, outcome)?;
        }
        Ok(())
    })
}
