//! `pt show`: one petition with its status history and the actions the
//! signed-in user may take on it.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use clap::Args;
use petitions_core::guard::Route;
use petitions_core::model::petition::{Petition, Status};
use petitions_core::model::user::User;
use petitions_core::view::detail::{self, Actions, DetailView};
use serde::Serialize;

use super::load_failed;
use crate::client::HttpApi;
use crate::context::Context;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Petition id.
    pub id: String,
}

/// Petition detail as printed by `show`, `status`, and `assign`.
#[derive(Debug, Serialize)]
pub struct ShowReport<'a> {
    pub petition: &'a Petition,
    pub actions: Actions,
    /// Status values the editor offers, empty unless the user may update.
    pub status_targets: Vec<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    /// Set when a change was saved but the petition shown is the copy from
    /// before it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'a str>,
}

impl<'a> ShowReport<'a> {
    pub fn new(view: &DetailView, petition: &'a Petition, user: &User) -> Self {
        let actions = view.actions(user);
        let status_targets = if actions.update_status {
            view.status_targets()
        } else {
            Vec::new()
        };
        Self {
            petition,
            actions,
            status_targets,
            message: None,
            warning: None,
        }
    }
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn write_pretty(report: &ShowReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    let p = report.petition;
    if let Some(message) = report.message {
        writeln!(w, "{message}")?;
        writeln!(w)?;
    }
    pretty_section(w, &p.title)?;
    pretty_kv(w, "Id", &p.id)?;
    pretty_kv(w, "Status", format!("{} ({})", p.status, p.badge()))?;
    pretty_kv(
        w,
        "Department",
        p.assigned_department.map_or("unassigned", |d| d.as_str()),
    )?;
    if p.urgency {
        pretty_kv(w, "Urgent", "yes")?;
    }
    if p.is_duplicate {
        pretty_kv(w, "Duplicate", "yes")?;
    }
    pretty_kv(w, "Created", local_time(p.created_at))?;
    writeln!(w)?;
    writeln!(w, "{}", p.description)?;
    writeln!(w)?;

    pretty_section(w, "History")?;
    if p.status_history.is_empty() {
        writeln!(w, "(no entries)")?;
    }
    for event in &p.status_history {
        writeln!(
            w,
            "{}  {:<14} {}",
            local_time(event.created_at),
            event.status,
            event.remarks
        )?;
    }

    if report.actions.update_status || report.actions.assign_department {
        pretty_rule(w)?;
    }
    if report.actions.update_status {
        let targets: Vec<&str> = report.status_targets.iter().map(|s| s.as_str()).collect();
        writeln!(
            w,
            "Update: pt status {} <{}> --remarks <text>",
            p.id,
            targets.join("|")
        )?;
    }
    if report.actions.assign_department {
        writeln!(w, "Assign: pt assign {} <department>", p.id)?;
    }
    Ok(())
}

fn write_text(report: &ShowReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    let p = report.petition;
    writeln!(w, "id\t{}", p.id)?;
    writeln!(w, "title\t{}", p.title)?;
    writeln!(w, "status\t{}", p.status)?;
    writeln!(
        w,
        "department\t{}",
        p.assigned_department.map_or("-", |d| d.as_str())
    )?;
    for event in &p.status_history {
        writeln!(
            w,
            "history\t{}\t{}\t{}",
            event.created_at.to_rfc3339(),
            event.status,
            event.remarks
        )?;
    }
    Ok(())
}

/// Print `report` in the context's output mode.
pub fn print_report(ctx: &Context, report: &ShowReport<'_>) -> anyhow::Result<()> {
    if let Some(warning) = report.warning.filter(|_| !ctx.output.is_json()) {
        eprintln!("warning: {warning}");
    }
    render(ctx.output, report, |r, w| match ctx.output {
        OutputMode::Text => write_text(r, w),
        _ => write_pretty(r, w),
    })
}

/// Guard, then load the petition `id` into a fresh view.
pub fn open(ctx: &Context, id: &str) -> anyhow::Result<(User, DetailView, HttpApi)> {
    let session = ctx.enter(&Route::PetitionDetail(id.to_string()))?;
    let api = ctx.api(&session);
    let mut view = DetailView::new(id, ctx.config.transition_policy);
    view.load(&api);
    if let Some(message) = view.state().error() {
        return load_failed(ctx.output, message, view.failure_code());
    }
    Ok((session.user, view, api))
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let (user, view, _api) = open(ctx, &args.id)?;
    let Some(petition) = view.petition() else {
        return load_failed(ctx.output, detail::FETCH_FAILED, None);
    };
    print_report(ctx, &ShowReport::new(&view, petition, &user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use petitions_core::model::petition::{Department, StatusEvent, TransitionPolicy};
    use petitions_core::model::user::Role;

    fn petition() -> Petition {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        Petition {
            id: "p-9".into(),
            title: "Broken swing".into(),
            description: "Park on 3rd".into(),
            status: Status::Assigned,
            urgency: false,
            is_duplicate: false,
            assigned_department: Some(Department::Environment),
            created_at: at,
            status_history: vec![
                StatusEvent {
                    status: Status::Assigned,
                    remarks: "Assigned to environment".into(),
                    created_at: at,
                },
                StatusEvent {
                    status: Status::Received,
                    remarks: "Petition received".into(),
                    created_at: at,
                },
            ],
        }
    }

    fn report_for(p: &Petition) -> ShowReport<'_> {
        ShowReport {
            petition: p,
            actions: Actions {
                update_status: true,
                assign_department: false,
            },
            status_targets: TransitionPolicy::ForwardOnly.targets(p.status),
            message: None,
            warning: None,
        }
    }

    #[test]
    fn text_lists_history_newest_first() {
        let p = petition();
        let mut buf = Vec::new();
        write_text(&report_for(&p), &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let history: Vec<&str> = text.lines().filter(|l| l.starts_with("history")).collect();
        assert_eq!(history.len(), 2);
        assert!(history[0].contains("\tassigned\t"));
        assert!(history[1].contains("\treceived\t"));
    }

    #[test]
    fn pretty_offers_update_hint_for_officer() {
        let p = petition();
        let mut buf = Vec::new();
        write_pretty(&report_for(&p), &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("Update: pt status p-9"));
        assert!(!text.contains("Assign:"));
    }

    #[test]
    fn report_hides_targets_without_permission() {
        let p = petition();
        let citizen = User {
            id: "c".into(),
            first_name: "C".into(),
            role: Role::Citizen,
            department: None,
        };
        let view = DetailView::new("p-9", TransitionPolicy::Unrestricted);
        let report = ShowReport::new(&view, &p, &citizen);
        assert!(report.status_targets.is_empty());
        assert_eq!(report.actions, Actions::default());
    }

    #[test]
    fn json_report_carries_reload_warning() {
        let p = petition();
        let mut report = report_for(&p);
        report.message = Some("Status updated");
        report.warning = Some("Change saved, but the petition could not be reloaded");
        let value = serde_json::to_value(&report).expect("json");
        assert_eq!(value["message"], "Status updated");
        assert_eq!(
            value["warning"],
            "Change saved, but the petition could not be reloaded"
        );
        assert!(serde_json::to_value(report_for(&p)).expect("json").get("warning").is_none());
    }
}
