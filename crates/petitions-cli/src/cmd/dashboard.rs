//! `pt dashboard`: role-shaped statistics for the signed-in user.
//!
//! Charts become tables: status distribution for citizens, department
//! distribution for admins, and per-status counts for officers.

use std::io::{self, Write};

use petitions_core::guard::Route;
use petitions_core::model::stats::{
    AdminStats, CitizenStats, DashboardStats, OfficerStats, PetitionBrief, StatusCount,
};
use petitions_core::view::dashboard::DashboardView;
use serde::Serialize;

use super::load_failed;
use crate::context::Context;
use crate::output::{OutputMode, pretty_kv, pretty_section, render};

#[derive(Debug, Serialize)]
struct DashboardReport<'a> {
    greeting: &'a str,
    stats: &'a DashboardStats,
}

fn write_briefs(w: &mut dyn Write, heading: &str, briefs: &[PetitionBrief]) -> io::Result<()> {
    pretty_section(w, heading)?;
    if briefs.is_empty() {
        return writeln!(w, "(none)");
    }
    for brief in briefs {
        writeln!(w, "{:<14} {:<14} {}", brief.id, brief.status, brief.title)?;
    }
    Ok(())
}

fn write_status_counts(w: &mut dyn Write, heading: &str, counts: &[StatusCount]) -> io::Result<()> {
    pretty_section(w, heading)?;
    for row in counts {
        writeln!(w, "{:<14} {}", row.status, row.count)?;
    }
    Ok(())
}

fn write_citizen(w: &mut dyn Write, stats: &CitizenStats) -> io::Result<()> {
    write_briefs(w, "My petitions", &stats.my_petitions)?;
    writeln!(w)?;
    write_status_counts(w, "By status", &stats.status_data)
}

fn write_admin(w: &mut dyn Write, stats: &AdminStats) -> io::Result<()> {
    pretty_kv(w, "Total", stats.total_petitions.to_string())?;
    pretty_kv(w, "Urgent", stats.urgent_petitions.to_string())?;
    pretty_kv(w, "Unassigned", stats.pending_assignments.to_string())?;
    writeln!(w)?;
    pretty_section(w, "By department")?;
    for row in &stats.department_data {
        writeln!(w, "{:<14} {}", row.department, row.count)?;
    }
    Ok(())
}

fn write_officer(w: &mut dyn Write, stats: &OfficerStats) -> io::Result<()> {
    write_briefs(w, "Assigned to my department", &stats.assigned_petitions)?;
    writeln!(w)?;
    write_status_counts(w, "By status", &stats.department_stats)
}

fn write_text(w: &mut dyn Write, stats: &DashboardStats) -> io::Result<()> {
    match stats {
        DashboardStats::Citizen(s) => {
            for row in &s.status_data {
                writeln!(w, "status\t{}\t{}", row.status, row.count)?;
            }
        }
        DashboardStats::Admin(s) => {
            writeln!(w, "total\t{}", s.total_petitions)?;
            writeln!(w, "urgent\t{}", s.urgent_petitions)?;
            writeln!(w, "unassigned\t{}", s.pending_assignments)?;
            for row in &s.department_data {
                writeln!(w, "department\t{}\t{}", row.department, row.count)?;
            }
        }
        DashboardStats::Officer(s) => {
            for row in &s.department_stats {
                writeln!(w, "status\t{}\t{}", row.status, row.count)?;
            }
        }
    }
    Ok(())
}

pub fn run_dashboard(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.enter(&Route::Dashboard)?;
    let api = ctx.api(&session);
    let view = DashboardView::load(&api, &session.user);

    let Some(stats) = view.state().ready() else {
        let message = view.state().error().unwrap_or("Failed to load dashboard");
        return load_failed(ctx.output, message, view.failure_code());
    };

    let report = DashboardReport {
        greeting: view.greeting(),
        stats,
    };
    render(ctx.output, &report, |r, w| {
        if ctx.output == OutputMode::Text {
            return write_text(w, r.stats);
        }
        writeln!(w, "{}", r.greeting)?;
        writeln!(w)?;
        match r.stats {
            DashboardStats::Citizen(s) => write_citizen(w, s),
            DashboardStats::Admin(s) => write_admin(w, s),
            DashboardStats::Officer(s) => write_officer(w, s),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use petitions_core::model::petition::Status;
    use petitions_core::model::stats::DepartmentCount;

    fn text_of(stats: &DashboardStats) -> String {
        let mut buf = Vec::new();
        write_text(&mut buf, stats).expect("write");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn admin_text_lists_totals_then_departments() {
        let stats = DashboardStats::Admin(AdminStats {
            total_petitions: 3,
            urgent_petitions: 1,
            pending_assignments: 2,
            department_data: vec![DepartmentCount {
                department: "health".into(),
                count: 1,
            }],
        });
        assert_eq!(
            text_of(&stats),
            "total\t3\nurgent\t1\nunassigned\t2\ndepartment\thealth\t1\n"
        );
    }

    #[test]
    fn citizen_pretty_shows_empty_marker() {
        let stats = CitizenStats::default();
        let mut buf = Vec::new();
        write_citizen(&mut buf, &stats).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("My petitions\n"));
        assert!(text.contains("(none)"));
    }

    #[test]
    fn officer_text_counts_statuses() {
        let stats = DashboardStats::Officer(OfficerStats {
            assigned_petitions: Vec::new(),
            department_stats: vec![StatusCount {
                status: Status::UnderReview,
                count: 4,
            }],
        });
        assert_eq!(text_of(&stats), "status\tunder_review\t4\n");
    }
}
