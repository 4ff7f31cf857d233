//! `pt list`: list petitions with optional status/department/search filters.

use std::io::{self, Write};

use clap::Args;
use petitions_core::guard::Route;
use petitions_core::model::filter::PetitionFilter;
use petitions_core::model::petition::{Department, Status};
use petitions_core::view::list::{ListRow, PetitionListView};
use serde::Serialize;

use super::{load_failed, parse_enum};
use crate::context::Context;
use crate::output::{OutputMode, Renderable, render_list};

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only petitions in this status: received, assigned, under_review, resolved.
    #[arg(short, long)]
    pub status: Option<String>,

    /// Only petitions assigned to this department.
    #[arg(short, long)]
    pub department: Option<String>,

    /// Free-text search over title and description.
    #[arg(long)]
    pub search: Option<String>,
}

impl ListArgs {
    /// Build the filter, reporting bad enum values as CLI errors.
    pub fn filter(&self, output: OutputMode) -> anyhow::Result<PetitionFilter> {
        let mut filter = PetitionFilter::new();
        if let Some(raw) = &self.status {
            filter = filter.with_status(parse_enum::<Status>(output, raw)?);
        }
        if let Some(raw) = &self.department {
            filter = filter.with_department(parse_enum::<Department>(output, raw)?);
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search);
        }
        Ok(filter)
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct Row(ListRow);

impl Renderable for Row {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let row = &self.0;
        let urgent = if row.urgent { " [urgent]" } else { "" };
        writeln!(w, "{}  {}{urgent}", row.id, row.title)?;
        let department = row.department.map_or("unassigned", Department::as_str);
        writeln!(
            w,
            "    {} ({}) · {} · {}",
            row.status,
            row.badge,
            department,
            row.created_at.format("%Y-%m-%d")
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let row = &self.0;
        let department = row.department.map_or("-", Department::as_str);
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            row.id,
            row.status,
            row.badge,
            department,
            u8::from(row.urgent),
            row.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "status", "badge", "department", "urgent", "title"]
    }
}

/// Fetch and print the list for `filter`.
pub fn print_list(ctx: &Context, filter: PetitionFilter) -> anyhow::Result<()> {
    let session = ctx.enter(&Route::Petitions)?;
    let api = ctx.api(&session);
    let mut view = PetitionListView::new(filter);
    view.refresh(&api);

    if let Some(message) = view.state().error() {
        return load_failed(ctx.output, message, view.failure_code());
    }
    let rows: Vec<Row> = view.rows().iter().cloned().map(Row).collect();
    if rows.is_empty() && ctx.output.is_pretty() {
        println!("No petitions found");
        return Ok(());
    }
    render_list(&rows, ctx.output)
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let filter = args.filter(ctx.output)?;
    print_list(ctx, filter)
}
