//! `pt status`: officer updates the status of a petition in their department.

use clap::Args;
use petitions_core::model::petition::Status;
use petitions_core::view::detail;

use super::{action_cli_error, load_failed, parse_enum, show};
use crate::context::Context;
use crate::output::fail;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Petition id.
    pub id: String,

    /// New status: received, assigned, under_review, resolved.
    pub status: String,

    /// Remarks recorded in the status history.
    #[arg(short, long, default_value = "")]
    pub remarks: String,
}

pub fn run_status(args: &StatusArgs, ctx: &Context) -> anyhow::Result<()> {
    let target: Status = parse_enum(ctx.output, &args.status)?;
    let (user, mut view, api) = show::open(ctx, &args.id)?;

    view.set_status_draft(target);
    view.set_remarks(args.remarks.as_str());
    let applied = match view.update_status(&api, &user) {
        Ok(applied) => applied,
        Err(e) => return fail(ctx.output, &action_cli_error(&e)),
    };

    // After a failed reload the view still holds the copy from before the change.
    let Some(petition) = view.petition() else {
        let message = view.state().error().unwrap_or(detail::FETCH_FAILED);
        return load_failed(ctx.output, message, view.failure_code());
    };
    let mut report = show::ShowReport::new(&view, petition, &user);
    report.message = Some("Status updated");
    report.warning = applied.warning();
    show::print_report(ctx, &report)
}
