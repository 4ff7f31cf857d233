//! `pt assign`: admin routes a petition to a department.

use clap::Args;
use petitions_core::model::petition::Department;
use petitions_core::view::detail;

use super::{action_cli_error, load_failed, parse_enum, show};
use crate::context::Context;
use crate::output::fail;

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Petition id.
    pub id: String,

    /// Department: health, education, transport, housing, environment.
    pub department: String,
}

pub fn run_assign(args: &AssignArgs, ctx: &Context) -> anyhow::Result<()> {
    let department: Department = parse_enum(ctx.output, &args.department)?;
    let (user, mut view, api) = show::open(ctx, &args.id)?;

    view.select_department(Some(department));
    let applied = match view.assign_department(&api, &user) {
        Ok(applied) => applied,
        Err(e) => return fail(ctx.output, &action_cli_error(&e)),
    };

    // After a failed reload the view still holds the copy from before the change.
    let Some(petition) = view.petition() else {
        let message = view.state().error().unwrap_or(detail::FETCH_FAILED);
        return load_failed(ctx.output, message, view.failure_code());
    };
    let mut report = show::ShowReport::new(&view, petition, &user);
    report.message = Some("Department assigned");
    report.warning = applied.warning();
    show::print_report(ctx, &report)
}
