//! `pt create`: citizen files a new petition.


use clap::Args;
use petitions_core::guard::Route;
use petitions_core::model::filter::PetitionFilter;
use petitions_core::model::petition::Petition;
use petitions_core::view::create::CreateForm;
use serde::Serialize;

use super::{action_cli_error, list};
use crate::context::Context;
use crate::output::{fail, render};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Petition title.
    #[arg(short, long)]
    pub title: String,

    /// What the problem is and where.
    #[arg(short, long)]
    pub description: String,

    /// After the redirect delay, show the petition list.
    #[arg(long)]
    pub follow: bool,
}

#[derive(Debug, Serialize)]
struct CreateReport<'a> {
    message: &'a str,
    petition: &'a Petition,
    redirect: String,
    redirect_after_ms: u128,
}

pub fn run_create(args: &CreateArgs, ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.enter(&Route::CreatePetition)?;
    let api = ctx.api(&session);

    let form = CreateForm::new(args.title.as_str(), args.description.as_str());
    let created = match form.submit(&api, ctx.config.redirect_delay()) {
        Ok(created) => created,
        Err(e) => return fail(ctx.output, &action_cli_error(&e)),
    };

    let report = CreateReport {
        message: created.message,
        petition: &created.petition,
        redirect: created.redirect.to.path(),
        redirect_after_ms: created.redirect.after.as_millis(),
    };
    render(ctx.output, &report, |r, w| {
        writeln!(w, "{}", r.message)?;
        writeln!(w, "{}  {}", r.petition.id, r.petition.title)
    })?;

    if args.follow {
        std::thread::sleep(created.redirect.after);
        list::print_list(ctx, PetitionFilter::new())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CreateArgs,
    }

    #[test]
    fn title_and_description_are_required() {
        assert!(Wrapper::try_parse_from(["test", "--title", "Pothole"]).is_err());
        let w = Wrapper::parse_from([
            "test",
            "-t",
            "Pothole on Main St",
            "-d",
            "Large pothole causing damage",
        ]);
        assert_eq!(w.args.title, "Pothole on Main St");
        assert!(!w.args.follow);
    }
}
