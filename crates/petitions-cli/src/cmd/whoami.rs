//! `pt whoami`: show the signed-in user.


use petitions_core::guard::Route;

use crate::context::Context;
use crate::output::{pretty_kv, render};

pub fn run_whoami(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.enter(&Route::Profile)?;
    render(ctx.output, &session.user, |user, w| {
        if ctx.output.is_pretty() {
            pretty_kv(w, "Name", &user.first_name)?;
            pretty_kv(w, "Role", user.role.as_str())?;
            if let Some(department) = user.department {
                pretty_kv(w, "Department", department.as_str())?;
            }
            pretty_kv(w, "Id", &user.id)
        } else {
            let department = user.department.map_or("-", |d| d.as_str());
            writeln!(w, "{}\t{}\t{}\t{}", user.id, user.first_name, user.role, department)
        }
    })
}
