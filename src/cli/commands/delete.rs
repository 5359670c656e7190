//! `tkt delete` command - Delete an item and the edges pointing at it

use console::style;
use miette::Result;

use crate::cli::helpers::Workspace;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Item ID (or unique prefix)
    pub id: String,

    /// Leave edges on other items that point at the deleted item
    #[arg(long)]
    pub keep_links: bool,
}

pub fn run(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let id = ws.store.resolve_id(&args.id)?;

    let mut stripped = 0;
    if !args.keep_links {
        for mut other in ws.store.all() {
            if other.id != id && other.remove_links_to(&id) {
                ws.store.update(other)?;
                stripped += 1;
            }
        }
    }

    let removed = ws.store.delete(&id)?;

    if !global.quiet {
        println!(
            "{} Deleted {} {}",
            style("✓").green(),
            style(&removed.id).cyan(),
            removed.title
        );
        if stripped > 0 {
            println!(
                "   {}",
                style(format!("removed links from {} other item(s)", stripped)).dim()
            );
        }
    }
    Ok(())
}
