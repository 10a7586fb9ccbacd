use crate::context::AppContext;
use beamdown_core::size;
use eyre::Result;

pub fn run_platforms(ctx: &AppContext) -> Result<()> {
    println!("Platforms ({}):", ctx.catalog.len());
    for (id, entry) in ctx.catalog.iter() {
        let marker = if id == ctx.catalog.default_id() {
            " (default)"
        } else {
            ""
        };
        println!(
            "  {:<10} {:<12} {:>10}{}",
            id,
            entry.name,
            size::format_size(entry.total_mb()),
            marker
        );
    }
    Ok(())
}
