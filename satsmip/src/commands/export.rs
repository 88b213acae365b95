use sats_core::models::{Bidder, World};
use sats_opt::{FormulationConfig, ModelAssembler, export_lp};
use std::io::Write;

pub fn export(
    world: &World,
    bidders: &[Bidder],
    config: &FormulationConfig,
    mut buffer: &mut dyn Write,
) -> anyhow::Result<()> {
    let model = ModelAssembler::new(world, bidders, config).assemble()?;
    tracing::info!(
        scaling_factor = model.scaling_factor,
        "exporting model in LP format"
    );
    export_lp(&model.mip, &mut buffer)?;
    Ok(())
}
