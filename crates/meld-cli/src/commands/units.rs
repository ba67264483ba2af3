//! Unit catalog listing command.

use clap::Args;
use meld_core::{CONTROL_CHANNEL, ProcessingUnit};
use meld_registry::{UnitCatalog, UnitCategory};

#[derive(Args)]
pub struct UnitsArgs {
    /// Show the pins of one unit (identifier or display name)
    #[arg(value_name = "UNIT")]
    unit: Option<String>,
}

pub fn run(args: UnitsArgs) -> anyhow::Result<()> {
    let catalog = UnitCatalog::new();

    let Some(wanted) = &args.unit else {
        println!("Available Units");
        println!("===============");
        for category in UnitCategory::ALL {
            println!();
            println!("{}", category.name());
            for entry in catalog.units_in_category(category) {
                println!(
                    "  {:26} {:16} {}",
                    entry.descriptor.identifier, entry.descriptor.name, entry.description
                );
            }
        }
        println!();
        println!("Use 'meld units <id>' to list a unit's pins.");
        return Ok(());
    };

    let entry = catalog
        .all_units()
        .into_iter()
        .find(|e| {
            e.descriptor.identifier == *wanted || e.descriptor.name.eq_ignore_ascii_case(wanted)
        })
        .ok_or_else(|| anyhow::anyhow!("Unknown unit: {}", wanted))?;
    let unit = &entry.descriptor;

    println!("{}", unit.name);
    println!("{}", "=".repeat(unit.name.len()));
    println!();
    println!("{} ({})", unit.identifier, entry.category.name());
    println!("{}", entry.description);

    for (is_input, title, control) in [
        (true, "Inputs", unit.accepts_control()),
        (false, "Outputs", unit.produces_control()),
    ] {
        println!();
        println!("{title}:");
        let total = if is_input {
            unit.total_input_channels()
        } else {
            unit.total_output_channels()
        };
        let channels = (0..total).chain(control.then_some(CONTROL_CHANNEL));
        let mut any = false;
        for channel in channels {
            any = true;
            let pin = if channel == CONTROL_CHANNEL {
                "ctl".to_string()
            } else {
                channel.to_string()
            };
            println!("  {pin:>4}  {}", unit.pin_description(is_input, channel));
        }
        if !any {
            println!("  (none)");
        }
    }
    Ok(())
}
