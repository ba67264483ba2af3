//! Execution order command.

use clap::Args;
use meld_config::PinAddress;
use meld_core::{Connection, ExecutionPlan};
use meld_registry::UnitCatalog;
use serde::Serialize;

use super::common::open_session;

#[derive(Args)]
pub struct PlanArgs {
    /// Session file or saved session name
    session: String,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PlanReport {
    session: String,
    steps: Vec<StepReport>,
    feedback: Vec<LinkReport>,
}

#[derive(Serialize)]
struct StepReport {
    node: u32,
    unit: String,
    name: String,
    inputs: Vec<LinkReport>,
}

#[derive(Serialize)]
struct LinkReport {
    source: String,
    destination: String,
}

impl From<&Connection> for LinkReport {
    fn from(c: &Connection) -> Self {
        Self {
            source: PinAddress::from(c.source).to_string(),
            destination: PinAddress::from(c.destination).to_string(),
        }
    }
}

pub fn run(args: PlanArgs) -> anyhow::Result<()> {
    let catalog = UnitCatalog::new();
    let (_, file, graph) = open_session(&args.session, &catalog)?;
    let plan = ExecutionPlan::build(&graph);

    let report = PlanReport {
        session: file.name,
        steps: plan
            .entries()
            .iter()
            .filter_map(|entry| {
                let node = graph.node(entry.node)?;
                let unit = node.unit().descriptor();
                Some(StepReport {
                    node: entry.node.index(),
                    unit: unit.identifier,
                    name: unit.name,
                    inputs: entry.inputs.iter().map(LinkReport::from).collect(),
                })
            })
            .collect(),
        feedback: plan.feedback().iter().map(LinkReport::from).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Execution order for '{}'", report.session);
    println!();
    for (i, step) in report.steps.iter().enumerate() {
        let inputs: Vec<&str> = step.inputs.iter().map(|l| l.source.as_str()).collect();
        if inputs.is_empty() {
            println!("  {:>3}. [{}] {}", i + 1, step.node, step.name);
        } else {
            println!(
                "  {:>3}. [{}] {}  <- {}",
                i + 1,
                step.node,
                step.name,
                inputs.join(", ")
            );
        }
    }
    if !report.feedback.is_empty() {
        println!();
        println!("Feedback (one block delay):");
        for link in &report.feedback {
            println!("  {} -> {}", link.source, link.destination);
        }
    }
    Ok(())
}
