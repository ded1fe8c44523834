//! Launch command - spawn a command and show the processes it starts.

use anyhow::{bail, Result};
use proctree_core::{launch, ConfigStore, LaunchOptions, ProcessTreeService, TerminationMode};
use serde::Serialize;

use super::output::{print_advisory, print_json, print_report, print_tree, TreeOutput};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchOutput<'a> {
    #[serde(flatten)]
    tree: TreeOutput<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<proctree_core::TerminationReport>,
}

pub async fn run(command: &[String], mode: Option<TerminationMode>, json: bool) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        bail!("No command given");
    };

    let config = ConfigStore::new()?.load().await?;
    let service = ProcessTreeService::from_config(&config);

    let tree = launch(&service, program, args, LaunchOptions::from(&config)).await?;
    let shape = service.classify(&tree.descendants);
    let report = mode.map(|mode| service.classify_and_terminate(&tree.descendants, mode));

    if json {
        print_json(&LaunchOutput {
            tree: TreeOutput {
                root_pid: tree.root_pid,
                shape,
                descendants: &tree.descendants,
            },
            report: report.clone(),
        })?;
    } else {
        print_tree(&tree.descendants, shape);
        if let Some(report) = &report {
            println!();
            print_report(report);
        } else {
            print_advisory(&tree.descendants, shape, service.policy());
        }
    }

    if let Some(report) = report {
        if !report.is_success() {
            bail!("{} termination(s) denied", report.failures().count());
        }
    }
    Ok(())
}
