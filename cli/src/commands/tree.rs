//! Tree command - show all descendants of a process.

use anyhow::Result;
use proctree_core::{ConfigStore, ProcessTreeService};

use super::output::{print_advisory, print_json, print_tree, TreeOutput};

pub async fn run(pid: u32, json: bool) -> Result<()> {
    let config = ConfigStore::new()?.load().await?;
    let service = ProcessTreeService::from_config(&config);

    let descendants = service.descendants(pid)?;
    let shape = service.classify(&descendants);

    if json {
        return print_json(&TreeOutput {
            root_pid: pid,
            shape,
            descendants: &descendants,
        });
    }

    print_tree(&descendants, shape);
    print_advisory(&descendants, shape, service.policy());
    Ok(())
}
