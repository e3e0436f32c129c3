// src/runner.rs

//! Command execution.
//!
//! Wires the parsed CLI command through the full flow:
//! config → (optional DNS probe) → app JWT → installation token → one
//! GitHub call. Every subcommand re-authenticates from scratch; the
//! program performs at most one dispatch per invocation, so there is
//! nothing worth caching.

use crate::auth;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::github::GithubClient;
use crate::probe;

use anyhow::Result;
use std::collections::BTreeMap;

/* ---------------- workflow targets ---------------- */

const TASKS_WORKFLOW: &str = "org_tasks.yml";
const INVENTORY_WORKFLOW: &str = "org_inventory.yml";
const HARDEN_WORKFLOW: &str = "org_hardener.yml";

/// One planned dispatch: the workflow file plus its string inputs.
#[derive(Debug)]
struct DispatchPlan {
    workflow_file: &'static str,
    inputs: BTreeMap<String, String>,
}

/// Translate a command into its dispatch target.
///
/// `Check` has no target; it lists workflows instead of dispatching one.
fn plan_for(command: &Command) -> Option<DispatchPlan> {
    match command {
        Command::Check => None,

        Command::Tasks { publish, subset } => Some(DispatchPlan {
            workflow_file: TASKS_WORKFLOW,
            inputs: string_inputs(&[("publish", publish.as_str()), ("subset", subset.as_str())]),
        }),

        Command::Inventory { subset, issue } => Some(DispatchPlan {
            workflow_file: INVENTORY_WORKFLOW,
            inputs: string_inputs(&[("subset", subset.as_str()), ("issue_number", issue.as_str())]),
        }),

        Command::Harden { dry_run, subset } => Some(DispatchPlan {
            workflow_file: HARDEN_WORKFLOW,
            inputs: string_inputs(&[("dry_run", dry_run.as_str()), ("subset", subset.as_str())]),
        }),
    }
}

fn string_inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/* ---------------- flow ---------------- */

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<()> {
    let cfg = Config::from_env()?;

    if cfg.debug_dns {
        probe::run(&cfg.api_base).await;
    }

    let app_jwt = auth::mint_app_jwt(cfg.app_id, &cfg.private_key)?;
    let client = GithubClient::new(&cfg);

    let installation_id = client.installation_id(&app_jwt).await?;
    tracing::debug!(installation_id, "resolved app installation");

    let token = client.installation_token(&app_jwt, installation_id).await?;
    tracing::debug!(expires_at = %token.expires_at, "created installation token");

    match plan_for(&cli.command) {
        None => {
            let list = client.list_workflows(&token.token).await?;

            for wf in &list.workflows {
                println!("{:>10}  {}  {}  [{}]", wf.id, wf.name, wf.path, wf.state);
            }
            println!(
                "{} workflows defined in {}/{}",
                list.total_count, cfg.org, cfg.repo
            );

            Ok(())
        }

        Some(plan) => {
            client
                .dispatch(&token.token, plan.workflow_file, &plan.inputs)
                .await?;

            eprintln!(
                "Dispatched {} on {}/{}@{}",
                plan.workflow_file, cfg.org, cfg.repo, cfg.branch
            );

            // Machine-readable confirmation on stdout
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ok": true,
                    "workflow": plan.workflow_file,
                    "repository": format!("{}/{}", cfg.org, cfg.repo),
                    "ref": cfg.branch,
                    "inputs": plan.inputs,
                }))?
            );

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_plan_maps_flags_to_inputs() {
        let plan = plan_for(&Command::Tasks {
            publish: "true".to_string(),
            subset: "a,b".to_string(),
        })
        .unwrap();

        assert_eq!(plan.workflow_file, "org_tasks.yml");
        assert_eq!(plan.inputs.get("publish").map(String::as_str), Some("true"));
        assert_eq!(plan.inputs.get("subset").map(String::as_str), Some("a,b"));
        assert_eq!(plan.inputs.len(), 2);
    }

    #[test]
    fn inventory_plan_forwards_issue_number() {
        let plan = plan_for(&Command::Inventory {
            subset: String::new(),
            issue: "26".to_string(),
        })
        .unwrap();

        assert_eq!(plan.workflow_file, "org_inventory.yml");
        assert_eq!(
            plan.inputs.get("issue_number").map(String::as_str),
            Some("26")
        );
        assert_eq!(plan.inputs.get("subset").map(String::as_str), Some(""));
    }

    #[test]
    fn harden_plan_targets_hardener_workflow() {
        let plan = plan_for(&Command::Harden {
            dry_run: "false".to_string(),
            subset: "infra".to_string(),
        })
        .unwrap();

        assert_eq!(plan.workflow_file, "org_hardener.yml");
        assert_eq!(
            plan.inputs.get("dry_run").map(String::as_str),
            Some("false")
        );
    }

    #[test]
    fn check_has_no_dispatch_plan() {
        assert!(plan_for(&Command::Check).is_none());
    }
}
