//! Subcommand entry points. Each receives the client it should talk through;
//! nothing is cached across invocations.

use crate::api::ApiClient;
use crate::cli::{CreateArgs, DeleteArgs, DescribeArgs, ListArgs, UpdateArgs};
use crate::error::Error;
use crate::input;
use crate::output;
use crate::reconcile::{self, Outcome};

pub async fn list(client: &ApiClient, zone: &str, args: &ListArgs) -> Result<(), Error> {
    let zone_id = client.zone_id_by_name(zone).await?;
    let rules = client.list_rules(&zone_id).await?;
    if args.json_output {
        output::print_json(&rules);
    } else {
        output::print_rules_table(&rules);
    }
    Ok(())
}

pub async fn describe(client: &ApiClient, zone: &str, args: &DescribeArgs) -> Result<(), Error> {
    let zone_id = client.zone_id_by_name(zone).await?;
    let rule = client.get_rule(&zone_id, &args.id).await?;
    if args.json_output {
        output::print_json(&rule);
    } else {
        output::print_rule_detail(&rule);
    }
    Ok(())
}

pub async fn create(client: &ApiClient, zone: &str, args: &CreateArgs) -> Result<(), Error> {
    // Desired state is built (and validated) before any remote call.
    let desired = input::desired_rule(&args.rule)?;
    let zone_id = client.zone_id_by_name(zone).await?;
    let created = client.create_rule(&zone_id, &desired).await?;
    output::print_success(&format!(
        "Created rule {} in zone {}",
        created.id.as_deref().unwrap_or("?"),
        zone
    ));
    output::print_json(&created);
    Ok(())
}

pub async fn update(client: &ApiClient, zone: &str, args: &UpdateArgs) -> Result<(), Error> {
    let desired = input::desired_rule(&args.rule)?;
    let zone_id = client.zone_id_by_name(zone).await?;
    match reconcile::reconcile(client, &zone_id, &args.id, &desired).await? {
        Outcome::Unchanged => {
            output::print_success(&format!(
                "Rule {} already matches desired state; no update sent",
                args.id
            ));
        }
        Outcome::Updated { deltas, stored } => {
            for delta in &deltas {
                println!("  {delta}");
            }
            output::print_success(&format!(
                "Updated rule {} in zone {} ({} field(s) changed)",
                args.id,
                zone,
                deltas.len()
            ));
            output::print_json(&stored);
        }
    }
    Ok(())
}

pub async fn delete(client: &ApiClient, zone: &str, args: &DeleteArgs) -> Result<(), Error> {
    let zone_id = client.zone_id_by_name(zone).await?;
    client.delete_rule(&zone_id, &args.id).await?;
    output::print_success(&format!("Deleted rule {} from zone {}", args.id, zone));
    Ok(())
}
