//! Terminal rendering for rules: tables for humans, JSON for pipes.

use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::rules::RateLimitRule;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}

pub fn print_rules_table(rules: &[RateLimitRule]) {
    if rules.is_empty() {
        println!("No rate-limit rules found.");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["ID", "Description", "Disabled", "Methods", "Status", "Action"]);
    for rule in rules {
        builder.push_record(summary_row(rule));
    }
    println!("{}", builder.build().with(Style::rounded()));
}

pub fn print_rule_detail(rule: &RateLimitRule) {
    let mut builder = Builder::default();
    builder.push_record([
        "ID",
        "Description",
        "Disabled",
        "Methods",
        "Status",
        "Schemes",
        "URL",
        "Threshold",
        "Action",
        "Period",
    ]);
    builder.push_record(detail_row(rule));
    println!("{}", builder.build().with(Style::rounded()));
}

fn summary_row(rule: &RateLimitRule) -> Vec<String> {
    vec![
        rule.id.as_deref().unwrap_or("-").to_string(),
        rule.description.clone(),
        rule.disabled.to_string(),
        rule.matcher.request.methods.join(","),
        join_statuses(&rule.matcher.response.statuses),
        rule.action.mode.clone(),
    ]
}

fn detail_row(rule: &RateLimitRule) -> Vec<String> {
    vec![
        rule.id.as_deref().unwrap_or("-").to_string(),
        rule.description.clone(),
        rule.disabled.to_string(),
        rule.matcher.request.methods.join(","),
        join_statuses(&rule.matcher.response.statuses),
        rule.matcher.request.schemes.join(","),
        rule.matcher.request.url_pattern.clone(),
        rule.threshold.to_string(),
        rule.action.mode.clone(),
        rule.period.to_string(),
    ]
}

fn join_statuses(statuses: &[u16]) -> String {
    statuses
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
