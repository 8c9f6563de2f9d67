use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;
use tabled::{builder::Builder, settings::Style};

use crate::format::{format_cost_label, format_minutes, format_number, short_model, truncate, WEEKDAYS};
use crate::metrics::{projects_by_cost, ranked};
use crate::models::{SourceInfo, Statistics};

const RECENT_DAYS: usize = 14;

pub fn print_sources_table(sources: &[SourceInfo]) {
    if sources.is_empty() {
        println!("{}", "No session logs found.".yellow());
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Id", "Source", "Cost"]);
    for s in sources {
        let cost = if s.id.cost_estimated() { "estimated" } else { "reported" };
        builder.push_record([s.id.as_str(), s.label.as_str(), cost]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}

pub fn print_stats_table(label: &str, stats: &Statistics) {
    let m = &stats.summary;
    let est = stats.cost_estimated;

    println!();
    println!(
        "{}  {} projects  {} sessions  {} messages  {} tokens  {} cost",
        label.bold().cyan(),
        m.total_projects.to_string().bold(),
        m.total_sessions.to_string().bold(),
        format_number(m.total_messages).bold(),
        format_number(m.total_tokens.total()).bold(),
        format_cost_label(m.total_cost, est).bold().green(),
    );
    println!(
        "  {} user messages over {} active days, {} total session time",
        format_number(m.total_user_messages),
        m.active_days,
        format_minutes(m.total_duration_minutes),
    );
    if est {
        println!("  {}", "Cost estimated from token counts (~).".dimmed());
    }
    println!();

    // Project table
    let mut builder = Builder::default();
    builder.push_record(["Project", "Sessions", "Messages", "User", "Tokens", "Time", "Cost", "Models"]);
    for (name, p) in projects_by_cost(stats) {
        let models: Vec<String> = p.models.iter().map(|m| short_model(m)).collect();
        builder.push_record([
            truncate(name, 30),
            p.sessions.to_string(),
            format_number(p.messages),
            format_number(p.user_messages),
            format_number(p.tokens.total()),
            format_minutes(p.duration_minutes),
            format_cost_label(p.cost, est),
            truncate(&models.join(", "), 30),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    // Model / thinking level usage
    if !stats.model_usage.is_empty() || !stats.thinking_level_usage.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Model / Thinking", "Sessions"]);
        for (model, count) in ranked(&stats.model_usage) {
            builder.push_record([model.clone(), count.to_string()]);
        }
        for (level, count) in ranked(&stats.thinking_level_usage) {
            builder.push_record([format!("thinking: {}", level), count.to_string()]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    // Recent days
    let recent = recent_days(stats, RECENT_DAYS);
    if !recent.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Day", "User msgs", "Tokens", "Cost"]);
        for day in recent {
            let tokens = stats.daily_tokens.get(day).map(|t| t.total()).unwrap_or(0);
            let cost = stats.daily_cost.get(day).copied().unwrap_or(0.0);
            let messages = stats.daily_activity.get(day).copied().unwrap_or(0);
            builder.push_record([
                day.clone(),
                messages.to_string(),
                format_number(tokens),
                format_cost_label(cost, est),
            ]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    print_punchcard(stats);
    println!();
}

/// The last `n` days with any activity, cost or tokens, oldest first.
fn recent_days(stats: &Statistics, n: usize) -> Vec<&String> {
    let days: BTreeSet<&String> = stats
        .daily_activity
        .keys()
        .chain(stats.daily_cost.keys())
        .chain(stats.daily_tokens.keys())
        .collect();
    let mut recent: Vec<&String> = days.into_iter().rev().take(n).collect();
    recent.reverse();
    recent
}

fn print_punchcard(stats: &Statistics) {
    const SHADES: [&str; 5] = [" ", "░", "▒", "▓", "█"];
    let max = stats.punchcard.iter().flatten().copied().max().unwrap_or(0);
    if max == 0 {
        return;
    }

    println!("\n     {}", (0..24).map(|h| format!("{:<2}", h % 10)).collect::<String>().dimmed());
    for (dow, row) in stats.punchcard.iter().enumerate() {
        let cells: String = row
            .iter()
            .map(|&n| {
                let idx = if n == 0 { 0 } else { (1 + n * 3 / max).min(4) as usize };
                format!("{} ", SHADES[idx])
            })
            .collect();
        println!("  {} {}", WEEKDAYS[dow].dimmed(), cells.cyan());
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
