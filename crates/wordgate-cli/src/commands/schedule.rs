use std::collections::HashSet;

use chrono::{Datelike, Local, Weekday};
use clap::Subcommand;
use wordgate_core::{Config, IntervalPreset};

use crate::common;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show current schedule settings
    Status,
    /// Set the interruption interval (1m, 10m, 30m, 1h)
    Interval { preset: String },
    /// Set the active weekdays (e.g. mon tue wed); no days disables interruptions
    Days { days: Vec<String> },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Status => {
            let config = Config::load_or_default();
            let schedule = &config.schedule;
            println!("interval:    {}", schedule.interval);

            let active: Vec<String> = WEEK
                .iter()
                .filter(|d| schedule.active_days.contains(d))
                .map(|d| d.to_string())
                .collect();
            if active.is_empty() {
                println!("active days: none (interruptions disabled)");
            } else {
                println!("active days: {}", active.join(" "));
            }

            let today = Local::now().weekday();
            let state = if schedule.active_days.contains(&today) {
                "active"
            } else {
                "inactive"
            };
            println!("today ({today}): {state}");
        }
        ScheduleAction::Interval { preset } => {
            let mut config = Config::load_or_default();
            common::require_pin(&config)?;
            let Some(preset) = IntervalPreset::try_from_token(&preset) else {
                return Err(
                    format!("unknown interval '{preset}' (expected one of: 1m, 10m, 30m, 1h)")
                        .into(),
                );
            };
            config.schedule.interval = preset;
            config.save()?;
            println!("interval set to {preset}");
        }
        ScheduleAction::Days { days } => {
            let mut config = Config::load_or_default();
            common::require_pin(&config)?;
            let mut active_days = HashSet::new();
            for day in &days {
                let parsed: Weekday = day
                    .parse()
                    .map_err(|_| format!("unknown weekday '{day}'"))?;
                active_days.insert(parsed);
            }
            config.schedule.active_days = active_days;
            config.save()?;
            if config.schedule.active_days.is_empty() {
                println!("active days cleared; interruptions disabled");
            } else {
                println!("active days updated");
            }
        }
    }
    Ok(())
}
