//! Scenario management plus the projection, goal, and progress commands.

use crate::cli::commands::{resolve_index, short_id, usage};
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, info, section, success, warning};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::core::services::ScenarioService;
use crate::currency::{format_number, format_percent, parse_days};
use crate::simulation::{GoalOutcome, ScenarioPatch};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "scenario",
            "Manage compound-interest scenarios",
            "scenario <list|new [name]|select <scenario>|set <field> <value>...|rename <scenario> <name>|delete <scenario>>",
            cmd_scenario,
        ),
        CommandEntry::new(
            "project",
            "Day-by-day projection of the active scenario",
            "project",
            cmd_project,
        ),
        CommandEntry::new(
            "solve",
            "Daily rate the active scenario needs to reach a goal",
            "solve <goal>",
            cmd_solve,
        ),
        CommandEntry::new(
            "done",
            "Toggle a day as done, or show progress",
            "done [day]",
            cmd_done,
        ),
    ]
}

fn cmd_scenario(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return list(context);
    };
    match action.to_ascii_lowercase().as_str() {
        "list" | "ls" => list(context),
        "new" | "add" => create(context, rest),
        "select" | "use" => select(context, rest),
        "set" => set(context, rest),
        "rename" => rename(context, rest),
        "delete" | "rm" => delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown scenario action `{other}`. Available: list, new, select, set, rename, delete"
        ))),
    }
}

fn list(context: &mut ShellContext) -> CommandResult {
    let data = context.data()?;
    let active = data.current_scenario_id.as_deref();
    section("Scenarios");
    let rows: Vec<Vec<String>> = ScenarioService::list(data)
        .iter()
        .enumerate()
        .map(|(index, scenario)| {
            let marker = if Some(scenario.id.as_str()) == active { "*" } else { "" };
            vec![
                format!("{marker}{}", index + 1),
                short_id(&scenario.id).to_string(),
                scenario.name.clone(),
                scenario.principal.clone(),
                format!("{}%", scenario.rate_percent),
                scenario.days.clone(),
                scenario.daily_contribution.clone(),
            ]
        })
        .collect();
    output::table(
        &["#", "Id", "Name", "Principal", "Rate/day", "Days", "Daily add"],
        &rows,
        &[0, 3, 4, 5, 6],
    );
    Ok(())
}

fn create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = (!args.is_empty()).then(|| args.join(" "));
    let id = context.edit(|data, clock| ScenarioService::create(data, name.as_deref(), clock))??;
    let name = context
        .data()?
        .scenario(&id)
        .map(|scenario| scenario.name.clone())
        .unwrap_or_default();
    success(format!("Scenario `{name}` created and selected."));
    Ok(())
}

fn select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = args.first().ok_or_else(|| usage("scenario select <scenario>"))?;
    let id = scenario_id(context, selector)?;
    context.edit(|data, _| ScenarioService::select(data, &id))??;
    let name = context
        .data()?
        .active_scenario()
        .map(|scenario| scenario.name.clone())
        .unwrap_or_default();
    success(format!("Active scenario: {name}"));
    Ok(())
}

fn set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(usage(
            "scenario set <name|principal|rate|days|contribution> <value> [...]",
        ));
    }
    let mut patch = ScenarioPatch::default();
    for pair in args.chunks(2) {
        let value = Some(pair[1].to_string());
        match pair[0].to_ascii_lowercase().as_str() {
            "name" => patch.name = value,
            "principal" => patch.principal = value,
            "rate" | "rate_percent" => patch.rate_percent = value,
            "days" => patch.days = value,
            "contribution" | "daily" => patch.daily_contribution = value,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown scenario field `{other}`. Fields: name, principal, rate, days, contribution"
                )))
            }
        }
    }
    let id = context
        .data()?
        .current_scenario_id
        .clone()
        .ok_or_else(|| CommandError::InvalidArguments("No active scenario".into()))?;
    let locale = context.locale.clone();
    let changed =
        context.edit(|data, clock| ScenarioService::update(data, &id, patch, &locale, clock))??;
    if changed {
        success("Scenario updated.");
    } else {
        info("Nothing changed.");
    }
    Ok(())
}

fn rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((selector, name)) = args.split_first().filter(|(_, name)| !name.is_empty()) else {
        return Err(usage("scenario rename <scenario> <name>"));
    };
    let id = scenario_id(context, selector)?;
    let name = name.join(" ");
    context.edit(|data, clock| ScenarioService::rename(data, &id, &name, clock))??;
    success(format!("Scenario renamed to `{}`.", name.trim()));
    Ok(())
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = args.first().ok_or_else(|| usage("scenario delete <scenario>"))?;
    let id = scenario_id(context, selector)?;
    let removed = context.edit(|data, _| ScenarioService::delete(data, &id))??;
    success(format!("Scenario `{}` deleted.", removed.name));
    if context.data()?.scenarios.is_empty() {
        warning("No scenarios left; create one with `scenario new`.");
    }
    Ok(())
}

fn scenario_id(context: &ShellContext, selector: &str) -> Result<String, CommandError> {
    let scenarios = ScenarioService::list(context.data()?);
    let index = resolve_index(scenarios, |s| s.id.as_str(), selector, "scenario")?;
    Ok(scenarios[index].id.clone())
}

fn cmd_project(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let data = context.data()?;
    let projection = ScenarioService::project_active(data, &context.locale)?;
    let markers = data
        .active_scenario()
        .and_then(|scenario| data.markers(&scenario.id));

    let title = data
        .active_scenario()
        .map(|scenario| scenario.name.clone())
        .unwrap_or_default();
    section(format!("Projection: {title}"));
    let rows: Vec<Vec<String>> = projection
        .schedule
        .iter()
        .map(|entry| {
            let done = markers.is_some_and(|markers| markers.is_done(entry.day));
            vec![
                entry.day.to_string(),
                context.money(entry.opening_balance),
                context.money(entry.contribution),
                context.money(entry.interest),
                context.money(entry.closing_balance),
                if done { "x".into() } else { String::new() },
            ]
        })
        .collect();
    output::table(
        &["Day", "Opening", "Added", "Interest", "Closing", "Done"],
        &rows,
        &[0, 1, 2, 3, 4],
    );
    let totals = projection.totals;
    info(format!("Contributed    : {}", context.money(totals.contributed)));
    info(format!("Interest earned: {}", context.money(totals.interest_earned)));
    info(format!("Final balance  : {}", context.money(totals.final_balance)));
    Ok(())
}

fn cmd_solve(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("solve <goal>"));
    }
    let goal = args.join(" ");
    let data = context.data()?;
    match ScenarioService::solve_active(data, &goal, &context.locale)? {
        None => warning("The active scenario has no days to grow over."),
        Some(GoalOutcome::Unreachable) => {
            warning("Goal unreachable even at the highest daily rate considered.")
        }
        Some(GoalOutcome::Rate(rate)) => success(format!(
            "Required daily rate: {}",
            format_percent(&context.locale, rate, 4)
        )),
    }
    Ok(())
}

fn cmd_done(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(raw) = args.first() {
        let day = parse_days(raw, &context.locale);
        let done = context.edit(|data, _| ScenarioService::toggle_day(data, day))??;
        if done {
            success(format!("Day {day} marked as done."));
        } else {
            info(format!("Day {day} unmarked."));
        }
    }
    let progress = ScenarioService::progress(context.data()?, &context.locale)?;
    info(format!(
        "Progress: {}%",
        format_number(&context.locale, progress * 100.0, 1)
    ));
    Ok(())
}
