//! Household budget commands: income, savings goal, expenses, recurring
//! templates, and the monthly summary.

use crate::cli::commands::{resolve_index, short_id, usage};
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, info, section, success, warning};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::core::services::{ExpenseService, RecurringService, SummaryService};
use crate::currency::parse_amount;
use crate::ledger::{ExpenseDraft, YearMonth};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("income", "Show or set monthly income", "income [amount]", cmd_income),
        CommandEntry::new(
            "goal",
            "Show or set the savings goal",
            "goal [amount]",
            cmd_goal,
        ),
        CommandEntry::new(
            "expense",
            "Record, list, or remove expenses",
            "expense <add <name> <amount> [category] [--recurring]|list|remove <expense>>",
            cmd_expense,
        ),
        CommandEntry::new(
            "recurring",
            "Manage monthly recurring expenses",
            "recurring <list|apply|apply-now <template>|remove <template>>",
            cmd_recurring,
        ),
        CommandEntry::new(
            "summary",
            "Budget summary and warnings for a month",
            "summary [YYYY-MM]",
            cmd_summary,
        ),
    ]
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        let income = context.data()?.expenses.income;
        info(format!("Income: {}", context.money(income)));
        return Ok(());
    }
    let amount = parse_amount(&args.join(" "), &context.locale);
    context.edit(|data, _| ExpenseService::set_income(&mut data.expenses, amount))??;
    success(format!("Income set to {}.", context.money(amount)));
    Ok(())
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        let goal = context.data()?.expenses.savings_goal;
        info(format!("Savings goal: {}", context.money(goal)));
        return Ok(());
    }
    let amount = parse_amount(&args.join(" "), &context.locale);
    context.edit(|data, _| ExpenseService::set_savings_goal(&mut data.expenses, amount))??;
    success(format!("Savings goal set to {}.", context.money(amount)));
    Ok(())
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return list_expenses(context);
    };
    match action.to_ascii_lowercase().as_str() {
        "add" => add_expense(context, rest),
        "list" | "ls" => list_expenses(context),
        "remove" | "rm" => remove_expense(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown expense action `{other}`. Available: add, list, remove"
        ))),
    }
}

fn add_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let recurring = args
        .iter()
        .any(|arg| matches!(*arg, "--recurring" | "-r"));
    let positional: Vec<&str> = args
        .iter()
        .copied()
        .filter(|arg| !matches!(*arg, "--recurring" | "-r"))
        .collect();
    let [name, amount, category @ ..] = positional.as_slice() else {
        return Err(usage(
            "expense add <name> <amount> [category] [--recurring]",
        ));
    };
    let draft = ExpenseDraft {
        name: name.to_string(),
        amount: parse_amount(amount, &context.locale),
        category: (!category.is_empty()).then(|| category.join(" ")),
        recurring,
    };
    let formatted = context.money(draft.amount);
    let id = context.edit(|data, clock| ExpenseService::add(&mut data.expenses, draft, clock))??;
    success(format!(
        "Expense `{}` recorded: {formatted}{}",
        short_id(&id),
        if recurring { " (monthly)" } else { "" }
    ));
    Ok(())
}

fn list_expenses(context: &mut ShellContext) -> CommandResult {
    let ledger = &context.data()?.expenses;
    let expenses = ExpenseService::list(ledger);
    if expenses.is_empty() {
        info("No expenses recorded.");
        return Ok(());
    }
    section("Expenses");
    let rows: Vec<Vec<String>> = expenses
        .iter()
        .enumerate()
        .map(|(index, expense)| {
            vec![
                (index + 1).to_string(),
                short_id(&expense.id).to_string(),
                expense.date.clone(),
                expense.name.clone(),
                expense.category.clone().unwrap_or_else(|| "-".into()),
                context.money(expense.amount),
                if expense.recurring_id.is_some() { "R".into() } else { String::new() },
            ]
        })
        .collect();
    output::table(
        &["#", "Id", "Date", "Name", "Category", "Amount", ""],
        &rows,
        &[0, 5],
    );
    info(format!("Total: {}", context.money(ledger.total_expenses())));
    Ok(())
}

fn remove_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = args.first().ok_or_else(|| usage("expense remove <expense>"))?;
    let expenses = &context.data()?.expenses.expenses;
    let index = resolve_index(expenses, |e| e.id.as_str(), selector, "expense")?;
    let id = expenses[index].id.clone();
    let removed = context.edit(|data, _| ExpenseService::remove(&mut data.expenses, &id))??;
    success(format!("Expense `{}` removed.", removed.name));
    Ok(())
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return list_templates(context);
    };
    match action.to_ascii_lowercase().as_str() {
        "list" | "ls" => list_templates(context),
        "apply" => apply_due(context),
        "apply-now" => apply_now(context, rest),
        "remove" | "rm" => remove_template(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown recurring action `{other}`. Available: list, apply, apply-now, remove"
        ))),
    }
}

fn list_templates(context: &mut ShellContext) -> CommandResult {
    let templates = RecurringService::list(&context.data()?.expenses);
    if templates.is_empty() {
        info("No recurring expenses.");
        return Ok(());
    }
    section("Recurring expenses");
    let rows: Vec<Vec<String>> = templates
        .iter()
        .enumerate()
        .map(|(index, template)| {
            vec![
                (index + 1).to_string(),
                short_id(&template.id).to_string(),
                template.name.clone(),
                template.category.clone().unwrap_or_else(|| "-".into()),
                context.money(template.amount),
                template.preferred_day.to_string(),
            ]
        })
        .collect();
    output::table(
        &["#", "Id", "Name", "Category", "Amount", "Day"],
        &rows,
        &[0, 4, 5],
    );
    Ok(())
}

fn apply_due(context: &mut ShellContext) -> CommandResult {
    let was_dirty = context.dirty;
    let created = context.edit(|data, clock| {
        RecurringService::apply_due(&mut data.expenses, clock.today())
    })?;
    if created.is_empty() {
        context.dirty = was_dirty;
        info("Every recurring expense is already recorded.");
        return Ok(());
    }
    for expense in &created {
        success(format!(
            "{} on {}: {}",
            expense.name,
            expense.date,
            context.money(expense.amount)
        ));
    }
    success(format!("{} recurring expense(s) recorded.", created.len()));
    Ok(())
}

fn apply_now(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = args
        .first()
        .ok_or_else(|| usage("recurring apply-now <template>"))?;
    let id = template_id(context, selector)?;
    let expense = context.edit(|data, clock| {
        RecurringService::apply_now(&mut data.expenses, &id, clock.today())
    })??;
    success(format!(
        "{} recorded on {}: {}",
        expense.name,
        expense.date,
        context.money(expense.amount)
    ));
    Ok(())
}

fn remove_template(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = args
        .first()
        .ok_or_else(|| usage("recurring remove <template>"))?;
    let id = template_id(context, selector)?;
    let removed = context.edit(|data, _| {
        RecurringService::remove_template(&mut data.expenses, &id)
    })??;
    success(format!(
        "Recurring expense `{}` removed; recorded expenses were kept.",
        removed.name
    ));
    Ok(())
}

fn template_id(context: &ShellContext, selector: &str) -> Result<String, CommandError> {
    let templates = RecurringService::list(&context.data()?.expenses);
    let index = resolve_index(templates, |t| t.id.as_str(), selector, "recurring template")?;
    Ok(templates[index].id.clone())
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = match args.first() {
        Some(raw) => raw
            .parse::<YearMonth>()
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?,
        None => SummaryService::current_month(context.clock()),
    };
    let ledger = &context.data()?.expenses;
    let summary = SummaryService::summarize(ledger, month);

    section(format!("Summary {}", summary.month));
    info(format!("Income          : {}", context.money(summary.income)));
    info(format!("Total expenses  : {}", context.money(summary.total_expenses)));
    info(format!("Month expenses  : {}", context.money(summary.month_expenses)));
    info(format!("Balance         : {}", context.money(summary.balance)));
    if ledger.savings_goal > 0.0 {
        info(format!("Savings goal    : {}", context.money(ledger.savings_goal)));
    }
    if !summary.by_category.is_empty() {
        let rows: Vec<Vec<String>> = summary
            .by_category
            .iter()
            .map(|total| {
                vec![
                    total.category.clone().unwrap_or_else(|| "Uncategorized".into()),
                    context.money(total.total),
                ]
            })
            .collect();
        output::table(&["Category", "Spent"], &rows, &[1]);
    }
    for warning_item in SummaryService::warnings(ledger, month) {
        warning(warning_item);
    }
    Ok(())
}
