//! Command handlers for the tracker shell.

use dayroll_core::TrackingState;
use dayroll_domain::MonthKey;

use super::context::{CommandError, CommandResult, ShellContext};
use super::output;
use super::registry::{CommandEntry, CommandRegistry};
use crate::display::{Table, TableColumn};

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(CommandEntry::new(
        "user",
        "Select the user whose ledger to track",
        "user <name>",
        cmd_user,
    ));
    registry.register(CommandEntry::new(
        "budget",
        "Set this month's budget, optionally with spending from earlier days",
        "budget <amount> [spent-so-far]",
        cmd_budget,
    ));
    registry.register(CommandEntry::new(
        "today",
        "Show today's available budget",
        "today",
        cmd_today,
    ));
    registry.register(CommandEntry::new(
        "spend",
        "Record today's spending",
        "spend <amount>",
        cmd_spend,
    ));
    registry.register(CommandEntry::new(
        "catchup",
        "Record total spending for days that were not recorded",
        "catchup <amount>",
        cmd_catchup,
    ));
    registry.register(CommandEntry::new(
        "summary",
        "Show monthly totals, average daily budget and spending extremes",
        "summary [YYYY-MM]",
        cmd_summary,
    ));
    registry.register(CommandEntry::new(
        "history",
        "Show a month's metrics and recorded entries",
        "history [YYYY-MM]",
        cmd_history,
    ));
    registry.register(CommandEntry::new(
        "months",
        "List tracked months with their rolling balances",
        "months",
        cmd_months,
    ));
    registry.register(CommandEntry::new(
        "help",
        "List commands or describe one",
        "help [command]",
        cmd_help,
    ));
    registry.register(CommandEntry::new(
        "version",
        "Show the program version",
        "version",
        cmd_version,
    ));
    registry.register(CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit));
    registry.register(CommandEntry::new("quit", "Leave the shell", "quit", cmd_exit));
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args.join(" ");
    let name = name.trim();
    if name.is_empty() {
        return match context.user() {
            Some(user) => {
                output::info(format!("Current user: {user}"));
                Ok(())
            }
            None => Err(usage("user <name>")),
        };
    }
    context.select_user(name)?;
    output::success(format!("Tracking budget for {name}."));
    if context.tracker.has_current_month(name)? {
        show_today(context, name)
    } else {
        output::info(format!(
            "No budget set for {}. Use `budget <amount>` to start.",
            context.tracker.current_month()
        ));
        Ok(())
    }
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let (base, past) = match args {
        [base] => (parse_amount(base)?, None),
        [base, past] => (parse_amount(base)?, Some(parse_amount(past)?)),
        _ => return Err(usage("budget <amount> [spent-so-far]")),
    };
    let record = context.tracker.set_monthly_budget(&user, base, past)?;
    let fmt = &context.format;
    output::success(format!(
        "Monthly budget of {} saved for {}.",
        fmt.format(base),
        context.tracker.current_month()
    ));
    if record.carryover != 0.0 {
        output::info(format!(
            "Carryover from last month: {} (total {}).",
            fmt.format(record.carryover),
            fmt.format(record.total_budget)
        ));
    }
    output::info(format!(
        "Daily budget: {}",
        fmt.format(record.standard_daily_budget)
    ));
    show_today(context, &user)
}

fn cmd_today(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    show_today(context, &user)
}

fn cmd_spend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let spent = single_amount(args, "spend <amount>")?;
    let entry = context.tracker.record_expense(&user, spent)?;
    output::success(format!(
        "Expense of {} recorded! Remaining balance: {}",
        context.format.format(entry.spent),
        context.format.format(entry.rolling_balance_after_spend)
    ));
    Ok(())
}

fn cmd_catchup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let spent = single_amount(args, "catchup <amount>")?;
    let entry = context.tracker.record_missed_period(&user, spent)?;
    output::success(format!(
        "Recorded {} for {}. Balance: {}",
        context.format.format(entry.spent),
        entry.summary_period.as_deref().unwrap_or("missed days"),
        context.format.format(entry.rolling_balance_after_spend)
    ));
    show_today(context, &user)
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let month = optional_month(args, "summary [YYYY-MM]")?;
    let summary = context.tracker.summarize(&user, month)?;
    let fmt = &context.format;

    output::section(format!("Monthly Summary {}", summary.month));
    let mut table = Table::new(vec![
        TableColumn::left("Metric"),
        TableColumn::right("Amount"),
    ]);
    for (label, amount) in [
        ("Total spent", summary.total_spent),
        ("Remaining in month", summary.month_remaining),
        ("Remaining balance", summary.rolling_balance),
        ("Avg daily budget", summary.avg_daily_budget),
        ("Max daily spending", summary.max_spent),
        ("Min daily spending", summary.min_spent),
    ] {
        table.push_row(vec![label.to_string(), fmt.format(amount)]);
    }
    output::info(table.render());
    output::info(format!("Entries: {}", summary.entry_count));
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let month = optional_month(args, "history [YYYY-MM]")?;
    let view = context.tracker.month_view(&user, month)?;

    output::section(format!("Budget {}", view.month));
    output::info(view.metrics_table(&context.format).render());
    if view.rows.is_empty() {
        output::info("No daily expense recorded yet.");
    } else {
        output::info(view.entries_table(&context.format).render());
    }
    Ok(())
}

fn cmd_months(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let balances = context.tracker.month_balances(&user)?;
    if balances.is_empty() {
        output::info("No months tracked yet.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Month"),
        TableColumn::right("Rolling balance"),
    ]);
    for (key, balance) in balances {
        table.push_row(vec![key.to_string(), context.format.format(balance)]);
    }
    output::info(table.render());
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let entry = context
            .registry()
            .get(&name.to_lowercase())
            .ok_or_else(|| CommandError::InvalidArguments(format!("unknown command `{name}`")))?;
        output::info(format!("{}: {}", entry.usage, entry.description));
        return Ok(());
    }
    output::section("Commands");
    for entry in context.registry().list() {
        output::info(format!("  {:<32} {}", entry.usage, entry.description));
    }
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(format!("dayroll {}", env!("CARGO_PKG_VERSION")));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Goodbye.");
    Err(CommandError::ExitRequested)
}

fn show_today(context: &ShellContext, user: &str) -> CommandResult {
    let view = context.tracker.month_view(user, None)?;
    let fmt = &context.format;
    if let Some(available) = view.available_today {
        output::info(format!(
            "Today's available budget ({}): {}",
            context.tracker.today(),
            fmt.format(available)
        ));
    }
    if let Some(TrackingState::Behind { missed_days }) = view.tracking {
        output::warning(format!(
            "{missed_days} day(s) before today are unrecorded. Use `catchup <amount>` with the total spent on those days."
        ));
    }
    Ok(())
}

fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {text}"))
}

fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not an amount")))
}

fn single_amount(args: &[&str], usage_text: &str) -> Result<f64, CommandError> {
    match args {
        [raw] => parse_amount(raw),
        _ => Err(usage(usage_text)),
    }
}

fn optional_month(args: &[&str], usage_text: &str) -> Result<Option<MonthKey>, CommandError> {
    match args {
        [] => Ok(None),
        [raw] => raw
            .parse::<MonthKey>()
            .map(Some)
            .map_err(|err| CommandError::InvalidArguments(err.to_string())),
        _ => Err(usage(usage_text)),
    }
}
