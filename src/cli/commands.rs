//! Command parsing and dispatch for the interactive shell.

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::cli::{output, CliMode, LoopControl};
use crate::errors::ValidationError;
use crate::ledger::EntryId;
use crate::session::Session;

const SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Usage(String),
    #[error("unknown command `{name}`{}", suggestion_suffix(.suggestion))]
    Unknown {
        name: String,
        suggestion: Option<&'static str>,
    },
    #[error("prompt error: {0}")]
    Dialog(#[from] dialoguer::Error),
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{}`?)", name),
        None => String::new(),
    }
}

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
}

static COMMANDS: Lazy<Vec<CommandSpec>> = Lazy::new(|| {
    vec![
        CommandSpec {
            name: "status",
            usage: "status",
            summary: "Show the remaining budget and totals",
        },
        CommandSpec {
            name: "list",
            usage: "list",
            summary: "List recurring and one-off expenses",
        },
        CommandSpec {
            name: "budget",
            usage: "budget <delta>",
            summary: "Add to (or subtract from) the remaining budget",
        },
        CommandSpec {
            name: "add",
            usage: "add <description> <amount>",
            summary: "Record a one-off expense",
        },
        CommandSpec {
            name: "add-recurring",
            usage: "add-recurring <description> <amount>",
            summary: "Create a recurring monthly expense",
        },
        CommandSpec {
            name: "edit",
            usage: "edit <id> <description> <amount>",
            summary: "Edit a one-off or recurring expense",
        },
        CommandSpec {
            name: "rm",
            usage: "rm <id>",
            summary: "Delete a one-off or recurring expense",
        },
        CommandSpec {
            name: "paid",
            usage: "paid <id>",
            summary: "Toggle a recurring expense's paid flag for this month",
        },
        CommandSpec {
            name: "reset-paid",
            usage: "reset-paid",
            summary: "Clear every recurring paid flag (budget untouched)",
        },
        CommandSpec {
            name: "reset-month",
            usage: "reset-month",
            summary: "Clear one-off expenses and all recurring paid flags",
        },
        CommandSpec {
            name: "shop",
            usage: "shop [list|add <name>|check <id>|rm <id>|move <id> <pos>|clear]",
            summary: "Manage the shopping list",
        },
        CommandSpec {
            name: "config",
            usage: "config [locale <tag>|currency <code>]",
            summary: "Show or change display configuration",
        },
        CommandSpec {
            name: "help",
            usage: "help",
            summary: "Show this command list",
        },
        CommandSpec {
            name: "exit",
            usage: "exit",
            summary: "Leave the shell",
        },
    ]
});

pub fn handle_line(
    session: &mut Session,
    line: &str,
    mode: CliMode,
) -> Result<LoopControl, CommandError> {
    let tokens = shell_words::split(line)
        .map_err(|err| CommandError::Usage(format!("could not parse input: {}", err)))?;
    let Some((name, args)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };

    match name.as_str() {
        "status" => show_status(session),
        "list" => show_lists(session),
        "budget" => {
            let delta = single_arg("budget <delta>", args)?;
            let remaining = session.adjust_remaining(delta)?;
            output::success(format!(
                "Remaining budget is now {}",
                session.config().format_amount(remaining)
            ));
        }
        "add" => {
            let (description, amount) = two_args("add <description> <amount>", args)?;
            session.add_expense(description, amount)?;
            output::success(format!(
                "Recorded `{}`; remaining {}",
                description.trim(),
                session.config().format_amount(session.ledger().remaining)
            ));
        }
        "add-recurring" => {
            let (description, amount) = two_args("add-recurring <description> <amount>", args)?;
            session.add_recurring_expense(description, amount)?;
            output::success(format!("Recurring expense `{}` created", description.trim()));
        }
        "edit" => {
            let (id, description, amount) = id_and_two_args(args)?;
            if session.ledger().expense(id).is_some() {
                session.edit_expense(id, description, amount)?;
            } else {
                session.edit_recurring_expense(id, description, amount)?;
            }
            output::success(format!(
                "Updated {}; remaining {}",
                id,
                session.config().format_amount(session.ledger().remaining)
            ));
        }
        "rm" => {
            let id = parse_id(single_arg("rm <id>", args)?)?;
            if session.ledger().expense(id).is_some() {
                let removed = session.delete_expense(id)?;
                output::success(format!("Deleted `{}` and refunded it", removed.description));
            } else {
                let removed = session.delete_recurring_expense(id)?;
                output::success(format!("Deleted recurring `{}`", removed.description));
            }
        }
        "paid" => {
            let id = parse_id(single_arg("paid <id>", args)?)?;
            let paid = session.toggle_recurring_paid(id)?;
            let label = if paid { "paid" } else { "unpaid" };
            output::success(format!(
                "Marked {} for {}; remaining {}",
                label,
                session.current_month(),
                session.config().format_amount(session.ledger().remaining)
            ));
        }
        "reset-paid" => {
            session.reset_recurring_paid_status();
            output::success("Cleared every recurring paid flag");
        }
        "reset-month" => {
            if matches!(mode, CliMode::Interactive) {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt("Clear all one-off expenses and recurring paid flags?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    output::info("Reset cancelled.");
                    return Ok(LoopControl::Continue);
                }
            }
            session.full_month_reset();
            output::success("Month reset: expenses cleared, paid flags cleared");
        }
        "shop" => handle_shop(session, args)?,
        "config" => handle_config(session, args)?,
        "help" => show_help(),
        "exit" | "quit" => return Ok(LoopControl::Exit),
        other => {
            return Err(CommandError::Unknown {
                name: other.to_string(),
                suggestion: suggest(other),
            })
        }
    }

    Ok(LoopControl::Continue)
}

fn handle_shop(session: &mut Session, args: &[String]) -> Result<(), CommandError> {
    match args.split_first().map(|(sub, rest)| (sub.as_str(), rest)) {
        None | Some(("list", _)) => show_shopping(session),
        Some(("add", rest)) => {
            if rest.is_empty() {
                return usage("shop add <name>");
            }
            let name = rest.join(" ");
            session.add_shopping_item(&name)?;
            output::success(format!("Added `{}` to the shopping list", name.trim()));
        }
        Some(("check", rest)) => {
            let id = parse_id(single_arg("shop check <id>", rest)?)?;
            let checked = session.toggle_shopping_item(id)?;
            output::success(if checked { "Checked off" } else { "Unchecked" });
        }
        Some(("rm", rest)) => {
            let id = parse_id(single_arg("shop rm <id>", rest)?)?;
            let removed = session.delete_shopping_item(id)?;
            output::success(format!("Removed `{}`", removed.name));
        }
        Some(("move", rest)) => {
            let (id, position) = two_args("shop move <id> <pos>", rest)?;
            let id = parse_id(id)?;
            let position: usize = position
                .parse()
                .map_err(|_| CommandError::Usage("position must be a number".into()))?;
            session.move_shopping_item(id, position)?;
            output::success("Reordered");
        }
        Some(("clear", _)) => {
            session.clear_shopping_items();
            output::success("Shopping list cleared");
        }
        Some((other, _)) => {
            return Err(CommandError::Usage(format!(
                "unknown shop action `{}`; try list, add, check, rm, move, clear",
                other
            )))
        }
    }
    Ok(())
}

fn handle_config(session: &mut Session, args: &[String]) -> Result<(), CommandError> {
    match args.split_first().map(|(sub, rest)| (sub.as_str(), rest)) {
        None => {
            let config = session.config();
            output::info(format!(
                "locale {} / currency {}",
                config.locale, config.currency
            ));
        }
        Some(("locale", rest)) => {
            let tag = single_arg("config locale <tag>", rest)?;
            session.set_locale(tag)?;
            output::success(format!("Locale set to {}", tag));
        }
        Some(("currency", rest)) => {
            let code = single_arg("config currency <code>", rest)?;
            session.set_currency(code)?;
            output::success(format!("Currency set to {}", code));
        }
        Some((other, _)) => {
            return Err(CommandError::Usage(format!(
                "unknown config field `{}`; try locale or currency",
                other
            )))
        }
    }
    Ok(())
}

fn show_status(session: &Session) {
    let config = session.config();
    let ledger = session.ledger();
    let month = session.current_month();
    output::section(format!("Budget for {}", month));
    output::plain(format!(
        "Remaining: {}",
        config.format_amount(ledger.remaining)
    ));
    output::plain(format!(
        "Spent (one-off): {}",
        config.format_amount(ledger.one_off_total())
    ));
    output::plain(format!(
        "Unpaid recurring: {}",
        config.format_amount(ledger.unpaid_recurring_total(&month))
    ));
}

fn show_lists(session: &Session) {
    let config = session.config();
    let ledger = session.ledger();
    let month = session.current_month();

    output::section(format!("Recurring ({})", ledger.recurring_expenses.len()));
    if ledger.recurring_expenses.is_empty() {
        output::plain("  (none)");
    }
    for recurring in &ledger.recurring_expenses {
        let flag = if recurring.is_paid(&month) { "x" } else { " " };
        output::plain(format!(
            "  [{}] {}  {}  {}",
            flag,
            recurring.id,
            recurring.description,
            config.format_amount(recurring.amount)
        ));
    }

    output::section(format!("Expenses ({})", ledger.expenses.len()));
    if ledger.expenses.is_empty() {
        output::plain("  (none)");
    }
    for expense in &ledger.expenses {
        output::plain(format!(
            "  {}  {}  {}  {}",
            expense.id,
            expense.description,
            config.format_amount(expense.amount),
            expense.date
        ));
    }
}

fn show_shopping(session: &Session) {
    let shopping = session.shopping();
    output::section(format!("Shopping list ({})", shopping.len()));
    if shopping.is_empty() {
        output::plain("  (empty)");
    }
    for item in shopping.items() {
        let flag = if item.checked { "x" } else { " " };
        output::plain(format!("  [{}] {}  {}", flag, item.id, item.name));
    }
}

fn show_help() {
    output::section("Commands");
    for spec in COMMANDS.iter() {
        output::plain(format!("  {:<44} {}", spec.usage, spec.summary));
    }
}

fn suggest(name: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .map(|spec| (strsim::levenshtein(name, spec.name), spec.name))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name)
}

fn usage(expected: &str) -> Result<(), CommandError> {
    Err(CommandError::Usage(format!("usage: {}", expected)))
}

fn single_arg<'a>(expected: &str, args: &'a [String]) -> Result<&'a str, CommandError> {
    match args {
        [only] => Ok(only.as_str()),
        _ => Err(CommandError::Usage(format!("usage: {}", expected))),
    }
}

fn two_args<'a>(expected: &str, args: &'a [String]) -> Result<(&'a str, &'a str), CommandError> {
    match args {
        [first, second] => Ok((first.as_str(), second.as_str())),
        _ => Err(CommandError::Usage(format!("usage: {}", expected))),
    }
}

fn id_and_two_args(args: &[String]) -> Result<(EntryId, &str, &str), CommandError> {
    match args {
        [id, description, amount] => Ok((parse_id(id)?, description.as_str(), amount.as_str())),
        _ => Err(CommandError::Usage(
            "usage: edit <id> <description> <amount>".into(),
        )),
    }
}

fn parse_id(raw: &str) -> Result<EntryId, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::Usage(format!("`{}` is not a valid id", raw)))
}
