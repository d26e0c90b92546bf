use chore_wheel::advisory::{self, AdvisoryOutcome, FairnessAdvisor, SuggestionRequest};
use chore_wheel::persistence::{load_board_from_json, save_board_to_json, save_history_to_csv};
use chore_wheel::{BoardConfig, ChoreBoard, ChoreUpdate, logging};
use polars::prelude::{AnyValue, DataFrame};
use std::io::{self, Write};
use std::sync::Arc;

fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect::<Vec<_>>();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, row: &[String]| {
        out.push('|');
        for (ci, cell) in row.iter().enumerate() {
            let pad = widths[ci].saturating_sub(cell.chars().count());
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, col_names.as_slice());
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row.as_slice());
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the current month's schedule\n  roster                             List members and completed tasks\n  add-member [name...]               Add a member (default: next 'Person N')\n  remove-member <name...>            Remove a member\n  rename <old> <new>                 Rename a member (use 'old -> new' for names with spaces)\n  chores                             List chores\n  add-chore [id]                     Add a placeholder chore\n  remove-chore <id>                  Remove a chore\n  chore <id> title|desc|icon|freq <value...>\n                                     Edit one field of a chore\n  next | prev                        Move one month forward or back\n  month <n>                          Jump to month offset n (0 = reference month)\n  freeze | unfreeze                  Pin or release the current month's schedule\n  done <name...>                     Count a completed task for a member\n  stats                              Show load for the current month and history\n  suggest <chore_id>                 Ask for the fairest assignee\n  save <json|csv> <path>             Save the board (json) or frozen history (csv)\n  load json <path>                   Load a board saved with 'save json'\n  quit|exit                          Exit"
    );
}

fn print_schedule(board: &ChoreBoard) {
    let month = board.month_offset();
    let frozen = if board.is_frozen(month) { " [frozen]" } else { "" };
    println!("Month {month}: {}{frozen}", board.month_label(month));

    let schedule = board.current_schedule();
    if schedule.is_empty() {
        println!("Nothing to schedule.");
        return;
    }

    let dates = board
        .calendar()
        .week_dates(month)
        .iter()
        .enumerate()
        .map(|(idx, date)| format!("week {}: {}", idx + 1, date.format("%b %-d")))
        .collect::<Vec<_>>()
        .join(", ");
    if !dates.is_empty() {
        println!("{dates}");
    }

    match schedule.to_dataframe(Some(board.chores())) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering schedule: {}", e),
    }
    for week in &schedule.weeks {
        if !week.dropped.is_empty() {
            println!("Week {} unassigned: {}", week.week + 1, week.dropped.join(", "));
        }
    }
    println!("{}", schedule.summary().to_cli_summary());
}

fn print_roster(board: &ChoreBoard) {
    if board.roster().is_empty() {
        println!("Roster is empty.");
        return;
    }
    let counts = board.past_assignments();
    for name in board.roster() {
        let done = counts.get(name).copied().unwrap_or(0);
        println!("  {:<24} {} completed", name, done);
    }
}

fn print_chores(board: &ChoreBoard) {
    if board.chores().is_empty() {
        println!("No chores defined.");
        return;
    }
    for chore in board.chores() {
        println!(
            "  {:<20} {:<24} freq={} icon={} {}",
            chore.id,
            chore.title,
            chore.frequency(),
            chore.icon_name,
            chore.description
        );
    }
}

fn print_stats(board: &ChoreBoard) {
    let summary = board.current_schedule().summary();
    println!("This month: {}", summary.to_cli_summary());
    let frozen = board.history().assignment_counts();
    if frozen.is_empty() {
        println!("No frozen months.");
    } else {
        let load = frozen
            .iter()
            .map(|(name, count)| format!("{name}:{count}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("Frozen months ({}): {}", board.history().len(), load);
    }
}

/// Split `rename` arguments into old and new names.
fn parse_rename(rest: &str) -> Option<(&str, &str)> {
    if let Some((old, new)) = rest.split_once("->") {
        let (old, new) = (old.trim(), new.trim());
        return (!old.is_empty() && !new.is_empty()).then_some((old, new));
    }
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(old), Some(new), None) => Some((old, new)),
        _ => None,
    }
}

fn suggest(
    runtime: &tokio::runtime::Runtime,
    advisor: &dyn FairnessAdvisor,
    board: &ChoreBoard,
    chore_id: &str,
) {
    let request = match SuggestionRequest::from_board(board, chore_id) {
        Ok(request) => request,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let outcome = runtime.block_on(advisory::request_suggestion(
        advisor,
        &request,
        advisory::DEFAULT_TIMEOUT,
    ));
    match outcome {
        AdvisoryOutcome::Suggested {
            response,
            on_roster,
        } => {
            let note = if on_roster { "" } else { " (not on the roster)" };
            println!("Suggested: {}{}", response.suggested_assignee, note);
            println!("Reasoning: {}", response.reasoning);
        }
        AdvisoryOutcome::Unavailable { message } => println!("{}", message),
    }
}

fn main() {
    logging::init_logging("warn");

    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    let mut board = ChoreBoard::new(config);
    let advisor: Arc<dyn FairnessAdvisor> = advisory::advisor_from_env();
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            std::process::exit(1);
        }
    };

    println!("Chore Wheel (CLI) - type 'help' for commands\n");
    print_schedule(&board);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_schedule(&board),
            "roster" => print_roster(&board),
            "add-member" => {
                let name = (!rest.is_empty()).then_some(rest);
                match board.add_member(name) {
                    Ok(added) => println!("Added member {}.", added),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "remove-member" => {
                if rest.is_empty() {
                    println!("Usage: remove-member <name>");
                    continue;
                }
                match board.remove_member(rest) {
                    Ok(affected) => {
                        println!("Removed {} ({} frozen tasks affected).", rest, affected)
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "rename" => match parse_rename(rest) {
                Some((old, new)) => match board.rename_member(old, new) {
                    Ok(rewritten) => println!(
                        "Renamed {} to {} ({} frozen tasks updated).",
                        old,
                        new.trim(),
                        rewritten
                    ),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: rename <old> <new>"),
            },
            "chores" => print_chores(&board),
            "add-chore" => {
                let chore = (!rest.is_empty()).then(|| chore_wheel::defaults::new_chore(rest));
                match board.add_chore(chore) {
                    Ok(id) => println!("Chore {} added.", id),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "remove-chore" => {
                if rest.is_empty() {
                    println!("Usage: remove-chore <id>");
                    continue;
                }
                match board.remove_chore(rest) {
                    Ok(chore) => println!("Chore {} removed.", chore.id),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "chore" => {
                let mut parts = rest.splitn(3, char::is_whitespace);
                let (id, field, value) = (parts.next(), parts.next(), parts.next());
                let (Some(id), Some(field), Some(value)) = (id, field, value.map(str::trim))
                else {
                    println!("Usage: chore <id> title|desc|icon|freq <value...>");
                    continue;
                };
                let mut update = ChoreUpdate::default();
                match field {
                    "title" => update.title = Some(value.to_string()),
                    "desc" => update.description = Some(value.to_string()),
                    "icon" => update.icon_name = Some(value.to_string()),
                    "freq" => match value.parse::<i64>() {
                        Ok(freq) => update.frequency = Some(freq),
                        Err(_) => {
                            println!("Invalid frequency");
                            continue;
                        }
                    },
                    other => {
                        println!("Unknown chore field '{}'.", other);
                        println!("Usage: chore <id> title|desc|icon|freq <value...>");
                        continue;
                    }
                }
                match board.update_chore(id, update) {
                    Ok(chore) => println!(
                        "Chore {} updated: {} (freq={}).",
                        chore.id,
                        chore.title,
                        chore.frequency()
                    ),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "next" => match board.next_month() {
                Ok(_) => print_schedule(&board),
                Err(e) => println!("Error: {}", e),
            },
            "prev" => match board.previous_month() {
                Ok(_) => print_schedule(&board),
                Err(e) => println!("Error: {}", e),
            },
            "month" => match rest.parse::<i64>() {
                Ok(month) => match board.go_to_month(month) {
                    Ok(_) => print_schedule(&board),
                    Err(e) => println!("Error: {}", e),
                },
                Err(_) => println!("Usage: month <n>"),
            },
            "freeze" => {
                let month = board.month_offset();
                board.freeze_month(month);
                println!("Month {} frozen.", month);
            }
            "unfreeze" => {
                let month = board.month_offset();
                if board.unfreeze_month(month) {
                    println!("Month {} unfrozen.", month);
                } else {
                    println!("Month {} is not frozen.", month);
                }
            }
            "done" => {
                if rest.is_empty() {
                    println!("Usage: done <name>");
                    continue;
                }
                match board.record_completion(rest) {
                    Ok(count) => println!("{} has completed {} tasks.", rest, count),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "stats" => print_stats(&board),
            "suggest" => {
                if rest.is_empty() {
                    println!("Usage: suggest <chore_id>");
                    continue;
                }
                suggest(&runtime, advisor.as_ref(), &board, rest);
            }
            "save" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some("json"), Some(path)) => match save_board_to_json(&board, path) {
                        Ok(_) => println!("Board saved to {}.", path),
                        Err(e) => println!("Error saving board: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_history_to_csv(board.history(), path)
                    {
                        Ok(_) => println!("History saved to {}.", path),
                        Err(e) => println!("Error saving history: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some("json"), Some(path)) => match load_board_from_json(path) {
                        Ok(loaded) => {
                            board = loaded;
                            println!("Board loaded from {}.", path);
                            print_schedule(&board);
                        }
                        Err(e) => println!("Error loading board: {}", e),
                    },
                    _ => println!("Usage: load json <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
