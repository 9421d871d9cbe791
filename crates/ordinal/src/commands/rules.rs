//! Rule listing and reordering, shared by every collection kind.

use ordinal_core::model::numbers_of;
use ordinal_core::{
    ApiBackend, Console, ConsoleConfig, DragOutcome, ReorderController, RuleBackend, RuleNumber,
    SaveOutcome, StoredCollection,
};

use crate::cli::{GlobalOpts, RulesCommand};
use crate::error::CliError;
use crate::output;

type Controller<I> = ReorderController<I, ApiBackend>;

pub async fn handle<I>(
    mut config: ConsoleConfig,
    identity: I,
    action: RulesCommand,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    I: StoredCollection,
    ApiBackend: RuleBackend<I>,
{
    if let RulesCommand::Watch { interval } = action {
        config.refresh_interval_secs = interval;
    }
    let console = Console::new(config)?;
    tracing::debug!(collection = %identity, "handling rules command");

    match action {
        RulesCommand::List { refresh } => {
            let rules = console.load(&identity, refresh).await?;
            output::print_output(&output::render_rules(&global.output, &rules), global.quiet);
            Ok(())
        }

        RulesCommand::Move { rule, to, dry_run } => {
            if rule == to {
                return Err(CliError::Validation {
                    field: "to".into(),
                    reason: format!("rule {rule} cannot be moved onto itself"),
                });
            }
            let mut ctl = console.reorder(identity);
            let current = numbers_of(&ctl.load(false).await?);
            for number in [rule, to] {
                ensure_known(number, &current, ctl.identity())?;
            }
            ctl.move_rule(rule, to);
            apply(ctl, dry_run, global).await
        }

        RulesCommand::Order { numbers, dry_run } => {
            let mut ctl = console.reorder(identity);
            let current = numbers_of(&ctl.load(false).await?);
            check_order(&current, &numbers, ctl.identity())?;
            arrange(&mut ctl, &numbers)?;
            apply(ctl, dry_run, global).await
        }

        RulesCommand::Watch { .. } => watch(&console, &identity, global).await,
    }
}

// ── Reordering ──────────────────────────────────────────────────────

/// Drag rules one at a time until the working order matches `desired`.
///
/// Positions before `i` are already final, so moving `desired[i]` onto
/// whatever occupies slot `i` never disturbs them.
fn arrange<I>(ctl: &mut Controller<I>, desired: &[RuleNumber]) -> Result<(), CliError>
where
    I: StoredCollection,
    ApiBackend: RuleBackend<I>,
{
    for (i, &wanted) in desired.iter().enumerate() {
        let shown = numbers_of(&ctl.displayed());
        let Some(&occupant) = shown.get(i) else { break };
        if occupant == wanted {
            continue;
        }
        if ctl.move_rule(wanted, occupant) != DragOutcome::Moved {
            return Err(CliError::Validation {
                field: "numbers".into(),
                reason: format!("could not move rule {wanted} into position {}", i + 1),
            });
        }
    }
    Ok(())
}

/// Save the session, or print its transaction and discard it.
async fn apply<I>(mut ctl: Controller<I>, dry_run: bool, global: &GlobalOpts) -> Result<(), CliError>
where
    I: StoredCollection,
    ApiBackend: RuleBackend<I>,
{
    let color = output::should_color(&global.color);

    if dry_run {
        let preview = ctl.preview().unwrap_or_default();
        output::print_output(
            &output::render_entries(&global.output, preview.entries()),
            global.quiet,
        );
        output::print_status(
            &format!(
                "dry run: {} of {} rules in {} would be renumbered",
                preview.changed_count(),
                preview.len(),
                ctl.identity()
            ),
            color,
            global.quiet,
        );
        ctl.cancel();
        return Ok(());
    }

    let status = match ctl.save().await? {
        SaveOutcome::Saved {
            entries,
            refreshed: true,
        } => format!("renumbered {entries} rules in {}", ctl.identity()),
        SaveOutcome::Saved {
            entries,
            refreshed: false,
        } => format!(
            "renumbered {entries} rules in {}; re-reading the collection failed, listing may be stale",
            ctl.identity()
        ),
        SaveOutcome::NothingToSave | SaveOutcome::Unchanged => {
            format!("order of {} unchanged; nothing sent", ctl.identity())
        }
        SaveOutcome::Stale => {
            format!("order of {} changed on the console; nothing sent", ctl.identity())
        }
        SaveOutcome::InFlight | SaveOutcome::Detached => {
            format!("reorder of {} still settling", ctl.identity())
        }
    };

    output::print_output(
        &output::render_rules(&global.output, &ctl.displayed()),
        global.quiet,
    );
    output::print_status(&status, color, global.quiet);
    Ok(())
}

// ── Watching ────────────────────────────────────────────────────────

async fn watch<I>(console: &Console, identity: &I, global: &GlobalOpts) -> Result<(), CliError>
where
    I: StoredCollection,
    ApiBackend: RuleBackend<I>,
{
    let mut last = console.load(identity, false).await?;
    output::print_output(&output::render_rules(&global.output, &last), global.quiet);

    let mut stream = console.stores().of::<I>().subscribe(identity);
    console.start().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = stream.changed() => {
                let Some(rules) = changed else { break };
                if rules != last {
                    output::print_output(&output::render_rules(&global.output, &rules), global.quiet);
                    last = rules;
                }
            }
        }
    }

    console.shutdown().await;
    Ok(())
}

// ── Validation ──────────────────────────────────────────────────────

fn ensure_known(
    number: RuleNumber,
    current: &[RuleNumber],
    collection: &impl std::fmt::Display,
) -> Result<(), CliError> {
    if current.contains(&number) {
        Ok(())
    } else {
        Err(CliError::UnknownRule {
            rule: number,
            collection: collection.to_string(),
        })
    }
}

/// `desired` must name every current rule exactly once.
fn check_order(
    current: &[RuleNumber],
    desired: &[RuleNumber],
    collection: &impl std::fmt::Display,
) -> Result<(), CliError> {
    for &number in desired {
        ensure_known(number, current, collection)?;
    }

    let mut have = current.to_vec();
    let mut want = desired.to_vec();
    have.sort_unstable();
    want.sort_unstable();
    if have == want {
        return Ok(());
    }

    Err(CliError::Validation {
        field: "numbers".into(),
        reason: format!(
            "expected each of the {} rule numbers in {collection} exactly once, got {}",
            current.len(),
            desired.len()
        ),
    })
}
