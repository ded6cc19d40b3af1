//! Interactive review and explore front-ends.
//!
//! Both loops are thin shells over the reducers in [`crate::review`]: keys map
//! to actions, the reducer updates the cursor, and any effect is applied to the
//! store here. Non-TTY runs print a plain listing instead.
mod external;
mod keys;
mod view;

use crate::awards::{AwardLoader, AwardRecord};
use crate::paths::DataPaths;
use crate::record::OutreachRecord;
use crate::review::{
    apply_decision, edit_buffer, edit_record, parse_edit_buffer, reduce_explore, reduce_review,
    Decision, ExploreAction, ExploreEffect, ExploreState, ReviewAction, ReviewEffect, ReviewState,
};
use crate::staging::{stage_award, staged_ids};
use crate::store::{Collection, RecordStore};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use external::{edit_text, open_terminal, run_external, Term, TerminalGuard};
use keys::{explore_input, review_input, Input};
use std::io::{self, IsTerminal};
use std::time::Duration;

const EVENT_POLL_MS: u64 = 200;

fn interactive() -> bool {
    io::stdout().is_terminal() && io::stdin().is_terminal()
}

/// Review a collection, falling back to a text listing off-terminal.
pub fn run_review<S: RecordStore + ?Sized>(store: &S, collection: Collection) -> Result<()> {
    let ids = store
        .list(collection)
        .with_context(|| format!("list {collection}"))?;
    if !interactive() {
        return print_review_listing(store, collection);
    }
    let mut state = ReviewState::new(collection, ids);
    let mut guard = TerminalGuard::enter()?;
    let mut terminal = open_terminal()?;

    loop {
        let record = load_current(store, &mut state);
        terminal
            .draw(|frame| view::draw_review(frame, &state, record.as_ref()))
            .context("draw review ui")?;

        if !event::poll(Duration::from_millis(EVENT_POLL_MS)).context("poll event")? {
            continue;
        }
        let Event::Key(key) = event::read().context("read event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let action = match review_input(key) {
            Some(Input::Quit) => break,
            Some(Input::Act(action)) => action,
            None => continue,
        };
        let (next, effect) = reduce_review(state, action);
        state = next;
        if let Some(effect) = effect {
            if let Err(err) = apply_review_effect(store, &mut state, effect, &mut guard, &mut terminal)
            {
                let ids = store.list(state.collection).unwrap_or_default();
                state = reduce_review(state, ReviewAction::Reload(ids)).0;
                state.message = Some(format!("{err:#}"));
            }
        }
    }

    drop(guard);
    terminal.show_cursor().ok();
    Ok(())
}

/// Read the record under the cursor. Read failures go to the status line.
fn load_current<S: RecordStore + ?Sized>(
    store: &S,
    state: &mut ReviewState,
) -> Option<OutreachRecord> {
    let award_id = state.current()?.to_string();
    match store.read(state.collection, &award_id) {
        Ok(record) => record,
        Err(err) => {
            state.message = Some(format!("cannot read {award_id}: {err}"));
            None
        }
    }
}

fn apply_review_effect<S: RecordStore + ?Sized>(
    store: &S,
    state: &mut ReviewState,
    effect: ReviewEffect,
    guard: &mut TerminalGuard,
    terminal: &mut Term,
) -> Result<()> {
    match effect {
        ReviewEffect::Approve(award_id) => {
            apply_decision(store, &award_id, Decision::Approve)?;
        }
        ReviewEffect::Skip(award_id) => {
            apply_decision(store, &award_id, Decision::Skip)?;
        }
        ReviewEffect::Edit(award_id) => {
            let collection = state.collection;
            let record = store
                .read(collection, &award_id)?
                .with_context(|| format!("{award_id} is no longer in {collection}"))?;
            let edited = run_external(guard, terminal, || edit_text(&edit_buffer(&record)))?;
            match parse_edit_buffer(&edited) {
                Some((subject, body)) if subject == record.subject && body == record.body => {
                    state.message = Some("no changes".to_string());
                }
                Some((subject, body)) => {
                    edit_record(store, collection, &award_id, &subject, &body)?;
                    state.message = Some(format!("{award_id} updated"));
                }
                None => {
                    state.message =
                        Some("edit discarded: needs a Subject: line and a body".to_string());
                }
            }
        }
    }
    Ok(())
}

fn print_review_listing<S: RecordStore + ?Sized>(store: &S, collection: Collection) -> Result<()> {
    let records = store
        .read_all(collection)
        .with_context(|| format!("read {collection}"))?;
    println!("{collection}: {} records", records.len());
    for record in records {
        println!(
            "  {}  {} <{}>  {}",
            record.award_id, record.pi_name, record.pi_email, record.subject
        );
    }
    println!("(not a terminal; run interactively to approve, skip, or edit)");
    Ok(())
}

/// Browse unprocessed awards for a year and stage picks.
pub fn run_explore<S: RecordStore + ?Sized>(
    paths: &DataPaths,
    store: &S,
    year: &str,
    keywords: &[String],
) -> Result<()> {
    let loader = AwardLoader::new(paths);
    let awards = loader
        .get_unprocessed_awards(store, year, keywords)
        .with_context(|| format!("load awards for {year}"))?;
    let staged = staged_ids(paths).context("read staging")?;
    if !interactive() {
        print_explore_listing(&awards, &staged);
        return Ok(());
    }

    let ids = awards.iter().map(|award| award.id.clone()).collect();
    let mut state = ExploreState::new(ids, staged);
    let guard = TerminalGuard::enter()?;
    let mut terminal = open_terminal()?;

    loop {
        let award = state.current().and_then(|id| find_award(&awards, id));
        terminal
            .draw(|frame| view::draw_explore(frame, &state, award))
            .context("draw explore ui")?;

        if !event::poll(Duration::from_millis(EVENT_POLL_MS)).context("poll event")? {
            continue;
        }
        let Event::Key(key) = event::read().context("read event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let action = match explore_input(key) {
            Some(Input::Quit) => break,
            Some(Input::Act(action)) => action,
            None => continue,
        };
        let (next, effect) = reduce_explore(state, action);
        state = next;
        if let Some(ExploreEffect::Stage(award_id)) = effect {
            let result = match find_award(&awards, &award_id) {
                Some(award) => stage_award(paths, award).map_err(anyhow::Error::from),
                None => Err(anyhow::anyhow!("{award_id} is not in this listing")),
            };
            if let Err(err) = result {
                let ids = state.ids.clone();
                let staged = staged_ids(paths).unwrap_or_default();
                state = reduce_explore(state, ExploreAction::Reload { ids, staged }).0;
                state.message = Some(format!("stage failed: {err:#}"));
            }
        }
    }

    drop(guard);
    terminal.show_cursor().ok();
    Ok(())
}

fn find_award<'a>(awards: &'a [AwardRecord], award_id: &str) -> Option<&'a AwardRecord> {
    awards.iter().find(|award| award.id == award_id)
}

fn print_explore_listing(awards: &[AwardRecord], staged: &std::collections::BTreeSet<String>) {
    println!("{} unprocessed awards ({} staged)", awards.len(), staged.len());
    for award in awards {
        let marker = if staged.contains(&award.id) { "*" } else { " " };
        println!(
            "{marker} {}  {}  {} <{}>",
            award.id, award.title, award.pi_name, award.pi_email
        );
    }
}
