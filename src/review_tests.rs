use super::*;
use crate::record::sample_record;
use crate::store::MemoryStore;

fn drafts(ids: &[&str]) -> ReviewState {
    ReviewState::new(
        Collection::Drafts,
        ids.iter().map(|id| id.to_string()).collect(),
    )
}

#[test]
fn approve_and_skip_move_drafts() {
    let store = MemoryStore::new();
    store.write(Collection::Drafts, &sample_record("1")).expect("write");
    store.write(Collection::Drafts, &sample_record("2")).expect("write");

    assert_eq!(
        apply_decision(&store, "1", Decision::Approve).expect("approve"),
        Collection::Approved
    );
    assert_eq!(
        apply_decision(&store, "2", Decision::Skip).expect("skip"),
        Collection::Skipped
    );
    assert_eq!(store.locate("1").expect("locate"), Some(Collection::Approved));
    assert_eq!(store.locate("2").expect("locate"), Some(Collection::Skipped));
    assert!(store.list(Collection::Drafts).expect("list").is_empty());
}

#[test]
fn decisions_only_apply_to_drafts() {
    let store = MemoryStore::new();
    store.write(Collection::Sent, &sample_record("9")).expect("write");
    let err = apply_decision(&store, "9", Decision::Skip).expect_err("sent is terminal");
    assert!(matches!(
        err,
        OutreachError::InvalidTransition {
            collection: Collection::Sent,
            ..
        }
    ));
    let err = apply_decision(&store, "missing", Decision::Approve).expect_err("absent");
    assert!(matches!(err, OutreachError::NotFound { .. }));
}

#[test]
fn edit_rewrites_in_place() {
    let store = MemoryStore::new();
    store.write(Collection::Approved, &sample_record("3")).expect("write");
    let edited = edit_record(&store, Collection::Approved, "3", " New subject ", "New body\n\n")
        .expect("edit");
    assert_eq!(edited.subject, "New subject");
    assert_eq!(edited.body, "New body");
    assert_eq!(store.locate("3").expect("locate"), Some(Collection::Approved));
    let stored = store
        .read(Collection::Approved, "3")
        .expect("read")
        .expect("present");
    assert_eq!(stored.generated_at, sample_record("3").generated_at);
    assert_eq!(stored.body, "New body");
}

#[test]
fn sent_records_are_not_editable() {
    let store = MemoryStore::new();
    store.write(Collection::Sent, &sample_record("4")).expect("write");
    assert!(edit_record(&store, Collection::Sent, "4", "s", "b").is_err());
    assert_eq!(
        store
            .read(Collection::Sent, "4")
            .expect("read")
            .expect("present"),
        sample_record("4")
    );
}

#[test]
fn edit_buffer_round_trip() {
    let record = sample_record("5");
    let buffer = edit_buffer(&record);
    let (subject, body) = parse_edit_buffer(&buffer).expect("parse");
    assert_eq!(subject, record.subject);
    assert_eq!(body, record.body);
    assert!(parse_edit_buffer("no subject header\n\nbody").is_none());
    assert!(parse_edit_buffer("Subject: hi\n\n   \n").is_none());
}

#[test]
fn navigation_clamps_at_both_ends() {
    let state = drafts(&["a", "b"]);
    let (state, effect) = reduce_review(state, ReviewAction::Prev);
    assert_eq!(state.index, 0);
    assert!(effect.is_none());
    let (state, _) = reduce_review(state, ReviewAction::Next);
    let (state, _) = reduce_review(state, ReviewAction::Next);
    assert_eq!(state.current(), Some("b"));
}

#[test]
fn approve_emits_effect_and_advances_listing() {
    let state = drafts(&["a", "b", "c"]);
    let (state, _) = reduce_review(state, ReviewAction::Next);
    let (state, effect) = reduce_review(state, ReviewAction::Approve);
    assert_eq!(effect, Some(ReviewEffect::Approve("b".to_string())));
    assert_eq!(state.ids, vec!["a", "c"]);
    assert_eq!(state.current(), Some("c"));

    let (state, effect) = reduce_review(state, ReviewAction::Skip);
    assert_eq!(effect, Some(ReviewEffect::Skip("c".to_string())));
    assert_eq!(state.current(), Some("a"));

    let (state, _) = reduce_review(state, ReviewAction::Skip);
    assert!(state.is_empty());
    let (state, effect) = reduce_review(state, ReviewAction::Approve);
    assert!(effect.is_none());
    assert_eq!(state.message.as_deref(), Some("nothing to review"));
}

#[test]
fn non_draft_listings_do_not_emit_decisions() {
    let state = ReviewState::new(Collection::Approved, vec!["a".to_string()]);
    let (state, effect) = reduce_review(state, ReviewAction::Approve);
    assert!(effect.is_none());
    assert_eq!(state.ids, vec!["a"]);
    let (_, effect) = reduce_review(state, ReviewAction::Edit);
    assert_eq!(effect, Some(ReviewEffect::Edit("a".to_string())));

    let sent = ReviewState::new(Collection::Sent, vec!["s".to_string()]);
    let (_, effect) = reduce_review(sent, ReviewAction::Edit);
    assert!(effect.is_none());
}

#[test]
fn reload_clamps_index() {
    let state = drafts(&["a", "b", "c"]);
    let (state, _) = reduce_review(state, ReviewAction::Next);
    let (state, _) = reduce_review(state, ReviewAction::Next);
    let (state, _) = reduce_review(state, ReviewAction::Reload(vec!["a".to_string()]));
    assert_eq!(state.index, 0);
    assert_eq!(state.current(), Some("a"));
}

#[test]
fn explore_stages_each_award_once() {
    let state = ExploreState::new(
        vec!["1".to_string(), "2".to_string()],
        BTreeSet::from(["2".to_string()]),
    );
    let (state, effect) = reduce_explore(state, ExploreAction::Stage);
    assert_eq!(effect, Some(ExploreEffect::Stage("1".to_string())));
    assert_eq!(state.current(), Some("2"));
    let (state, effect) = reduce_explore(state, ExploreAction::Stage);
    assert!(effect.is_none());
    assert_eq!(state.message.as_deref(), Some("2 already staged"));
    let (state, _) = reduce_explore(state, ExploreAction::Prev);
    let (_, effect) = reduce_explore(state, ExploreAction::Stage);
    assert!(effect.is_none());
}
