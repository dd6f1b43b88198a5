use std::collections::HashSet;
use std::time::{Duration, Instant};

use bookshelf_manager::view::NO_MATCH_MESSAGE;
use bookshelf_manager::{
    BookDraft, BookRecord, Bookshelf, Bucket, CardAction, Dispatched, MemoryStore,
    PersistenceBridge,
};

fn empty_shelf() -> Bookshelf<MemoryStore> {
    Bookshelf::open(PersistenceBridge::new(MemoryStore::new())).unwrap()
}

fn add(shelf: &mut Bookshelf<MemoryStore>, title: &str, done: bool) -> BookRecord {
    shelf
        .add(&BookDraft::new(title, "Frank Herbert", "1965", done))
        .unwrap()
}

fn bucket_ids(shelf: &Bookshelf<MemoryStore>, bucket: Bucket) -> Vec<i64> {
    shelf.view().bucket(bucket).ids()
}

#[test]
fn ids_stay_unique_across_adds_and_deletes() {
    let mut shelf = empty_shelf();
    let mut seen = HashSet::new();
    for n in 0..20 {
        let book = add(&mut shelf, &format!("Book {n}"), n % 2 == 0);
        assert!(seen.insert(book.id), "id {} handed out twice", book.id);
        if n % 3 == 0 {
            shelf.delete(book.id);
        }
    }
}

#[test]
fn full_render_partitions_the_collection() {
    let mut shelf = empty_shelf();
    for (n, done) in [false, true, true, false, true].into_iter().enumerate() {
        add(&mut shelf, &format!("Book {n}"), done);
    }

    let incomplete = bucket_ids(&shelf, Bucket::Incomplete);
    let complete = bucket_ids(&shelf, Bucket::Complete);

    let incomplete_set: HashSet<i64> = incomplete.iter().copied().collect();
    let complete_set: HashSet<i64> = complete.iter().copied().collect();
    assert!(incomplete_set.is_disjoint(&complete_set));

    let all: HashSet<i64> = shelf.books().iter().map(|book| book.id).collect();
    let union: HashSet<i64> = incomplete_set.union(&complete_set).copied().collect();
    assert_eq!(union, all);

    // order within each bucket follows the collection
    let expected: Vec<i64> = shelf
        .books()
        .iter()
        .filter(|book| !book.is_complete)
        .map(|book| book.id)
        .collect();
    assert_eq!(incomplete, expected);
}

#[test]
fn rendering_twice_changes_nothing() {
    let mut shelf = empty_shelf();
    add(&mut shelf, "Dune", false);
    add(&mut shelf, "Emma", true);

    let before = shelf.view().clone();
    shelf.show_all();
    assert_eq!(
        shelf.view().bucket(Bucket::Incomplete),
        before.bucket(Bucket::Incomplete)
    );
    assert_eq!(
        shelf.view().bucket(Bucket::Complete),
        before.bucket(Bucket::Complete)
    );
}

#[test]
fn search_tie_break_prefers_incomplete() {
    let mut shelf = empty_shelf();
    let dune = add(&mut shelf, "Dune", false);
    let messiah = add(&mut shelf, "Dune Messiah", true);
    shelf.activate(Bucket::Complete);

    shelf.search("dune");

    assert_eq!(bucket_ids(&shelf, Bucket::Incomplete), vec![dune.id]);
    assert_eq!(bucket_ids(&shelf, Bucket::Complete), vec![messiah.id]);
    assert_eq!(shelf.view().active(), Bucket::Incomplete);
    match shelf.view().projection() {
        bookshelf_manager::view::Projection::Filtered { match_count, .. } => {
            assert_eq!(*match_count, 2)
        }
        other => panic!("expected a filtered projection, got {other:?}"),
    }
}

#[test]
fn search_with_only_finished_matches_activates_finished() {
    let mut shelf = empty_shelf();
    add(&mut shelf, "Emma", false);
    add(&mut shelf, "Dune Messiah", true);

    shelf.search("messiah");
    assert_eq!(shelf.view().active(), Bucket::Complete);
}

#[test]
fn delete_removes_exactly_one() {
    let mut shelf = empty_shelf();
    add(&mut shelf, "Dune", false);
    let target = add(&mut shelf, "Emma", true);
    add(&mut shelf, "Ulysses", false);

    assert_eq!(
        shelf.dispatch(target.id, CardAction::Delete),
        Dispatched::Deleted(target.clone())
    );
    assert_eq!(shelf.books().len(), 2);
    assert!(shelf.find_by_id(target.id).is_none());

    let snapshot = shelf.books().to_vec();
    assert_eq!(shelf.delete(target.id), None);
    assert_eq!(shelf.books(), snapshot.as_slice());
}

#[test]
fn no_match_shows_empty_state_then_reverts() {
    let mut shelf = empty_shelf();
    add(&mut shelf, "Dune", false);
    add(&mut shelf, "Emma", true);
    let start = Instant::now();

    shelf.search_at("zzz-nomatch", start);

    let view = shelf.view();
    assert!(view.bucket(Bucket::Incomplete).is_empty());
    assert!(view.bucket(Bucket::Complete).is_empty());
    assert_eq!(
        view.bucket(Bucket::Incomplete).empty_message.as_deref(),
        Some(NO_MATCH_MESSAGE)
    );
    assert_eq!(view.active(), Bucket::Incomplete);

    assert_eq!(shelf.tick_at(start + Duration::from_millis(1000)), 0);
    assert!(shelf.view().is_filtered());

    assert_eq!(shelf.tick_at(start + Duration::from_millis(1500)), 1);
    assert!(!shelf.view().is_filtered());
    assert_eq!(shelf.view().bucket(Bucket::Incomplete).len(), 1);
    assert_eq!(shelf.view().bucket(Bucket::Complete).len(), 1);
    assert_eq!(shelf.view().active(), Bucket::Incomplete);
}

#[test]
fn configured_revert_delay_is_used() {
    let mut shelf = empty_shelf().with_revert_delay(Duration::from_millis(100));
    add(&mut shelf, "Dune", false);
    let start = Instant::now();
    shelf.search_at("nothing", start);
    assert_eq!(shelf.tick_at(start + Duration::from_millis(100)), 1);
}

#[test]
fn mutation_during_filter_returns_to_full_view() {
    let mut shelf = empty_shelf();
    let dune = add(&mut shelf, "Dune", false);
    add(&mut shelf, "Emma", false);

    shelf.search("dune");
    assert_eq!(shelf.view().bucket(Bucket::Incomplete).len(), 1);

    shelf.toggle_complete(dune.id);
    assert!(!shelf.view().is_filtered());
    assert_eq!(bucket_ids(&shelf, Bucket::Complete), vec![dune.id]);
}
