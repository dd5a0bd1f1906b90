//! End-to-end pipeline tests: mute filtering, deduplication, and triage
//! against the in-memory store.

mod common;

use common::fixtures::{arxiv_candidate, doi_candidate, World};
use imfeed_domain::{CandidateResult, Library, MuteRuleKind};

#[test]
fn same_doi_across_two_batches_is_accepted_once() {
    let world = World::new();
    let first = world
        .fetcher
        .send_to_inbox(&[doi_candidate("Paper", "10.1234/x")]);
    let second = world
        .fetcher
        .send_to_inbox(&[doi_candidate("Paper again", "10.1234/x")]);
    assert_eq!((first, second), (1, 0));
    assert_eq!(world.store.publications().unwrap().len(), 1);
}

#[test]
fn same_doi_within_one_batch_is_accepted_once() {
    let world = World::new();
    let batch = [
        doi_candidate("Paper", "10.1234/x"),
        doi_candidate("Paper mirror", "https://doi.org/10.1234/X"),
    ];
    assert_eq!(world.fetcher.send_to_inbox(&batch), 1);
}

#[test]
fn results_without_identifiers_are_never_deduplicated() {
    let world = World::new();
    let batch = [
        CandidateResult::new("manual", "Untracked note"),
        CandidateResult::new("manual", "Another untracked note"),
    ];
    assert_eq!(world.fetcher.send_to_inbox(&batch), 2);
}

#[test]
fn muted_author_is_filtered_before_persistence() {
    let world = World::new();
    world.inbox.mute(MuteRuleKind::Author, "Einstein").unwrap();

    let muted = CandidateResult::new("arxiv", "Relativity")
        .with_authors(vec!["Albert Einstein".to_string()]);
    assert_eq!(world.fetcher.send_to_inbox(&[muted]), 0);
    assert!(world.store.publications().unwrap().is_empty());

    let kept = CandidateResult::new("arxiv", "Principia")
        .with_authors(vec!["Newton, I.".to_string()]);
    assert_eq!(world.fetcher.send_to_inbox(&[kept]), 1);
}

#[test]
fn muted_arxiv_category_matches_category_segment_prefix() {
    let world = World::new();
    world
        .inbox
        .mute(MuteRuleKind::ArxivCategory, "astro-ph")
        .unwrap();

    assert_eq!(
        world
            .fetcher
            .send_to_inbox(&[arxiv_candidate("CMB", "astro-ph.CO/2024.12345")]),
        0
    );
    assert_eq!(
        world
            .fetcher
            .send_to_inbox(&[arxiv_candidate("QCD", "hep-ph/2024.12345")]),
        1
    );
}

#[test]
fn batch_of_three_with_one_muted_accepts_two() {
    let world = World::new();
    world.inbox.mute(MuteRuleKind::Venue, "Predatory").unwrap();

    let batch = [
        doi_candidate("A", "10.1/a"),
        doi_candidate("B", "10.1/b").with_venue("Predatory Letters"),
        doi_candidate("C", "10.1/c"),
    ];
    assert_eq!(world.fetcher.send_to_inbox(&batch), 2);
}

#[test]
fn accepted_results_are_unread_inbox_members() {
    let world = World::new();
    world
        .fetcher
        .send_to_inbox(&[doi_candidate("A", "10.1/a"), doi_candidate("B", "10.1/b")]);

    let inbox_id = world.inbox.inbox_id().unwrap();
    for publication in world.store.publications().unwrap() {
        assert!(publication.is_in_library(inbox_id));
        assert!(!publication.is_read);
    }
    assert_eq!(world.inbox.unread_count(), 2);
    assert_eq!(world.inbox.recompute_unread_count().unwrap(), 2);
}

#[test]
fn dismissing_an_inbox_only_publication_deletes_it() {
    let world = World::new();
    world
        .fetcher
        .send_to_inbox(&[doi_candidate("A", "10.1/a")]);
    let publication = world.store.publications().unwrap().remove(0);

    world.inbox.dismiss_from_inbox(publication.id).unwrap();
    assert!(world.store.publication(publication.id).unwrap().is_none());
}

#[test]
fn kept_publication_survives_dismissal_in_its_new_library() {
    let world = World::new();
    world
        .fetcher
        .send_to_inbox(&[doi_candidate("A", "10.1/a")]);
    let publication = world.store.publications().unwrap().remove(0);

    let shelf = Library::new("Reading list", 0);
    let shelf_id = shelf.id;
    world.store.insert_library(shelf).unwrap();

    world.inbox.keep_to_library(publication.id, shelf_id).unwrap();
    world.inbox.dismiss_from_inbox(publication.id).unwrap();

    let survivor = world.store.publication(publication.id).unwrap().unwrap();
    assert!(survivor.is_in_library(shelf_id));
    assert!(!survivor.is_in_library(world.inbox.inbox_id().unwrap()));
}

#[test]
fn cache_reload_sees_externally_inserted_publications() {
    let world = World::new();
    let ext_one = doi_candidate("External one", "10.9/ext1");
    let ext_two = doi_candidate("External two", "10.9/ext2");
    for candidate in [&ext_one, &ext_two] {
        world
            .store
            .insert_publication(imfeed_domain::Publication::from_candidate(candidate))
            .unwrap();
    }

    // The cache was never told about the external writes.
    assert_eq!(world.fetcher.send_to_inbox(&[ext_one]), 1);

    world.cache.load_from_store(world.store.as_ref()).unwrap();
    assert_eq!(world.fetcher.send_to_inbox(&[ext_two]), 0);
}

#[test]
fn unread_counter_agrees_with_recount_after_triage() {
    let world = World::new();
    world.fetcher.send_to_inbox(&[
        doi_candidate("A", "10.1/a"),
        doi_candidate("B", "10.1/b"),
        doi_candidate("C", "10.1/c"),
    ]);
    let publications = world.store.publications().unwrap();

    let shelf = Library::new("Kept", 0);
    let shelf_id = shelf.id;
    world.store.insert_library(shelf).unwrap();

    world.inbox.mark_as_read(publications[0].id).unwrap();
    world
        .inbox
        .keep_to_library(publications[1].id, shelf_id)
        .unwrap();
    world.inbox.dismiss_from_inbox(publications[1].id).unwrap();
    world.inbox.dismiss_from_inbox(publications[2].id).unwrap();

    assert_eq!(
        world.inbox.unread_count(),
        world.inbox.recompute_unread_count().unwrap()
    );
}
