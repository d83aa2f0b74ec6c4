mod helpers;

use helpers::{new_entry, sqlite_service};

use cairn::knowledge::error::KnowledgeError;
use cairn::knowledge::service::SearchOptions;
use cairn::knowledge::types::{EntryType, NewEntry, DEFAULT_RELEVANCE};

#[test]
fn end_to_end_create_and_search() {
    let service = sqlite_service();
    let created = service
        .create(
            "alice",
            NewEntry {
                entry_type: Some(EntryType::Routine),
                ..new_entry("Morning Routine", "Consistency improves outcomes")
            },
        )
        .unwrap();

    let response = service
        .search("alice", "routine consistency", &SearchOptions::default())
        .unwrap();

    let hit = response
        .results
        .iter()
        .find(|r| r.entry.id == created.id)
        .expect("created entry should appear in results");
    assert!(hit.similarity > 0.0);
    // Stored relevance (the default mid value) is distinct from the computed
    // per-query similarity
    assert_eq!(hit.entry.relevance, DEFAULT_RELEVANCE);
    assert_ne!(hit.similarity, hit.entry.relevance);
}

#[test]
fn search_orders_by_similarity() {
    let service = sqlite_service();
    service
        .create("alice", new_entry("Workout plan", "morning workout and stretching routine"))
        .unwrap();
    let best = service
        .create("alice", new_entry("Morning workout", "morning workout routine"))
        .unwrap();
    service
        .create("alice", new_entry("Tax notes", "file quarterly estimated taxes"))
        .unwrap();

    let response = service
        .search("alice", "morning workout routine", &SearchOptions::default())
        .unwrap();

    assert!(response.results.len() >= 2);
    assert_eq!(response.results[0].entry.id, best.id);
    for pair in response.results.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[test]
fn threshold_excludes_unrelated_entries() {
    let service = sqlite_service();
    service
        .create("alice", new_entry("Grocery run", "buy oat milk and coffee beans"))
        .unwrap();
    service
        .create("alice", new_entry("Unrelated", "entirely different topic words"))
        .unwrap();

    let options = SearchOptions {
        threshold: Some(0.2),
        ..Default::default()
    };
    let response = service.search("alice", "grocery oat milk coffee", &options).unwrap();

    assert!(!response.results.is_empty());
    for hit in &response.results {
        assert!(hit.similarity >= 0.2);
        assert_ne!(hit.entry.title, "Unrelated");
    }
}

#[test]
fn limit_truncates_results() {
    let service = sqlite_service();
    for i in 0..20 {
        service
            .create("alice", new_entry(&format!("Note {i}"), "shared note text for matching"))
            .unwrap();
    }

    let options = SearchOptions {
        limit: Some(5),
        ..Default::default()
    };
    let response = service.search("alice", "shared note text", &options).unwrap();

    assert_eq!(response.results.len(), 5);
    assert_eq!(response.total_matched, 20);
}

#[test]
fn type_filter_restricts_candidates() {
    let service = sqlite_service();
    service
        .create(
            "alice",
            NewEntry {
                entry_type: Some(EntryType::Routine),
                ..new_entry("Evening routine", "wind down and read")
            },
        )
        .unwrap();
    service
        .create(
            "alice",
            NewEntry {
                entry_type: Some(EntryType::Goal),
                ..new_entry("Reading goal", "read twenty books this year")
            },
        )
        .unwrap();

    let options = SearchOptions {
        entry_type: Some(EntryType::Goal),
        ..Default::default()
    };
    let response = service.search("alice", "read", &options).unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].entry.entry_type, EntryType::Goal);
}

#[test]
fn search_never_leaks_across_owners() {
    let service = sqlite_service();
    service
        .create("alice", new_entry("Secret plan", "surprise party for bob"))
        .unwrap();

    let response = service
        .search("bob", "surprise party", &SearchOptions::default())
        .unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.total_matched, 0);
}

#[test]
fn empty_owner_gets_empty_list_not_error() {
    let service = sqlite_service();
    let response = service
        .search("nobody", "anything at all", &SearchOptions::default())
        .unwrap();
    assert!(response.results.is_empty());
}

#[test]
fn blank_query_is_a_validation_error() {
    let service = sqlite_service();
    assert!(matches!(
        service.search("alice", "", &SearchOptions::default()),
        Err(KnowledgeError::Validation(_))
    ));
    assert!(matches!(
        service.search("alice", "   ", &SearchOptions::default()),
        Err(KnowledgeError::Validation(_))
    ));
}

#[test]
fn identical_text_entries_tie_break_on_relevance() {
    let service = sqlite_service();
    // Same embedded text => identical similarity for any query
    let low = service
        .create(
            "alice",
            NewEntry {
                relevance: Some(0.3),
                ..new_entry("Standup notes", "daily team standup summary")
            },
        )
        .unwrap();
    let high = service
        .create(
            "alice",
            NewEntry {
                relevance: Some(0.8),
                ..new_entry("Standup notes", "daily team standup summary")
            },
        )
        .unwrap();

    let response = service
        .search("alice", "standup summary", &SearchOptions::default())
        .unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].similarity, response.results[1].similarity);
    assert_eq!(response.results[0].entry.id, high.id);
    assert_eq!(response.results[1].entry.id, low.id);
}
