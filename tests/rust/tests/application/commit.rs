//! Tests for ClientPanel::save_changes
//!
//! Merge order, host rewrite, server-returned canonical state, failure
//! handling and in-flight commits.

use std::time::Duration;

use pretty_assertions::assert_eq;

use clientdesk_core::{ClientUpdate, DomainEvent, PanelError};
use tests::fixtures::{client_on, scenario_client};
use tests::mocks::MockClientRepository;
use tests::panel::PanelHarness;

#[tokio::test]
async fn scenario_add_path_edit_host_commit() {
    let mut harness =
        PanelHarness::loaded(MockClientRepository::new().with_client(scenario_client())).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/y").unwrap();
    harness.panel.edit_host("c1", "b.com").unwrap();
    harness.drain_events();

    let client = harness.panel.save_changes("c1").await.unwrap();

    assert_eq!(
        harness.repo.updates(),
        vec![(
            "c1".to_string(),
            ClientUpdate {
                redirect_uris: vec![
                    "https://b.com/x".to_string(),
                    "https://b.com/y".to_string()
                ],
                host_uri: "https://b.com".to_string(),
            }
        )]
    );
    let payload = serde_json::to_value(&harness.repo.updates()[0].1).unwrap();
    assert_eq!(
        payload,
        serde_json::json!({
            "redirectUris": ["https://b.com/x", "https://b.com/y"],
            "hostUri": "https://b.com"
        })
    );

    assert_eq!(client.host_uri, "https://b.com");
    assert_eq!(client.redirect_uris, vec!["https://b.com/x", "https://b.com/y"]);

    let entry = harness.panel.entry("c1").unwrap();
    assert!(!entry.session.editable);
    assert!(!entry.session.host_editable);
    assert!(entry.session.staging.unwrap().pending_adds.is_empty());
    assert!(!entry.saving);

    let events = harness.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].notification().as_deref(),
        Some("Client was updated successfully")
    );
}

#[tokio::test]
async fn merge_keeps_staged_edits_then_additions() {
    let repo = MockClientRepository::new().with_client(client_on("c1", "Acme", "a.com", &["/a", "/b"]));
    let harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/c").unwrap();
    harness.panel.add_path("c1", "/c").unwrap();
    harness.panel.save_changes("c1").await.unwrap();

    let (_, update) = harness.repo.updates().remove(0);
    assert_eq!(
        update.redirect_uris,
        vec![
            "https://a.com/a",
            "https://a.com/b",
            "https://a.com/c",
            "https://a.com/c"
        ]
    );
    assert_eq!(update.host_uri, "https://a.com");
}

#[tokio::test]
async fn removal_of_existing_uri_is_committed() {
    let repo = MockClientRepository::new().with_client(client_on("c1", "Acme", "a.com", &["/a", "/b"]));
    let harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.remove_staged_path("c1", "https://a.com/a").unwrap();
    let client = harness.panel.save_changes("c1").await.unwrap();

    assert_eq!(client.redirect_uris, vec!["https://a.com/b"]);
    assert_eq!(
        harness.repo.stored("c1").unwrap().redirect_uris,
        vec!["https://a.com/b"]
    );
}

#[tokio::test]
async fn server_returned_list_becomes_canonical() {
    let repo = MockClientRepository::new().with_client(scenario_client());
    repo.dedup_on_update(true);
    let harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/x").unwrap();
    let client = harness.panel.save_changes("c1").await.unwrap();

    // submitted with the duplicate, stored without it
    assert_eq!(harness.repo.updates()[0].1.redirect_uris.len(), 2);
    assert_eq!(client.redirect_uris, vec!["https://a.com/x"]);
    assert_eq!(
        harness.panel.entry("c1").unwrap().client.redirect_uris,
        vec!["https://a.com/x"]
    );
}

#[tokio::test]
async fn failed_commit_keeps_session_open() {
    let repo = MockClientRepository::new().with_client(scenario_client());
    repo.fail_updates(true);
    let mut harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/y").unwrap();
    harness.panel.edit_host("c1", "b.com").unwrap();
    harness.drain_events();

    let result = harness.panel.save_changes("c1").await;
    assert!(matches!(result, Err(PanelError::Persistence(_))));

    let entry = harness.panel.entry("c1").unwrap();
    assert!(entry.session.editable);
    assert!(!entry.saving);
    assert_eq!(entry.client.host_uri, "https://a.com");
    assert_eq!(entry.client.redirect_uris, vec!["https://a.com/x"]);
    let staging = entry.session.staging.unwrap();
    assert_eq!(staging.pending_adds, vec!["https://a.com/y"]);
    assert_eq!(staging.host_copy, "b.com");

    match harness.drain_events().as_slice() {
        [DomainEvent::ClientUpdateFailed { client_id, reason }] => {
            assert_eq!(client_id, "c1");
            assert!(reason.contains("backend unavailable"));
        }
        other => panic!("Expected ClientUpdateFailed, got {:?}", other),
    }

    // manual retry once the backend recovers
    harness.repo.fail_updates(false);
    let client = harness.panel.save_changes("c1").await.unwrap();
    assert_eq!(client.redirect_uris, vec!["https://b.com/x", "https://b.com/y"]);
    assert_eq!(harness.repo.updates().len(), 2);
}

#[tokio::test]
async fn malformed_uri_rejects_host_change_commit() {
    let repo = MockClientRepository::new().with_client(
        client_on("c1", "Acme", "a.com", &["/x"])
            .with_redirect_uris(["https://a.com/x", "https://a.com"]),
    );
    let mut harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.edit_host("c1", "b.com").unwrap();
    harness.drain_events();

    let result = harness.panel.save_changes("c1").await;
    assert!(matches!(result, Err(PanelError::MalformedRedirectUri(_))));
    assert!(harness.repo.updates().is_empty(), "nothing submitted");
    assert!(harness.panel.entry("c1").unwrap().session.editable);
    assert!(matches!(
        harness.drain_events().as_slice(),
        [DomainEvent::ClientUpdateFailed { .. }]
    ));
}

#[tokio::test]
async fn malformed_uri_passes_through_without_host_change() {
    let repo = MockClientRepository::new().with_client(
        client_on("c1", "Acme", "a.com", &[]).with_redirect_uris(["https://a.com"]),
    );
    let harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/y").unwrap();
    let client = harness.panel.save_changes("c1").await.unwrap();

    assert_eq!(client.redirect_uris, vec!["https://a.com", "https://a.com/y"]);
}

#[tokio::test]
async fn second_save_while_in_flight_is_rejected() {
    let repo = MockClientRepository::new()
        .with_client(client_on("c1", "Acme", "a.com", &["/x"]))
        .with_client(client_on("c2", "Beta", "b.com", &["/y"]));
    let gate = repo.gate_updates();
    let harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/z").unwrap();

    let panel = harness.panel.clone();
    let in_flight = tokio::spawn(async move { panel.save_changes("c1").await });

    // wait until the commit is parked on the gate
    tokio::time::timeout(Duration::from_secs(5), async {
        while !harness.panel.entry("c1").unwrap().saving {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("commit should start");

    assert!(matches!(
        harness.panel.save_changes("c1").await,
        Err(PanelError::SaveInFlight(_))
    ));
    assert!(matches!(
        harness.panel.enter_edit("c1"),
        Err(PanelError::SaveInFlight(_))
    ));

    // other clients stay editable meanwhile
    harness.panel.enter_edit("c2").unwrap();
    harness.panel.add_path("c2", "/w").unwrap();
    assert!(harness.panel.has_changes("c2").unwrap());

    gate.add_permits(1);
    let client = in_flight.await.unwrap().unwrap();
    assert_eq!(client.redirect_uris, vec!["https://a.com/x", "https://a.com/z"]);
    assert!(!harness.panel.entry("c1").unwrap().saving);
    assert_eq!(harness.repo.updates().len(), 1);
}

#[tokio::test]
async fn staging_is_frozen_while_save_is_in_flight() {
    let repo = MockClientRepository::new().with_client(client_on("c1", "Acme", "a.com", &["/x"]));
    let gate = repo.gate_updates();
    let harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/z").unwrap();

    let panel = harness.panel.clone();
    let in_flight = tokio::spawn(async move { panel.save_changes("c1").await });

    tokio::time::timeout(Duration::from_secs(5), async {
        while !harness.panel.entry("c1").unwrap().saving {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("commit should start");

    assert!(matches!(
        harness.panel.add_path("c1", "/w"),
        Err(PanelError::SaveInFlight(_))
    ));
    assert!(matches!(
        harness.panel.remove_new_path("c1", "https://a.com/z"),
        Err(PanelError::SaveInFlight(_))
    ));
    assert!(matches!(
        harness.panel.remove_staged_path("c1", "https://a.com/x"),
        Err(PanelError::SaveInFlight(_))
    ));
    assert!(matches!(
        harness.panel.edit_host("c1", "b.com"),
        Err(PanelError::SaveInFlight(_))
    ));

    gate.add_permits(1);
    let client = in_flight.await.unwrap().unwrap();
    assert_eq!(client.host_uri, "https://a.com");
    assert_eq!(client.redirect_uris, vec!["https://a.com/x", "https://a.com/z"]);
}

#[tokio::test]
async fn reload_during_save_keeps_it_in_flight() {
    let repo = MockClientRepository::new().with_client(client_on("c1", "Acme", "a.com", &["/x"]));
    let gate = repo.gate_updates();
    let harness = PanelHarness::loaded(repo).await;

    harness.panel.enter_edit("c1").unwrap();
    harness.panel.add_path("c1", "/z").unwrap();

    let panel = harness.panel.clone();
    let in_flight = tokio::spawn(async move { panel.save_changes("c1").await });

    tokio::time::timeout(Duration::from_secs(5), async {
        while !harness.panel.entry("c1").unwrap().saving {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("commit should start");

    harness.panel.load().await.unwrap();
    assert!(harness.panel.entry("c1").unwrap().saving);
    assert!(matches!(
        harness.panel.enter_edit("c1"),
        Err(PanelError::SaveInFlight(_))
    ));

    gate.add_permits(1);
    let client = in_flight.await.unwrap().unwrap();
    assert_eq!(client.redirect_uris, vec!["https://a.com/x", "https://a.com/z"]);

    let entry = harness.panel.entry("c1").unwrap();
    assert!(!entry.saving);
    assert!(!entry.session.editable);
    assert_eq!(entry.client.redirect_uris, vec!["https://a.com/x", "https://a.com/z"]);
}
