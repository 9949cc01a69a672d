mod common;

use common::MemoryPassbolt;
use std::sync::Arc;
use terraform_provider_passbolt::{ManagedResource, PasswordModel, PasswordResource};
use tfpb_core::Value;
use tfpb_passbolt::{permission_types, Aro, PassboltError};

fn plan() -> PasswordModel {
    PasswordModel {
        name: "db".into(),
        username: "admin".into(),
        uri: "https://db.example.com".into(),
        password: "x".into(),
        ..Default::default()
    }
}

async fn created(remote: &Arc<MemoryPassbolt>, model: PasswordModel) -> PasswordModel {
    let resp = PasswordResource::new(remote.clone()).create(model).await;
    assert!(!resp.has_error(), "{:?}", resp.diagnostics);
    resp.state.unwrap()
}

#[tokio::test]
async fn bad_uri_never_reaches_the_server() {
    let remote = MemoryPassbolt::new();
    let resp = PasswordResource::new(remote.clone())
        .create(PasswordModel {
            uri: "db.example.com".into(),
            ..plan()
        })
        .await;
    assert!(resp.has_error());
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn read_after_remote_delete_drops_state() {
    let remote = MemoryPassbolt::new();
    let state = created(&remote, plan()).await;
    remote.remove_resource(state.id.value_str());

    let resp = PasswordResource::new(remote.clone()).read(state).await;
    assert!(resp.state.is_none());
    assert!(resp.diagnostics.is_empty());
}

#[tokio::test]
async fn description_only_change_deletes_then_creates() {
    let remote = MemoryPassbolt::new();
    let state = created(&remote, plan()).await;
    remote.clear_calls();

    let next = PasswordModel {
        description: Value::string("primary database"),
        ..state.clone()
    };
    let updated = PasswordResource::new(remote.clone())
        .update(next, state.clone())
        .await
        .state
        .unwrap();

    assert_eq!(
        remote.calls(),
        vec!["get_resource", "delete_resource", "create_resource"]
    );
    assert_ne!(updated.id, state.id);
    assert_eq!(remote.resource_count(), 1);
    assert_eq!(updated.description, Value::string("primary database"));
}

#[tokio::test]
async fn unchanged_plan_makes_no_mutation() {
    let remote = MemoryPassbolt::new();
    let state = created(&remote, plan()).await;
    remote.clear_calls();

    let resp = PasswordResource::new(remote.clone())
        .update(state.clone(), state.clone())
        .await;
    assert_eq!(resp.state, Some(state));
    assert_eq!(remote.calls(), vec!["get_resource"]);
}

#[tokio::test]
async fn recreate_failure_leaves_entry_absent() {
    let remote = MemoryPassbolt::new();
    let state = created(&remote, plan()).await;
    remote.fail_next("create_resource", PassboltError::server("unavailable"));

    let resp = PasswordResource::new(remote.clone())
        .update(
            PasswordModel {
                password: "y".into(),
                ..state.clone()
            },
            state.clone(),
        )
        .await;
    assert!(resp.state.is_none());
    assert_eq!(remote.resource_count(), 0);
    let d = resp.diagnostics.iter().next().unwrap();
    assert!(d.detail.contains(state.id.value_str()));
}

#[tokio::test]
async fn missing_folder_on_update_keeps_old_entry() {
    let remote = MemoryPassbolt::new();
    let state = created(&remote, plan()).await;

    let resp = PasswordResource::new(remote.clone())
        .update(
            PasswordModel {
                folder_parent: Value::string("Nowhere"),
                ..state.clone()
            },
            state.clone(),
        )
        .await;
    assert_eq!(resp.state, Some(state.clone()));
    assert!(remote.resource(state.id.value_str()).is_some());
    assert!(!remote.calls().contains(&"delete_resource".to_string()));
}

#[tokio::test]
async fn share_goes_to_resolved_group() {
    let remote = MemoryPassbolt::new();
    remote.add_group("Devs");
    let ops_id = remote.add_group("Ops");

    let state = created(
        &remote,
        PasswordModel {
            share_group: Value::string("Ops"),
            ..plan()
        },
    )
    .await;
    let shares = remote.resource(state.id.value_str()).unwrap().shares;
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].aro, Aro::Group);
    assert_eq!(shares[0].aro_id, ops_id);
    assert_eq!(shares[0].permission_type, permission_types::READ);
}

#[tokio::test]
async fn duplicate_folder_names_still_resolve() {
    let remote = MemoryPassbolt::new();
    let first = remote.add_folder("Infra", None);
    let second = remote.add_folder("Infra", None);

    let state = created(
        &remote,
        PasswordModel {
            folder_parent: Value::string("Infra"),
            ..plan()
        },
    )
    .await;
    let parent = remote
        .resource(state.id.value_str())
        .unwrap()
        .entry
        .folder_parent_id
        .unwrap();
    assert!(parent == first || parent == second);
}

#[tokio::test]
async fn folder_lookup_failure_on_read_keeps_prior_name() {
    let remote = MemoryPassbolt::new();
    remote.add_folder("Infra", None);
    let state = created(
        &remote,
        PasswordModel {
            folder_parent: Value::string("Infra"),
            ..plan()
        },
    )
    .await;
    remote.fail_next("list_folders", PassboltError::server("flaky"));

    let read = PasswordResource::new(remote.clone())
        .read(state.clone())
        .await
        .state
        .unwrap();
    assert_eq!(read.folder_parent, Value::string("Infra"));
}
