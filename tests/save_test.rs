//! Integration tests for writes: inserts, diffed updates, audit and events

mod common;

use common::*;
use pretty_assertions::assert_eq;
use resourcehaus::prelude::*;

fn auth() -> AuthContext {
    AuthContext::new().with_user("admin")
}

#[tokio::test]
async fn test_create_applies_defaults_and_inserts() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();

    let saved = observed_store(&sql, &audit, &publisher)
        .save(Resource::Users, record(&[("name", text("Ann"))]), &auth())
        .await
        .unwrap();

    let id = saved["id"].clone();
    assert!(matches!(id, SqlValue::Text(ref s) if s.len() == 36));
    assert_eq!(saved["status"], text("active"));
    assert_eq!(saved["name"], text("Ann"));

    assert_eq!(
        sql.executed(),
        vec![Executed {
            query: "INSERT INTO `users` (`id`, `status`, `name`) VALUES (?)".to_string(),
            params: Some(vec![SqlValue::Array(vec![
                id.clone(),
                text("active"),
                text("Ann"),
            ])]),
        }]
    );

    let id_text = id.to_text().unwrap();
    assert_eq!(
        audit.entries(),
        vec![AuditEntry::Create(AuditTarget::new("users", id_text))]
    );

    let events = publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, EventAction::Created);
    assert_eq!(events[0].resource_type, "users");
    assert_eq!(events[0].resource, saved);
}

#[tokio::test]
async fn test_save_updates_only_changed_fields() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();
    sql.respond(vec![record(&[
        ("id", text("u1")),
        ("name", text("Ann")),
        ("status", text("active")),
    ])]);

    let saved = observed_store(&sql, &audit, &publisher)
        .save(
            Resource::Users,
            record(&[("id", text("u1")), ("name", text("Bob"))]),
            &auth(),
        )
        .await
        .unwrap();

    assert_eq!(
        saved,
        record(&[
            ("id", text("u1")),
            ("name", text("Bob")),
            ("status", text("active")),
        ])
    );
    assert_eq!(
        sql.executed(),
        vec![
            Executed {
                query: "SELECT `us`.* FROM `users` AS `us` WHERE (`id` = ?)".to_string(),
                params: Some(vec![text("u1")]),
            },
            Executed {
                query: "UPDATE `users` SET `name` = ? WHERE `id` = ?".to_string(),
                params: Some(vec![text("Bob"), text("u1")]),
            },
        ]
    );

    let mut changes = ChangeSet::new();
    changes.insert(
        "name".to_string(),
        Change::Attribute {
            prev: text("Ann"),
            next: text("Bob"),
        },
    );
    assert_eq!(
        audit.entries(),
        vec![AuditEntry::Update(AuditTarget::new("users", "u1"), changes)]
    );

    let events = publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, EventAction::Updated);
    assert_eq!(
        events[0].payload()["resource"],
        serde_json::json!({"type": "users", "id": "u1", "name": "Bob", "status": "active"})
    );
}

#[tokio::test]
async fn test_unchanged_resource_is_a_noop() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();
    let stored = record(&[("id", text("u1")), ("name", text("Ann"))]);
    sql.respond(vec![stored.clone()]);

    let saved = observed_store(&sql, &audit, &publisher)
        .save(Resource::Users, stored.clone(), &auth())
        .await
        .unwrap();

    assert_eq!(saved, stored);
    assert_eq!(sql.executed().len(), 1);
    assert!(audit.entries().is_empty());
    assert!(publisher.events().is_empty());
}

fn binary_role() -> Record {
    record(&[
        ("id", SqlValue::Bytes((0u8..16).collect())),
        ("organizationId", SqlValue::Bytes((32u8..48).collect())),
        ("userId", SqlValue::Bytes((16u8..32).collect())),
        ("role", text("owner")),
    ])
}

#[tokio::test]
async fn test_saving_a_save_result_again_writes_nothing() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();
    let stored = binary_role();
    let mut changed = stored.clone();
    changed.insert("role".to_string(), text("admin"));
    sql.respond(vec![stored.clone()]);
    sql.respond(vec![]);
    sql.respond(vec![changed.clone()]);
    let store = observed_store(&sql, &audit, &publisher);

    let saved = store
        .update(
            Resource::OrgRoles,
            stored["id"].clone(),
            record(&[("role", text("admin"))]),
            &auth(),
        )
        .await
        .unwrap();
    assert_eq!(saved, changed);

    let again = store
        .save(Resource::OrgRoles, saved.clone(), &auth())
        .await
        .unwrap();

    assert_eq!(again, changed);
    let executed = sql.executed();
    assert_eq!(executed.len(), 3);
    assert_eq!(
        executed[2].params,
        Some(vec![SqlValue::Bytes((0u8..16).collect())])
    );
    assert!(executed.iter().all(|e| !e.query.contains("`userId` = ?")));
    assert_eq!(audit.entries().len(), 1);
    assert_eq!(publisher.events().len(), 1);
}

#[tokio::test]
async fn test_id_text_matching_stored_bytes_is_unchanged() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();
    let stored = binary_role();
    sql.respond(vec![stored.clone()]);

    let mut incoming = stored.clone();
    incoming.insert(
        "userId".to_string(),
        text("10111213-1415-1617-1819-1a1b1c1d1e1f"),
    );
    let saved = observed_store(&sql, &audit, &publisher)
        .save(Resource::OrgRoles, incoming, &auth())
        .await
        .unwrap();

    assert_eq!(saved, stored);
    assert_eq!(sql.executed().len(), 1);
    assert!(audit.entries().is_empty());
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn test_id_text_for_binary_relationship_is_written_as_bytes() {
    let sql = MockSql::new();
    sql.respond(vec![binary_role()]);

    let mut incoming = binary_role();
    incoming.insert(
        "userId".to_string(),
        text("20212223-2425-2627-2829-2a2b2c2d2e2f"),
    );
    store(&sql)
        .save(Resource::OrgRoles, incoming, &auth())
        .await
        .unwrap();

    assert_eq!(
        sql.executed()[1],
        Executed {
            query: "UPDATE `organization-roles` SET `userId` = ? WHERE `id` = ?".to_string(),
            params: Some(vec![
                SqlValue::Bytes((32u8..48).collect()),
                SqlValue::Bytes((0u8..16).collect()),
            ]),
        }
    );
}

#[tokio::test]
async fn test_unknown_primary_key_is_inserted() {
    let sql = MockSql::new();

    let saved = store(&sql)
        .save(
            Resource::Users,
            record(&[("id", text("u9")), ("name", text("Cy"))]),
            &auth(),
        )
        .await
        .unwrap();

    assert_eq!(saved["id"], text("u9"));
    let executed = sql.executed();
    assert_eq!(executed.len(), 2);
    assert_eq!(
        executed[1],
        Executed {
            query: "INSERT INTO `users` (`id`, `status`, `name`) VALUES (?)".to_string(),
            params: Some(vec![SqlValue::Array(vec![
                text("u9"),
                text("active"),
                text("Cy"),
            ])]),
        }
    );
}

#[tokio::test]
async fn test_relationship_changes_are_classified() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();
    sql.respond(vec![record(&[
        ("id", text("r1")),
        ("organizationId", text("o1")),
        ("userId", text("u1")),
        ("role", text("admin")),
    ])]);

    observed_store(&sql, &audit, &publisher)
        .save(
            Resource::OrgRoles,
            record(&[
                ("id", text("r1")),
                ("userId", SqlValue::Null),
                ("organizationId", text("o2")),
            ]),
            &auth(),
        )
        .await
        .unwrap();

    assert_eq!(
        sql.executed()[1],
        Executed {
            query: "UPDATE `organization-roles` SET `organizationId` = ?, `userId` = ? \
                    WHERE `id` = ?"
                .to_string(),
            params: Some(vec![text("o2"), SqlValue::Null, text("r1")]),
        }
    );

    let mut changes = ChangeSet::new();
    changes.insert(
        "organizationId".to_string(),
        Change::Relationship {
            action: ChangeAction::Changed,
            rel_type: "organizations".to_string(),
            rel_id: Some("o2".to_string()),
        },
    );
    changes.insert(
        "userId".to_string(),
        Change::Relationship {
            action: ChangeAction::Deleted,
            rel_type: "users".to_string(),
            rel_id: None,
        },
    );
    assert_eq!(
        audit.entries(),
        vec![AuditEntry::Update(AuditTarget::new("org-roles", "r1"), changes)]
    );
}

#[tokio::test]
async fn test_new_resource_relationships_are_added() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();

    let saved = observed_store(&sql, &audit, &publisher)
        .save(
            Resource::Addresses,
            record(&[("id", text("a1")), ("userId", text("u1"))]),
            &auth(),
        )
        .await
        .unwrap();

    assert_eq!(saved["userId"], text("u1"));
    assert_eq!(
        audit.entries(),
        vec![AuditEntry::Create(AuditTarget::new("addresses", "a1"))]
    );
    assert_eq!(
        sql.queries()[1],
        "INSERT INTO `addresses` (`id`, `userId`) VALUES (?)"
    );
}

#[tokio::test]
async fn test_update_merges_partial_over_stored() {
    let sql = MockSql::new();
    sql.respond(vec![record(&[
        ("petId", text("p1")),
        ("name", text("Fido")),
        ("species", text("dog")),
    ])]);

    let updated = store(&sql)
        .update(
            Resource::Pets,
            text("p1"),
            record(&[("petId", text("other")), ("name", text("Rex"))]),
            &auth(),
        )
        .await
        .unwrap();

    assert_eq!(
        updated,
        record(&[
            ("petId", text("p1")),
            ("name", text("Rex")),
            ("species", text("dog")),
        ])
    );
    assert_eq!(
        sql.executed(),
        vec![
            Executed {
                query: "SELECT `pe`.* FROM `pets` AS `pe` WHERE (`petId` = ?)".to_string(),
                params: Some(vec![text("p1")]),
            },
            Executed {
                query: "UPDATE `pets` SET `name` = ? WHERE `petId` = ?".to_string(),
                params: Some(vec![text("Rex"), text("p1")]),
            },
        ]
    );
}

#[tokio::test]
async fn test_update_of_missing_resource_is_not_found() {
    let sql = MockSql::new();

    let err = store(&sql)
        .update(
            Resource::Pets,
            text("p1"),
            record(&[("name", text("Rex"))]),
            &auth(),
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.code(), Some("RESOURCE-NOT-FOUND.PETS"));
    assert_eq!(
        err.to_string(),
        "Not found: Resource of type 'pets', petId 'p1', was not found."
    );
    assert_eq!(sql.executed().len(), 1);
}

#[tokio::test]
async fn test_update_with_binary_key() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();
    let id: Vec<u8> = (0u8..16).collect();
    sql.respond(vec![record(&[
        ("id", SqlValue::Bytes(id.clone())),
        ("name", text("Ann")),
    ])]);

    let updated = observed_store(&sql, &audit, &publisher)
        .update(
            Resource::Users,
            SqlValue::Bytes(id.clone()),
            record(&[("name", text("Bob"))]),
            &auth(),
        )
        .await
        .unwrap();

    assert_eq!(updated["id"], SqlValue::Bytes(id.clone()));
    assert_eq!(
        sql.executed()[1].params,
        Some(vec![text("Bob"), SqlValue::Bytes(id)])
    );
    assert!(matches!(
        &audit.entries()[0],
        AuditEntry::Update(target, _) if target.target_id == "000102030405060708090a0b0c0d0e0f"
    ));
    assert_eq!(
        publisher.events()[0].resource["id"],
        text("00010203-0405-0607-0809-0a0b0c0d0e0f")
    );
}

#[tokio::test]
async fn test_audit_failure_fails_the_write() {
    let sql = MockSql::new();
    let audit = RecordingAudit::failing();
    let publisher = RecordingPublisher::new();

    let err = observed_store(&sql, &audit, &publisher)
        .save(Resource::Pets, record(&[("petId", text("p1"))]), &auth())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Audit(_)));
    // The statement already ran and the event still went out
    assert_eq!(sql.executed().len(), 2);
    assert_eq!(publisher.events().len(), 1);
}

#[tokio::test]
async fn test_publish_failure_is_swallowed() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::failing();

    let saved = observed_store(&sql, &audit, &publisher)
        .save(Resource::Pets, record(&[("petId", text("p1"))]), &auth())
        .await;

    assert!(saved.is_ok());
    assert_eq!(audit.entries().len(), 1);
}

#[tokio::test]
async fn test_write_invalidates_cached_lookups() {
    let sql = MockSql::new();
    let ann = record(&[("id", text("u1")), ("name", text("Ann"))]);
    let bob = record(&[("id", text("u1")), ("name", text("Bob"))]);
    sql.respond(vec![ann.clone()]);
    sql.respond(vec![ann.clone()]);
    sql.respond(vec![]);
    sql.respond(vec![bob.clone()]);
    let store = cached_store(&sql);
    let by_id = Constraint::by("id", "u1");

    assert_eq!(store.get_one(Resource::Users, &by_id).await.unwrap(), Some(ann));
    store
        .save(Resource::Users, bob.clone(), &auth())
        .await
        .unwrap();
    assert_eq!(store.get_one(Resource::Users, &by_id).await.unwrap(), Some(bob));

    assert_eq!(sql.executed().len(), 4);
}

#[tokio::test]
async fn test_write_errors_propagate_without_events() {
    let sql = MockSql::new();
    let audit = RecordingAudit::new();
    let publisher = RecordingPublisher::new();
    sql.respond(vec![]);
    sql.fail("duplicate entry");

    let err = observed_store(&sql, &audit, &publisher)
        .save(Resource::Pets, record(&[("petId", text("p1"))]), &auth())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::DatabaseError(_)));
    assert!(audit.entries().is_empty());
    assert!(publisher.events().is_empty());
}
