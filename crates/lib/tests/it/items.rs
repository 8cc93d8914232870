use houseview::{
    normalize::Position,
    record::{ItemPatch, NewItem},
};

use crate::helpers::test_instance;

#[tokio::test]
async fn add_fills_defaults() {
    let (instance, clock) = test_instance().await;
    let _hold = clock.hold();

    let item = instance
        .items()
        .add(NewItem::new("Lamp", Position::new(1.0, 2.0, 3.0)))
        .await
        .unwrap();

    assert_eq!(item.id.len(), 10);
    assert_eq!(item.name, "Lamp");
    assert_eq!(item.description, "");
    assert_eq!(item.url, "");
    assert_eq!(item.date_added, "2024-01-01");
    assert!(item.rooms.is_empty());
    assert_eq!(item.created_at, "2024-01-01T00:00:00.000Z");
    assert_eq!(item.updated_at, None);
}

#[tokio::test]
async fn add_keeps_supplied_fields() {
    let (instance, _clock) = test_instance().await;
    let item = instance
        .items()
        .add(
            NewItem::new("Sofa", Position::new(-1.5, 0.0, 4.25))
                .with_description("green")
                .with_url("https://example.com/sofa")
                .with_date_added("2023-05-17")
                .with_rooms(["Living room"]),
        )
        .await
        .unwrap();

    let stored = instance.items().get(&item.id).await.unwrap();
    assert_eq!(stored, item);
    assert_eq!(stored.date_added, "2023-05-17");
    assert_eq!(stored.rooms, vec!["Living room"]);
    assert_eq!(stored.position, Position::new(-1.5, 0.0, 4.25));
}

#[tokio::test]
async fn list_is_in_creation_order() {
    let (instance, _clock) = test_instance().await;
    let items = instance.items();
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        ids.push(
            items
                .add(NewItem::new(name, Position::ORIGIN))
                .await
                .unwrap()
                .id,
        );
    }

    let listed: Vec<String> = items.list().await.unwrap().into_iter().map(|i| i.id).collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let (instance, clock) = test_instance().await;
    let items = instance.items();
    let item = items
        .add(NewItem::new("Lamp", Position::new(1.0, 1.0, 1.0)).with_rooms(["Office"]))
        .await
        .unwrap();

    clock.set(crate::helpers::T0 + 60_000);
    let updated = items
        .update(
            &item.id,
            ItemPatch {
                description: Some("brass".into()),
                position: Some(Position::new(2.0, 2.0, 2.0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Lamp");
    assert_eq!(updated.rooms, vec!["Office"]);
    assert_eq!(updated.description, "brass");
    assert_eq!(updated.position, Position::new(2.0, 2.0, 2.0));
    assert_eq!(updated.created_at, item.created_at);
    assert_eq!(
        updated.updated_at.as_deref(),
        Some("2024-01-01T00:01:00.000Z")
    );
    assert_eq!(items.list().await.unwrap(), vec![updated]);
}

#[tokio::test]
async fn update_unknown_item_is_not_found() {
    let (instance, _clock) = test_instance().await;
    let err = instance
        .items()
        .update("missing", ItemPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn remove_and_clear() {
    let (instance, _clock) = test_instance().await;
    let items = instance.items();
    let first = items
        .add(NewItem::new("a", Position::ORIGIN))
        .await
        .unwrap();
    for name in ["b", "c"] {
        items.add(NewItem::new(name, Position::ORIGIN)).await.unwrap();
    }

    assert!(items.remove(&first.id).await.unwrap());
    assert!(!items.remove(&first.id).await.unwrap());
    assert_eq!(items.list().await.unwrap().len(), 2);

    assert_eq!(items.clear().await.unwrap(), 2);
    assert!(items.list().await.unwrap().is_empty());
    assert_eq!(items.clear().await.unwrap(), 0);
}

#[tokio::test]
async fn concurrent_adds_are_all_kept() {
    let (instance, _clock) = test_instance().await;
    let tasks: Vec<_> = (0..16)
        .map(|n| {
            let instance = instance.clone();
            tokio::spawn(async move {
                instance
                    .items()
                    .add(NewItem::new(format!("item {n}"), Position::ORIGIN))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(instance.items().list().await.unwrap().len(), 16);
}
