use houseview::record::{ElementPatch, ElementSyncInput};

use crate::helpers::{T0, test_instance};

fn wall(guid: &str) -> ElementSyncInput {
    ElementSyncInput::new(guid, 101, "Basic Wall", "Walls", "Concrete")
}

#[tokio::test]
async fn sync_creates_and_drops_empty_guids() {
    let (instance, clock) = test_instance().await;
    let _hold = clock.hold();

    let touched = instance
        .elements()
        .sync(vec![
            wall(" w-1 "),
            ElementSyncInput::new("   ", 5, "Ghost", "Walls", ""),
            ElementSyncInput::new("d-1", 202, "Door", "Doors", "Oak"),
        ])
        .await
        .unwrap();

    assert_eq!(touched.len(), 2);
    assert_eq!(touched[0].guid, "w-1");
    assert_eq!(touched[0].revit_id, 101);
    assert_eq!(touched[0].year_added, "");
    assert_eq!(touched[0].comment, "");
    assert_eq!(touched[0].created_at, "2024-01-01T00:00:00.000Z");
    assert_eq!(touched[0].updated_at, None);

    let guids: Vec<String> = instance
        .elements()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.guid)
        .collect();
    assert_eq!(guids, vec!["w-1", "d-1"]);
}

#[tokio::test]
async fn sync_with_nothing_usable_is_a_no_op() {
    let (instance, _clock) = test_instance().await;
    let touched = instance
        .elements()
        .sync(vec![ElementSyncInput::default()])
        .await
        .unwrap();
    assert!(touched.is_empty());
    assert!(instance.elements().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn identical_resync_keeps_updated_at_unset() {
    let (instance, clock) = test_instance().await;
    let elements = instance.elements();
    let first = elements.sync(vec![wall("w-1")]).await.unwrap();

    clock.set(T0 + 3_600_000);
    let second = elements.sync(vec![wall("w-1")]).await.unwrap();

    assert_eq!(second, first);
    assert_eq!(elements.list().await.unwrap(), first);
}

#[tokio::test]
async fn changed_resync_bumps_updated_at() {
    let (instance, clock) = test_instance().await;
    let elements = instance.elements();
    elements.sync(vec![wall("w-1")]).await.unwrap();

    clock.set(T0 + 60_000);
    let touched = elements
        .sync(vec![ElementSyncInput::new(
            "w-1",
            0,
            "Basic Wall",
            "Walls",
            "Brick",
        )])
        .await
        .unwrap();

    let element = &touched[0];
    assert_eq!(element.material, "Brick");
    // A zero revit id leaves the stored one alone.
    assert_eq!(element.revit_id, 101);
    assert_eq!(element.created_at, "2024-01-01T00:00:00.000Z");
    assert_eq!(
        element.updated_at.as_deref(),
        Some("2024-01-01T00:01:00.000Z")
    );
}

#[tokio::test]
async fn stored_originator_is_not_overwritten_by_sync() {
    let (instance, _clock) = test_instance().await;
    let elements = instance.elements();
    elements
        .sync(vec![wall("w-1").with_software_originator("Revit 2024")])
        .await
        .unwrap();

    let touched = elements
        .sync(vec![wall("w-1").with_software_originator("ArchiCAD")])
        .await
        .unwrap();
    assert_eq!(touched[0].software_originator, "Revit 2024");
    assert_eq!(touched[0].updated_at, None);

    let unset = elements.sync(vec![wall("w-2")]).await.unwrap();
    assert_eq!(unset[0].software_originator, "");
    let filled = elements
        .sync(vec![wall("w-2").with_software_originator("ArchiCAD")])
        .await
        .unwrap();
    assert_eq!(filled[0].software_originator, "ArchiCAD");
    assert!(filled[0].updated_at.is_some());
}

#[tokio::test]
async fn duplicate_guid_in_batch_merges_in_order() {
    let (instance, _clock) = test_instance().await;
    let touched = instance
        .elements()
        .sync(vec![
            wall("w-1"),
            ElementSyncInput::new("w-1", 0, "Basic Wall", "Walls", "Steel"),
        ])
        .await
        .unwrap();

    assert_eq!(touched.len(), 2);
    assert_eq!(touched[0].material, "Concrete");
    assert_eq!(touched[1].material, "Steel");
    assert_eq!(touched[1].revit_id, 101);

    let stored = instance.elements().list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], touched[1]);
}

#[tokio::test]
async fn annotation_survives_resync() {
    let (instance, clock) = test_instance().await;
    let elements = instance.elements();
    elements.sync(vec![wall("w-1")]).await.unwrap();

    clock.set(T0 + 120_000);
    let annotated = elements
        .update(
            "w-1",
            ElementPatch {
                year_added: Some(" 1998 ".into()),
                comment: Some("load bearing".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(annotated.year_added, "1998");
    assert_eq!(annotated.comment, "load bearing");
    assert_eq!(
        annotated.updated_at.as_deref(),
        Some("2024-01-01T00:02:00.000Z")
    );

    let resynced = elements.sync(vec![wall("w-1")]).await.unwrap();
    assert_eq!(resynced[0], annotated);
    assert_eq!(elements.get("w-1").await.unwrap(), annotated);
}

#[tokio::test]
async fn unknown_element_is_not_found() {
    let (instance, _clock) = test_instance().await;
    let err = instance.elements().get("nope").await.unwrap_err();
    assert!(err.is_not_found());

    let err = instance
        .elements()
        .update("nope", ElementPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

/// Two instances over one SQLite file, as two server processes would be.
#[cfg(feature = "sqlite")]
mod shared_database {
    use std::sync::Arc;

    use houseview::{
        FixedClock, Instance,
        backend::database::SqlxBackend,
        record::{ElementPatch, ElementSyncInput},
    };

    use super::wall;
    use crate::helpers::T0;

    async fn open(path: &std::path::Path, clock: Arc<FixedClock>) -> Instance {
        let backend = SqlxBackend::open_sqlite(path).await.unwrap();
        Instance::open_with_clock(Box::new(backend), clock)
    }

    fn note(guid: &str) -> ElementPatch {
        ElementPatch {
            year_added: Some("1998".into()),
            comment: Some(format!("note on {guid}")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn annotation_from_other_instance_survives_resync() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("houseview.db");
        let clock = Arc::new(FixedClock::new(T0));
        let syncer = open(&path, clock.clone()).await;
        let editor = open(&path, clock.clone()).await;

        syncer.elements().sync(vec![wall("w-1")]).await.unwrap();
        editor.elements().update("w-1", note("w-1")).await.unwrap();

        clock.set(T0 + 60_000);
        let touched = syncer
            .elements()
            .sync(vec![ElementSyncInput::new(
                "w-1",
                101,
                "Basic Wall",
                "Walls",
                "Brick",
            )])
            .await
            .unwrap();

        assert_eq!(touched[0].material, "Brick");
        assert_eq!(touched[0].comment, "note on w-1");
        assert_eq!(touched[0].year_added, "1998");
        assert_eq!(
            touched[0].updated_at.as_deref(),
            Some("2024-01-01T00:01:00.000Z")
        );
        assert_eq!(editor.elements().get("w-1").await.unwrap(), touched[0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_syncs_never_drop_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("houseview.db");
        let clock = Arc::new(FixedClock::new(T0));
        let syncer = open(&path, clock.clone()).await;
        let editor = open(&path, clock).await;

        let guids: Vec<String> = (0..12).map(|n| format!("w-{n}")).collect();
        syncer
            .elements()
            .sync(guids.iter().map(|guid| wall(guid)).collect())
            .await
            .unwrap();

        let syncing = {
            let syncer = syncer.clone();
            let guids = guids.clone();
            tokio::spawn(async move {
                for round in 0..25 {
                    let material = format!("Brick {round}");
                    let batch = guids
                        .iter()
                        .map(|guid| {
                            ElementSyncInput::new(
                                guid.as_str(),
                                101,
                                "Basic Wall",
                                "Walls",
                                material.as_str(),
                            )
                        })
                        .collect();
                    syncer.elements().sync(batch).await.unwrap();
                }
            })
        };
        let annotating = {
            let editor = editor.clone();
            let guids = guids.clone();
            tokio::spawn(async move {
                for guid in &guids {
                    editor.elements().update(guid, note(guid)).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };
        syncing.await.unwrap();
        annotating.await.unwrap();

        let stored = syncer.elements().list().await.unwrap();
        assert_eq!(stored.len(), guids.len());
        for element in stored {
            assert_eq!(element.comment, format!("note on {}", element.guid));
            assert_eq!(element.year_added, "1998");
            assert_eq!(element.material, "Brick 24");
        }
    }
}
