// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use filemeta::{ColumnarView, Extracted};
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use parquet::arrow::ArrowWriter;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tablescope::{
    ConfigCatalog, ConfigVolumes, DisabledOracle, InspectError, InspectRequest, Inspector,
    Selection, Settings, StorageMount, StoreMounts, TableInfo, TextOracle,
};
use tempfile::TempDir;

fn parquet_bytes() -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
    ]));
    let ids: ArrayRef = Arc::new(Int64Array::from(vec![10, 20, 30]));
    let names: ArrayRef = Arc::new(StringArray::from(vec![Some("a"), None, Some("c")]));
    let batch = RecordBatch::try_new(schema.clone(), vec![ids, names]).expect("batch");
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).expect("writer");
    writer.write(&batch).expect("write");
    let _ = writer.close().expect("close");
    buffer
}

struct Recording {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextOracle for Recording {
    async fn complete(&self, prompt: &str) -> tablescope::Result<String> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        Ok("- three rows".to_string())
    }
}

struct Fixture {
    scratch: TempDir,
    catalog: Arc<ConfigCatalog>,
    volumes: Arc<ConfigVolumes>,
    objects: Arc<StoreMounts>,
}

impl Fixture {
    async fn new() -> Self {
        let store = Arc::new(InMemory::new());
        let parquet = parquet_bytes();
        let objects = [
            ("vol1/db/t1/data/part-0.parquet", parquet.clone()),
            ("vol1/db/t1/data/part-0.parquet.crc", b"crc".to_vec()),
            ("vol1/db/t1/metadata/v1.metadata.json", br#"{"format-version":2}"#.to_vec()),
            ("vol1/db/t10/data/part-0.parquet", parquet),
            ("vol1/db/t2/data/part-0.orc", b"orc".to_vec()),
            (
                "vol1/db/t3/events.ndjson",
                b"{\"a\":1}\n{\"b\":2}\nnot-json\n".to_vec(),
            ),
        ];
        for (key, data) in objects {
            let _ = store
                .put(&StorePath::from(key), PutPayload::from(data))
                .await
                .expect("put");
        }
        let mut mounts = StoreMounts::new();
        mounts.insert("M1", store, "");

        let mut catalog = ConfigCatalog::new();
        for (name, base) in [("DB.PUBLIC.T1", "db/t1/"), ("DB.PUBLIC.T2", "db/t2"), ("DB.PUBLIC.T3", "db/t3")] {
            catalog.insert(
                TableInfo {
                    name: name.to_string(),
                    row_count: Some(3),
                    is_external: true,
                    ..Default::default()
                },
                format!("create iceberg table {name}\n EXTERNAL_VOLUME = 'VOL1'\n BASE_LOCATION = '{base}';"),
            );
        }
        catalog.insert(
            TableInfo {
                name: "DB.PUBLIC.LOST".to_string(),
                is_external: true,
                ..Default::default()
            },
            "EXTERNAL_VOLUME = 'NOWHERE' BASE_LOCATION = 'x'".to_string(),
        );

        let volumes = ConfigVolumes::new(
            BTreeMap::from([("VOL1".to_string(), "store://bkt/vol1/".to_string())]),
            vec![StorageMount::new("M1", "store://bkt")],
        );

        Self {
            scratch: TempDir::new().expect("scratch root"),
            catalog: Arc::new(catalog),
            volumes: Arc::new(volumes),
            objects: Arc::new(mounts),
        }
    }

    fn inspector(&self, oracle: Arc<dyn TextOracle>) -> Inspector {
        Inspector::new(
            self.catalog.clone(),
            self.volumes.clone(),
            self.objects.clone(),
            oracle,
        )
        .with_settings(Settings {
            scratch_root: Some(self.scratch.path().to_path_buf()),
            ..Default::default()
        })
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path())
            .expect("read scratch root")
            .next()
            .is_none()
    }
}

#[tokio::test]
async fn test_locate_and_list() {
    let fixture = Fixture::new().await;
    let inspector = fixture.inspector(Arc::new(DisabledOracle));

    let location = inspector.locate("DB.PUBLIC.T1").await.expect("locate");
    assert_eq!(location.resolved.mount_id, "M1");
    assert_eq!(location.resolved.relative_prefix, "vol1/db/t1");
    assert_eq!(location.resolved.list_pattern, "^vol1/db/t1(/.*)?$");

    let files = inspector.list_files(&location).await.expect("list");
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["vol1/db/t1/data/part-0.parquet", "vol1/db/t1/metadata/v1.metadata.json"]
    );
}

#[tokio::test]
async fn test_inspect_parquet_with_summary() {
    let fixture = Fixture::new().await;
    let oracle = Arc::new(Recording {
        prompts: Mutex::new(Vec::new()),
    });
    let inspector = fixture.inspector(oracle.clone());

    let report = inspector
        .inspect(&InspectRequest {
            table: "DB.PUBLIC.T1".to_string(),
            selection: Some(Selection::Search("PART-0".to_string())),
            view: ColumnarView::Both,
            summarize: true,
        })
        .await
        .expect("inspect");

    match &report.content {
        Extracted::Columnar { metadata, sample } => {
            assert_eq!(metadata.overview.row_count, 3);
            assert_eq!(metadata.overview.column_count, 2);
            assert_eq!(metadata.row_groups[0].columns[1].null_count, Some(1));
            assert!(sample.as_ref().is_some_and(|s| s.rows == 3));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(report.summary.as_deref(), Some("- three rows"));
    let prompts = oracle.prompts.lock().expect("lock");
    assert!(prompts[0].contains("row_count"));
    assert!(fixture.scratch_is_empty());
}

#[tokio::test]
async fn test_inspect_loose_records_with_failed_summary() {
    let fixture = Fixture::new().await;
    let inspector = fixture.inspector(Arc::new(DisabledOracle));

    let report = inspector
        .inspect(&InspectRequest {
            table: "DB.PUBLIC.T3".to_string(),
            summarize: true,
            ..Default::default()
        })
        .await
        .expect("inspect");

    match &report.content {
        Extracted::Records(records) => {
            assert_eq!(records.len(), 3);
            assert_eq!(records.malformed_count(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(report.summary.as_deref().is_some_and(|s| s.contains("skipped")));
    assert!(fixture.scratch_is_empty());
}

#[tokio::test]
async fn test_ambiguous_selection_lists_candidates() {
    let fixture = Fixture::new().await;
    let inspector = fixture.inspector(Arc::new(DisabledOracle));

    let err = inspector
        .inspect(&InspectRequest {
            table: "DB.PUBLIC.T1".to_string(),
            ..Default::default()
        })
        .await
        .expect_err("two files");
    match err {
        InspectError::AmbiguousSelection { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_unsupported_format_leaves_no_scratch() {
    let fixture = Fixture::new().await;
    let inspector = fixture.inspector(Arc::new(DisabledOracle));

    let err = inspector
        .inspect(&InspectRequest {
            table: "DB.PUBLIC.T2".to_string(),
            ..Default::default()
        })
        .await
        .expect_err("orc");
    assert!(matches!(err, InspectError::UnsupportedFormat { ref extension, .. } if extension == "orc"));
    assert!(err.is_fatal_lookup());
    assert!(fixture.scratch_is_empty());
}

#[tokio::test]
async fn test_unknown_volume_is_fatal() {
    let fixture = Fixture::new().await;
    let inspector = fixture.inspector(Arc::new(DisabledOracle));

    let err = inspector.locate("DB.PUBLIC.LOST").await.expect_err("volume");
    assert!(matches!(err, InspectError::VolumeNotFound { ref volume } if volume == "NOWHERE"));
}

#[tokio::test]
async fn test_extraction_failure_still_cleans_scratch() {
    let fixture = Fixture::new().await;
    let store = Arc::new(InMemory::new());
    let _ = store
        .put(
            &StorePath::from("vol1/db/t1/data/broken.parquet"),
            PutPayload::from(b"not parquet".to_vec()),
        )
        .await
        .expect("put");
    let mut mounts = StoreMounts::new();
    mounts.insert("M1", store, "");

    let inspector = Inspector::new(
        fixture.catalog.clone(),
        fixture.volumes.clone(),
        Arc::new(mounts),
        Arc::new(DisabledOracle),
    )
    .with_settings(Settings {
        scratch_root: Some(fixture.scratch.path().to_path_buf()),
        ..Default::default()
    });

    let err = inspector
        .inspect(&InspectRequest {
            table: "DB.PUBLIC.T1".to_string(),
            ..Default::default()
        })
        .await
        .expect_err("broken file");
    assert!(matches!(err, InspectError::Extract(_)));
    assert!(fixture.scratch_is_empty());
}
