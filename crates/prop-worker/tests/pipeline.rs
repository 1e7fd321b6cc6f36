//! End-to-end pipeline tests: job tasks against a mocked provider, the
//! in-memory store, and the in-memory media store.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prop_db::MemoryStore;
use prop_models::{
    AspectRatio, EditMode, EditStatus, ImageEditRecord, Project, ProjectStatus, RoomType, RunId,
    RunStep, VideoClip, VideoProject, WorkspaceId,
};
use prop_provider::{ProviderClient, ProviderConfig};
use prop_storage::{MediaStore, MemoryMediaStore, StorageError, StorageResult};
use prop_worker::{
    run_clip_job, run_inpaint_job, sweep_once, ClipJobPayload, EditRequest, InpaintJobPayload,
    TaskRunner, WorkerConfig, WorkerContext, WorkerError, STALE_MESSAGE,
};

struct Harness {
    server: MockServer,
    ctx: Arc<WorkerContext>,
    media: MemoryMediaStore,
}

async fn harness() -> Harness {
    harness_with_media(MemoryMediaStore::default()).await
}

async fn harness_with_media(media: MemoryMediaStore) -> Harness {
    let server = MockServer::start().await;

    let provider = ProviderClient::new(ProviderConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout: Duration::from_secs(30),
    })
    .unwrap();

    let store = Arc::new(MemoryStore::new());
    let ctx = Arc::new(WorkerContext::new(
        store,
        provider,
        Arc::new(media.clone()),
        WorkerConfig::default(),
    ));

    Harness { server, ctx, media }
}

fn mask_data_url() -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode([0u8, 1, 2, 3])
    )
}

/// Mount a provider that accepts the task and completes on the first poll,
/// returning media hosted by the same mock server.
async fn mount_completing_provider(server: &MockServer, media_path: &str, media_bytes: &[u8]) {
    Mock::given(method("POST"))
        .and(path("/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": { "task_id": "t-1" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/getTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": {
                "task_id": "t-1",
                "status": "completed",
                "output": { "images": [{ "url": format!("{}{}", server.uri(), media_path) }] }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(media_bytes.to_vec()))
        .mount(server)
        .await;
}

async fn seed_project_with_root(
    ctx: &WorkerContext,
    mode: EditMode,
) -> (Project, ImageEditRecord) {
    let workspace_id = WorkspaceId::from("ws-1");
    let project = ctx
        .projects
        .create(Project::new(workspace_id.clone(), "21 Ocean View"))
        .await
        .unwrap();

    let record = ctx
        .images
        .create(ImageEditRecord::new_root(
            project.id.clone(),
            workspace_id,
            "https://photos.example.com/original.jpg",
            "remove the power lines",
            mode,
        ))
        .await
        .unwrap();

    (project, record)
}

#[tokio::test]
async fn inpaint_success_updates_record_and_project() {
    let h = harness().await;
    mount_completing_provider(&h.server, "/media/out.jpg", b"jpeg-bytes").await;

    let (project, record) = seed_project_with_root(&h.ctx, EditMode::Remove).await;

    let run_id = RunId::new();
    h.ctx.registry.insert(run_id.clone()).await;

    let outcome = run_inpaint_job(
        &h.ctx,
        &run_id,
        &InpaintJobPayload {
            image_id: record.id.clone(),
            mask_data_url: Some(mask_data_url()),
            placement_rect: None,
        },
    )
    .await
    .unwrap();

    assert!(!outcome.replayed);

    // Record: completed, result URL set, error cleared.
    let updated = h.ctx.images.get(&record.id).await.unwrap();
    assert_eq!(updated.status, EditStatus::Completed);
    let result_url = updated.result_url.unwrap();
    assert!(result_url.ends_with(&format!("ws-1/{}/images/{}.jpg", project.id, record.id)));
    assert!(updated.error_message.is_none());

    // Stored bytes are the downloaded provider output.
    let key = format!("ws-1/{}/images/{}.jpg", project.id, record.id);
    let (bytes, content_type) = h.media.get(&key).await.unwrap();
    assert_eq!(bytes, b"jpeg-bytes");
    assert_eq!(content_type, "image/jpeg");

    // The mask was uploaded for the provider.
    let mask_key = format!("ws-1/{}/masks/{}.png", project.id, record.id);
    assert!(h.media.exists(&mask_key).await.unwrap());

    // Aggregate: completed count advanced by exactly one, status recomputed.
    let project = h.ctx.projects.get(&project.id).await.unwrap();
    assert_eq!(project.image_count, 1);
    assert_eq!(project.completed_count, 1);
    assert_eq!(project.status, ProjectStatus::Completed);

    // Progress side channel reached the terminal step.
    let state = h.ctx.registry.get(&run_id).await.unwrap();
    assert_eq!(state.status.step, RunStep::Completed);
    assert_eq!(state.status.progress, 100);
}

#[tokio::test]
async fn inpaint_provider_failure_persists_exact_message() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/jobs/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": { "task_id": "t-1" }
        })))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/getTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": {
                "task_id": "t-1",
                "status": "failed",
                "error": "content policy violation"
            }
        })))
        .mount(&h.server)
        .await;

    let (project, record) = seed_project_with_root(&h.ctx, EditMode::Remove).await;

    let run_id = RunId::new();
    h.ctx.registry.insert(run_id.clone()).await;

    let err = run_inpaint_job(
        &h.ctx,
        &run_id,
        &InpaintJobPayload {
            image_id: record.id.clone(),
            mask_data_url: Some(mask_data_url()),
            placement_rect: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkerError::Provider(_)));

    // The provider's error string is stored verbatim; no result URL.
    let updated = h.ctx.images.get(&record.id).await.unwrap();
    assert_eq!(updated.status, EditStatus::Failed);
    assert_eq!(
        updated.error_message.as_deref(),
        Some("content policy violation")
    );
    assert!(updated.result_url.is_none());

    // Aggregate reflects the failure: nothing completed.
    let project = h.ctx.projects.get(&project.id).await.unwrap();
    assert_eq!(project.completed_count, 0);
    assert_eq!(project.status, ProjectStatus::Failed);

    let state = h.ctx.registry.get(&run_id).await.unwrap();
    assert_eq!(state.status.step, RunStep::Failed);
    assert_eq!(
        state.error_message.as_deref(),
        Some("content policy violation")
    );
}

#[tokio::test]
async fn inpaint_replay_of_completed_record_makes_no_provider_call() {
    let h = harness().await;
    // No provider mocks mounted: any HTTP call would fail the test anyway,
    // but the call count below is the real assertion.

    let (_, record) = seed_project_with_root(&h.ctx, EditMode::Remove).await;
    h.ctx
        .images
        .complete(&record.id, "https://cdn.example.com/done.jpg")
        .await
        .unwrap();

    let run_id = RunId::new();
    h.ctx.registry.insert(run_id.clone()).await;

    let outcome = run_inpaint_job(
        &h.ctx,
        &run_id,
        &InpaintJobPayload {
            image_id: record.id.clone(),
            mask_data_url: None,
            placement_rect: None,
        },
    )
    .await
    .unwrap();

    assert!(outcome.replayed);
    assert_eq!(outcome.result_url, "https://cdn.example.com/done.jpg");
    assert_eq!(h.server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn inpaint_remove_without_mask_fails_validation_immediately() {
    let h = harness().await;
    let (_, record) = seed_project_with_root(&h.ctx, EditMode::Remove).await;

    let run_id = RunId::new();
    h.ctx.registry.insert(run_id.clone()).await;

    let err = run_inpaint_job(
        &h.ctx,
        &run_id,
        &InpaintJobPayload {
            image_id: record.id.clone(),
            mask_data_url: None,
            placement_rect: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WorkerError::Validation(_)));
    assert!(!err.is_retryable());
    assert_eq!(h.server.received_requests().await.unwrap().len(), 0);

    let updated = h.ctx.images.get(&record.id).await.unwrap();
    assert_eq!(updated.status, EditStatus::Failed);
}

#[tokio::test]
async fn inpaint_missing_record_is_not_found() {
    let h = harness().await;
    let run_id = RunId::new();
    h.ctx.registry.insert(run_id.clone()).await;

    let err = run_inpaint_job(
        &h.ctx,
        &run_id,
        &InpaintJobPayload {
            image_id: "does-not-exist".into(),
            mask_data_url: None,
            placement_rect: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WorkerError::NotFound(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn clip_success_uses_room_default_prompt_and_project_settings() {
    let h = harness().await;

    let workspace_id = WorkspaceId::from("ws-2");
    let project = h
        .ctx
        .video_projects
        .create(VideoProject::new(
            workspace_id,
            "Spring tour",
            AspectRatio::Portrait,
        ))
        .await
        .unwrap();

    let clip = h
        .ctx
        .clips
        .create(VideoClip::new(
            project.id.clone(),
            "https://photos.example.com/kitchen.jpg",
            0,
            RoomType::Kitchen,
        ))
        .await
        .unwrap();

    // The submission must carry the room-type default motion prompt, the
    // fixed negative prompt, and the project's duration/aspect settings.
    Mock::given(method("POST"))
        .and(path("/jobs/createTask"))
        .and(body_partial_json(json!({
            "model": "motion-pro",
            "input": {
                "prompt": RoomType::Kitchen.default_motion_prompt(),
                "negative_prompt": prop_models::DEFAULT_NEGATIVE_PROMPT,
                "duration": "5",
                "aspect_ratio": "9:16"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": { "task_id": "t-1" }
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/getTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": {
                "task_id": "t-1",
                "status": "completed",
                "output": { "images": [{ "url": format!("{}/media/clip.mp4", h.server.uri()) }] }
            }
        })))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/media/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
        .mount(&h.server)
        .await;

    let run_id = RunId::new();
    h.ctx.registry.insert(run_id.clone()).await;

    let outcome = run_clip_job(&h.ctx, &run_id, &ClipJobPayload { clip_id: clip.id.clone() })
        .await
        .unwrap();
    assert!(!outcome.replayed);

    let updated = h.ctx.clips.get(&clip.id).await.unwrap();
    assert_eq!(updated.status, EditStatus::Completed);
    let clip_url = updated.clip_url.unwrap();
    assert!(clip_url.ends_with(&format!("ws-2/{}/videos/{}.mp4", project.id, clip.id)));

    let project = h.ctx.video_projects.get(&project.id).await.unwrap();
    assert_eq!(project.clip_count, 1);
    assert_eq!(project.completed_clip_count, 1);
    assert_eq!(project.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn clip_failure_recomputes_video_project() {
    let h = harness().await;

    let project = h
        .ctx
        .video_projects
        .create(VideoProject::new(
            WorkspaceId::new(),
            "Tour",
            AspectRatio::Landscape,
        ))
        .await
        .unwrap();

    let clip = h
        .ctx
        .clips
        .create(VideoClip::new(
            project.id.clone(),
            "https://photos.example.com/bedroom.jpg",
            0,
            RoomType::Bedroom,
        ))
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/jobs/createTask"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&h.server)
        .await;

    let run_id = RunId::new();
    h.ctx.registry.insert(run_id.clone()).await;

    let err = run_clip_job(&h.ctx, &run_id, &ClipJobPayload { clip_id: clip.id.clone() })
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Provider(_)));

    let updated = h.ctx.clips.get(&clip.id).await.unwrap();
    assert_eq!(updated.status, EditStatus::Failed);
    assert!(updated.clip_url.is_none());

    let project = h.ctx.video_projects.get(&project.id).await.unwrap();
    assert_eq!(project.completed_clip_count, 0);
    assert_eq!(project.status, ProjectStatus::Failed);
}

mockall::mock! {
    Media {}

    #[async_trait::async_trait]
    impl MediaStore for Media {
        async fn store(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> StorageResult<String>;
        async fn delete(&self, key: &str) -> StorageResult<()>;
        async fn exists(&self, key: &str) -> StorageResult<bool>;
    }
}

#[tokio::test]
async fn storage_write_failure_fails_the_job() {
    let server = MockServer::start().await;
    mount_completing_provider(&server, "/media/out.jpg", b"jpeg-bytes").await;

    let provider = ProviderClient::new(ProviderConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout: Duration::from_secs(30),
    })
    .unwrap();

    let mut media = MockMedia::new();
    media
        .expect_store()
        .returning(|_, _, _| Err(StorageError::upload_failed("bucket unavailable")));

    let store = Arc::new(MemoryStore::new());
    let ctx = Arc::new(WorkerContext::new(
        store,
        provider,
        Arc::new(media),
        WorkerConfig::default(),
    ));

    // Add mode without a mask: the only storage write is the result upload.
    let (_, record) = seed_project_with_root(&ctx, EditMode::Add).await;

    let run_id = RunId::new();
    ctx.registry.insert(run_id.clone()).await;

    let err = run_inpaint_job(
        &ctx,
        &run_id,
        &InpaintJobPayload {
            image_id: record.id.clone(),
            mask_data_url: None,
            placement_rect: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WorkerError::Storage(_)));
    assert!(err.is_retryable());

    let updated = ctx.images.get(&record.id).await.unwrap();
    assert_eq!(updated.status, EditStatus::Failed);
    assert!(updated
        .error_message
        .unwrap()
        .contains("bucket unavailable"));
}

#[tokio::test]
async fn dispatch_edit_replaces_newer_versions_and_completes() {
    let h = harness().await;
    mount_completing_provider(&h.server, "/media/edit.jpg", b"edited-bytes").await;

    let (project, root) = seed_project_with_root(&h.ctx, EditMode::Remove).await;
    h.ctx
        .images
        .complete(&root.id, "https://cdn.example.com/v1.jpg")
        .await
        .unwrap();

    // Two newer versions the user decides to discard.
    for _ in 0..2 {
        h.ctx
            .ledger
            .create_version(
                &root.id,
                prop_db::NewVersion {
                    source_url: "https://cdn.example.com/v1.jpg".to_string(),
                    prompt: "brighten".to_string(),
                    mode: EditMode::Add,
                },
            )
            .await
            .unwrap();
    }

    let runner = TaskRunner::new(h.ctx.clone());
    let (run_id, new_image_id) = runner
        .dispatch_edit(EditRequest {
            image_id: root.id.clone(),
            prompt: "add a fruit bowl on the island".to_string(),
            mode: EditMode::Add,
            mask_data_url: None,
            placement_rect: None,
            replace_newer_versions: true,
        })
        .await
        .unwrap();

    // Versions 2 and 3 were discarded; the new edit is version 2.
    let lineage = h.ctx.ledger.lineage(&root.id).await.unwrap();
    assert_eq!(lineage.len(), 2);
    let new_record = h.ctx.images.get(&new_image_id).await.unwrap();
    assert_eq!(new_record.version, 2);
    assert_eq!(new_record.source_url, "https://cdn.example.com/v1.jpg");

    // Fire-and-forget: poll the registry until the run lands.
    let state = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(state) = h.ctx.registry.get(&run_id).await {
                if state.is_terminal() {
                    return state;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("run did not finish in time");

    assert_eq!(state.status.step, RunStep::Completed);

    let finished = h.ctx.images.get(&new_image_id).await.unwrap();
    assert_eq!(finished.status, EditStatus::Completed);
    assert!(finished.result_url.is_some());

    // Both lineage tips completed; aggregate counts cover both records.
    let project = h.ctx.projects.get(&project.id).await.unwrap();
    assert_eq!(project.image_count, 2);
    assert_eq!(project.completed_count, 2);
}

#[tokio::test]
async fn sweep_reclaims_stale_processing_records() {
    let h = harness().await;
    let (project, _) = seed_project_with_root(&h.ctx, EditMode::Remove).await;

    // A record that has been processing for two hours.
    let stale_since = chrono::Utc::now() - chrono::Duration::hours(2);
    let mut stuck = ImageEditRecord::new_root(
        project.id.clone(),
        WorkspaceId::from("ws-1"),
        "https://photos.example.com/stuck.jpg",
        "declutter",
        EditMode::Remove,
    );
    stuck.status = EditStatus::Processing;
    stuck.created_at = stale_since;
    stuck.updated_at = stale_since;
    let stuck = h.ctx.images.create(stuck).await.unwrap();

    let reclaimed = sweep_once(&h.ctx).await.unwrap();
    assert_eq!(reclaimed, 1);

    let updated = h.ctx.images.get(&stuck.id).await.unwrap();
    assert_eq!(updated.status, EditStatus::Failed);
    assert_eq!(updated.error_message.as_deref(), Some(STALE_MESSAGE));

    // A second pass finds nothing: the sweep is idempotent.
    assert_eq!(sweep_once(&h.ctx).await.unwrap(), 0);

    // The parent reflects the reclaim: one pending, one failed, none
    // completed or processing.
    let project = h.ctx.projects.get(&project.id).await.unwrap();
    assert_eq!(project.image_count, 2);
    assert_eq!(project.completed_count, 0);
    assert_eq!(project.status, ProjectStatus::Pending);
}
