//! Render orchestration.
//!
//! Validates and normalizes the caller's parameters, resolves a reference
//! image (ad-hoc upload first, then a persisted character lock), and submits
//! to the provider with a layered fallback ladder:
//!
//! 1. primary attempt: requested model + resolved reference
//! 2. access-denied -> retry once with the configured fallback model
//! 3. moderation rejection with a reference attached -> retry once with the
//!    original model and no reference
//!
//! Every successful path records the job in the store before returning.

use chrono::Utc;
use tracing::{info, warn};

use vgen_image::normalize_reference;
use vgen_models::{
    normalize_model, normalize_seconds, normalize_size, FitMode, JobPatch, JobRecord,
    STATUS_QUEUED,
};
use vgen_provider::{
    NewVideo, ProviderError, ProviderErrorKind, ReferenceAttachment, VideoBackend,
};
use vgen_store::{CharacterStore, JobStore};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Submission policy carved out of the full config.
#[derive(Debug, Clone)]
pub struct RenderPolicy {
    pub default_model: String,
    pub fallback_model: Option<String>,
    pub allowed_models: Vec<String>,
    pub moderation_fallback: bool,
}

impl From<&ApiConfig> for RenderPolicy {
    fn from(config: &ApiConfig) -> Self {
        Self {
            default_model: config.default_model.clone(),
            fallback_model: config.fallback_model.clone(),
            allowed_models: config.allowed_models.clone(),
            moderation_fallback: config.moderation_fallback,
        }
    }
}

/// Raw caller input, exactly as the multipart form delivered it.
#[derive(Debug, Default)]
pub struct RenderInput {
    pub prompt: String,
    pub seconds: String,
    pub size: String,
    pub fit: String,
    pub model: String,
    pub reference: Option<Vec<u8>>,
    pub use_lock: bool,
    pub character: Option<String>,
}

/// What a successful submission hands back to the caller.
#[derive(Debug)]
pub struct RenderOutcome {
    pub job_id: String,
    pub note: Option<String>,
    pub record: JobRecord,
}

/// Submit a render request, applying the fallback ladder.
pub async fn submit_render(
    backend: &dyn VideoBackend,
    characters: &CharacterStore,
    jobs: &JobStore,
    policy: &RenderPolicy,
    input: RenderInput,
) -> ApiResult<RenderOutcome> {
    let prompt = input.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::invalid_request("prompt is required"));
    }

    let seconds = normalize_seconds(&input.seconds).to_string();
    let size = normalize_size(&input.size);
    let fit: FitMode = input.fit.parse().unwrap_or_default();
    let model = normalize_model(&input.model, &policy.allowed_models, &policy.default_model);

    // Reference resolution: an ad-hoc upload outranks a persisted lock.
    let mut used_lock = false;
    let mut character_used: Option<String> = None;
    let mut submit_prompt = prompt.clone();

    let raw_reference: Option<Vec<u8>> = if let Some(bytes) = input.reference {
        Some(bytes)
    } else if input.use_lock {
        match input.character.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => match characters.lock_image(name).await {
                Ok(bytes) => {
                    used_lock = true;
                    character_used = Some(name.to_string());
                    if let Ok(profile) = characters.get(name).await {
                        if let Some(bible) = profile.bible.filter(|b| !b.trim().is_empty()) {
                            submit_prompt = format!("{submit_prompt}\n\n{bible}");
                        }
                    }
                    Some(bytes)
                }
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e.into()),
            },
            None => None,
        }
    } else {
        None
    };

    let reference = match raw_reference {
        Some(bytes) => {
            let normalized = normalize_reference(&bytes, size, fit)?;
            Some(ReferenceAttachment {
                bytes: normalized.bytes,
                filename: normalized.filename,
                content_type: normalized.content_type.to_string(),
            })
        }
        None => None,
    };

    let request = NewVideo {
        prompt: submit_prompt,
        model: model.clone(),
        seconds: seconds.clone(),
        size: size.to_string(),
        reference,
    };

    let mut note: Option<String> = None;
    let mut model_used = model.clone();

    let job = match backend.create_video(request.clone()).await {
        Ok(job) => job,
        Err(first_err) => {
            let mut governing: ProviderError = first_err;
            let mut recovered = None;

            if governing.kind() == ProviderErrorKind::AccessDenied {
                if let Some(fallback) = eligible_fallback(policy, &model) {
                    warn!(
                        model = %model,
                        fallback = %fallback,
                        error = %governing,
                        "primary model rejected, retrying with fallback model"
                    );
                    let mut retry = request.clone();
                    retry.model = fallback.clone();
                    match backend.create_video(retry).await {
                        Ok(job) => {
                            note = Some(format!(
                                "model fell back to {fallback} ({model} unavailable)"
                            ));
                            model_used = fallback;
                            recovered = Some(job);
                        }
                        Err(second_err) => governing = second_err,
                    }
                }
            }

            match recovered {
                Some(job) => job,
                None => {
                    let can_drop_reference = governing.kind() == ProviderErrorKind::Moderation
                        && request.reference.is_some()
                        && policy.moderation_fallback;
                    if !can_drop_reference {
                        return Err(governing.into());
                    }

                    warn!(
                        error = %governing,
                        "moderation rejected the reference, retrying without it"
                    );
                    let mut retry = request.clone();
                    retry.model = model.clone();
                    retry.reference = None;
                    match backend.create_video(retry).await {
                        Ok(job) => {
                            note = Some(
                                "reference image removed after moderation rejection".to_string(),
                            );
                            model_used = model.clone();
                            used_lock = false;
                            character_used = None;
                            job
                        }
                        Err(_) => return Err(governing.into()),
                    }
                }
            }
        }
    };

    let status = job.status.clone().unwrap_or_else(|| STATUS_QUEUED.to_string());
    let record = jobs
        .upsert(
            &job.id,
            JobPatch {
                prompt: Some(prompt),
                seconds: Some(seconds),
                size: Some(size.to_string()),
                model: Some(model_used.clone()),
                status: Some(status),
                progress: job.progress,
                character: character_used,
                used_lock: Some(used_lock),
                note: note.clone(),
                created_at: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?;

    info!(job_id = %record.id, model = %model_used, used_lock, "render submitted");

    Ok(RenderOutcome {
        job_id: record.id.clone(),
        note,
        record,
    })
}

/// The fallback model, if one is configured, distinct from the primary, and
/// itself allowed.
fn eligible_fallback(policy: &RenderPolicy, primary: &str) -> Option<String> {
    policy
        .fallback_model
        .as_ref()
        .filter(|fb| fb.as_str() != primary)
        .filter(|fb| policy.allowed_models.iter().any(|m| m == fb.as_str()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::always;
    use mockall::Sequence;

    use vgen_provider::{AssetKind, ContentProbe, ProviderResult, VideoJob};

    mock! {
        Backend {}

        #[async_trait::async_trait]
        impl VideoBackend for Backend {
            async fn create_video(&self, req: NewVideo) -> ProviderResult<VideoJob>;
            async fn get_video(&self, id: &str) -> ProviderResult<VideoJob>;
            async fn probe_content(&self, id: &str, kind: AssetKind) -> ProviderResult<ContentProbe>;
        }
    }

    fn policy() -> RenderPolicy {
        RenderPolicy {
            default_model: "sora-2".to_string(),
            fallback_model: Some("sora-2-pro".to_string()),
            allowed_models: vec!["sora-2".to_string(), "sora-2-pro".to_string()],
            moderation_fallback: true,
        }
    }

    async fn stores() -> (tempfile::TempDir, CharacterStore, JobStore) {
        let dir = tempfile::tempdir().unwrap();
        let characters =
            CharacterStore::open(dir.path().join("characters.json"), dir.path().join("locks"))
                .await
                .unwrap();
        let jobs = JobStore::open(dir.path().join("jobs.json")).await.unwrap();
        (dir, characters, jobs)
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(32, 32, image::Rgb([120u8, 40, 200]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn provider_job(id: &str) -> VideoJob {
        VideoJob {
            id: id.to_string(),
            status: Some("queued".to_string()),
            progress: Some(0.0),
            model: None,
            seconds: None,
            size: None,
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let (_dir, characters, jobs) = stores().await;
        let backend = MockBackend::new();

        let err = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "   ".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_parameters_normalized_and_recorded() {
        let (_dir, characters, jobs) = stores().await;

        let mut backend = MockBackend::new();
        backend
            .expect_create_video()
            .withf(|req| {
                req.model == "sora-2"
                    && req.seconds == "4"
                    && req.size == "1280x720"
                    && req.reference.is_none()
            })
            .times(1)
            .returning(|_| Ok(provider_job("vid_1")));

        let outcome = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "a red fox in snow".to_string(),
                seconds: "7".to_string(),
                size: "huge".to_string(),
                model: "gpt-5".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.job_id, "vid_1");
        assert!(outcome.note.is_none());

        let record = jobs.get("vid_1").await.unwrap();
        assert_eq!(record.prompt, "a red fox in snow");
        assert_eq!(record.seconds, "4");
        assert_eq!(record.size, "1280x720");
        assert_eq!(record.model, "sora-2");
        assert_eq!(record.status, "queued");
        assert!(!record.used_lock);
    }

    #[tokio::test]
    async fn test_full_fallback_ladder_ordering() {
        let (_dir, characters, jobs) = stores().await;

        let mut backend = MockBackend::new();
        let mut seq = Sequence::new();

        // 1: primary model with reference -> access denied
        backend
            .expect_create_video()
            .withf(|req| req.model == "sora-2" && req.reference.is_some())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ProviderError::request(403, "Forbidden")));
        // 2: fallback model, reference kept -> moderation
        backend
            .expect_create_video()
            .withf(|req| req.model == "sora-2-pro" && req.reference.is_some())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(ProviderError::request(400, "rejected by moderation"))
            });
        // 3: original model, reference dropped -> success
        backend
            .expect_create_video()
            .withf(|req| req.model == "sora-2" && req.reference.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(provider_job("vid_3")));

        let outcome = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "a knight on a horse".to_string(),
                seconds: "4".to_string(),
                size: "1280x720".to_string(),
                model: "sora-2".to_string(),
                reference: Some(png_bytes()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.job_id, "vid_3");
        assert!(outcome.note.unwrap().contains("moderation"));

        let record = jobs.get("vid_3").await.unwrap();
        assert_eq!(record.model, "sora-2");
        assert!(!record.used_lock);
    }

    #[tokio::test]
    async fn test_model_fallback_records_note() {
        let (_dir, characters, jobs) = stores().await;

        let mut backend = MockBackend::new();
        let mut seq = Sequence::new();
        backend
            .expect_create_video()
            .withf(|req| req.model == "sora-2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ProviderError::request(403, "not authorized for this model")));
        backend
            .expect_create_video()
            .withf(|req| req.model == "sora-2-pro")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(provider_job("vid_2")));

        let outcome = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "city at dusk".to_string(),
                model: "sora-2".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(outcome.note.unwrap().contains("sora-2-pro"));
        assert_eq!(jobs.get("vid_2").await.unwrap().model, "sora-2-pro");
    }

    #[tokio::test]
    async fn test_no_fallback_without_distinct_model() {
        let (_dir, characters, jobs) = stores().await;
        let restricted = RenderPolicy {
            fallback_model: None,
            ..policy()
        };

        let mut backend = MockBackend::new();
        backend
            .expect_create_video()
            .with(always())
            .times(1)
            .returning(|_| Err(ProviderError::request(403, "Forbidden")));

        let err = submit_render(
            &backend,
            &characters,
            &jobs,
            &restricted,
            RenderInput {
                prompt: "p".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Forbidden"));
    }

    #[tokio::test]
    async fn test_moderation_without_reference_is_surfaced() {
        let (_dir, characters, jobs) = stores().await;

        let mut backend = MockBackend::new();
        backend
            .expect_create_video()
            .with(always())
            .times(1)
            .returning(|_| Err(ProviderError::request(400, "moderation rejected prompt")));

        let err = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "p".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("moderation"));
    }

    #[tokio::test]
    async fn test_moderation_fallback_disabled_by_config() {
        let (_dir, characters, jobs) = stores().await;
        let no_fallback = RenderPolicy {
            moderation_fallback: false,
            ..policy()
        };

        let mut backend = MockBackend::new();
        backend
            .expect_create_video()
            .with(always())
            .times(1)
            .returning(|_| Err(ProviderError::request(400, "blocked by moderation")));

        let err = submit_render(
            &backend,
            &characters,
            &jobs,
            &no_fallback,
            RenderInput {
                prompt: "p".to_string(),
                reference: Some(png_bytes()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("moderation"));
    }

    #[tokio::test]
    async fn test_lock_reference_appends_bible() {
        let (_dir, characters, jobs) = stores().await;

        let mut profile = vgen_models::Character::new("fox");
        profile.bible = Some("rust-red fur, amber eyes".to_string());
        characters.save(profile).await.unwrap();
        characters.save_lock_image("fox", &png_bytes()).await.unwrap();

        let mut backend = MockBackend::new();
        backend
            .expect_create_video()
            .withf(|req| {
                req.reference.is_some() && req.prompt.contains("rust-red fur, amber eyes")
            })
            .times(1)
            .returning(|_| Ok(provider_job("vid_lock")));

        let outcome = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "the fox leaps a fence".to_string(),
                use_lock: true,
                character: Some("fox".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let record = outcome.record;
        assert!(record.used_lock);
        assert_eq!(record.character.as_deref(), Some("fox"));
        // Stored prompt stays the caller's literal text.
        assert_eq!(record.prompt, "the fox leaps a fence");
    }

    #[tokio::test]
    async fn test_missing_lock_image_submits_without_reference() {
        let (_dir, characters, jobs) = stores().await;

        let mut backend = MockBackend::new();
        backend
            .expect_create_video()
            .withf(|req| req.reference.is_none())
            .times(1)
            .returning(|_| Ok(provider_job("vid_nolock")));

        let outcome = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "p".to_string(),
                use_lock: true,
                character: Some("ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!outcome.record.used_lock);
    }

    #[tokio::test]
    async fn test_adhoc_reference_outranks_lock() {
        let (_dir, characters, jobs) = stores().await;
        characters.save_lock_image("fox", b"stored lock").await.unwrap();

        let mut backend = MockBackend::new();
        backend
            .expect_create_video()
            .withf(|req| req.reference.is_some())
            .times(1)
            .returning(|_| Ok(provider_job("vid_adhoc")));

        let outcome = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "p".to_string(),
                reference: Some(png_bytes()),
                use_lock: true,
                character: Some("fox".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // The upload was used, not the lock.
        assert!(!outcome.record.used_lock);
    }

    #[tokio::test]
    async fn test_invalid_reference_image_rejected() {
        let (_dir, characters, jobs) = stores().await;
        let backend = MockBackend::new();

        let err = submit_render(
            &backend,
            &characters,
            &jobs,
            &policy(),
            RenderInput {
                prompt: "p".to_string(),
                reference: Some(b"definitely not an image".to_vec()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Image(_)));
    }
}
