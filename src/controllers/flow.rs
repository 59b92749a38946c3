use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::flow::{FlowView, ImageUpload};
use crate::domain::replies::UserConfig;
use crate::{
    domain::flow::FlowServiceApi,
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

const FILE_FIELD: &str = "file";

/// Body of POST /api/flows/{id}/image
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitImageRequest {
    /// Data URL or bare base64
    pub image: String,
}

/// Body of PUT /api/flows/{id}/transcript
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTranscriptRequest {
    pub transcript: String,
}

pub struct FlowController {
    flow_service: Arc<dyn FlowServiceApi>,
}

impl FlowController {
    pub fn new(flow_service: Arc<dyn FlowServiceApi>) -> Self {
        Self { flow_service }
    }

    /// POST /api/flows - Start a new flow
    pub async fn create(
        State(controller): State<Arc<FlowController>>,
    ) -> (StatusCode, Json<FlowView>) {
        (StatusCode::CREATED, Json(controller.flow_service.create().await))
    }

    /// GET /api/flows/{id}
    pub async fn get(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
    ) -> AppResult<Json<FlowView>> {
        Ok(Json(controller.flow_service.get(flow_id).await?))
    }

    /// POST /api/flows/{id}/image - Submit a screenshot as a data URL
    pub async fn submit_image(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
        Json(request): Json<SubmitImageRequest>,
    ) -> AppResult<Json<FlowView>> {
        let view = controller
            .flow_service
            .submit_image(flow_id, ImageUpload::DataUrl(request.image))
            .await?;
        Ok(Json(view))
    }

    /// POST /api/flows/{id}/upload - Submit a screenshot as a multipart file
    pub async fn upload(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
        mut multipart: Multipart,
    ) -> AppResult<Json<FlowView>> {
        let mut upload = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Could not read upload: {}", e)))?;
            upload = Some(ImageUpload::File {
                bytes: bytes.to_vec(),
                content_type,
            });
            break;
        }

        let upload = upload
            .ok_or_else(|| AppError::BadRequest("Missing `file` field".to_string()))?;
        let view = controller.flow_service.submit_image(flow_id, upload).await?;
        Ok(Json(view))
    }

    /// PUT /api/flows/{id}/transcript - Edit the extracted text
    pub async fn update_transcript(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
        Json(request): Json<UpdateTranscriptRequest>,
    ) -> AppResult<Json<FlowView>> {
        let view = controller
            .flow_service
            .update_transcript(flow_id, request.transcript)
            .await?;
        Ok(Json(view))
    }

    /// POST /api/flows/{id}/advance - Move from editing to configuration
    pub async fn advance(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
    ) -> AppResult<Json<FlowView>> {
        Ok(Json(controller.flow_service.advance(flow_id).await?))
    }

    /// PUT /api/flows/{id}/config - Replace the reply settings
    pub async fn update_config(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
        Json(config): Json<UserConfig>,
    ) -> AppResult<Json<FlowView>> {
        let view = controller.flow_service.update_config(flow_id, config).await?;
        Ok(Json(view))
    }

    /// POST /api/flows/{id}/generate - Generate replies (signed-in only)
    pub async fn generate(
        State(controller): State<Arc<FlowController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(flow_id): Path<Uuid>,
    ) -> AppResult<Json<FlowView>> {
        let view = controller
            .flow_service
            .generate(flow_id, &auth_user.session())
            .await?;
        Ok(Json(view))
    }

    /// POST /api/flows/{id}/gate/complete - Finish the interstitial
    pub async fn complete_gate(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
    ) -> AppResult<Json<FlowView>> {
        Ok(Json(controller.flow_service.complete_gate(flow_id).await?))
    }

    /// POST /api/flows/{id}/back
    pub async fn back(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
    ) -> AppResult<Json<FlowView>> {
        Ok(Json(controller.flow_service.back(flow_id).await?))
    }

    /// POST /api/flows/{id}/reset
    pub async fn reset(
        State(controller): State<Arc<FlowController>>,
        Path(flow_id): Path<Uuid>,
    ) -> AppResult<Json<FlowView>> {
        Ok(Json(controller.flow_service.reset(flow_id).await?))
    }
}
