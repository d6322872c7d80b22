use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::handlers::{
    validation::{self, MemberForm},
    ApiError, UploadResponse,
};
use crate::models::{MemberResponse, NewMember};
use crate::AppState;

const UPLOAD_FAILED: &str = "Failed to upload";
const LIST_FAILED: &str = "Failed to retrieve members";

/// POST /members: same linear pipeline as group creation.
pub async fn create_member(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let fields = validation::collect_fields(&mut multipart)
        .await
        .map_err(|err| ApiError::new(UPLOAD_FAILED, err))?;
    let form = MemberForm::from_fields(fields)
        .map_err(|err| ApiError::new(UPLOAD_FAILED, err))?;

    let image = state
        .ingest
        .ingest(validation::IMAGE_FIELD, &form.image.file_name, &form.image.data)
        .await
        .map_err(|err| ApiError::new(UPLOAD_FAILED, err))?;

    let record = NewMember {
        name: form.name,
        stage_name: form.stage_name,
        role: form.role,
        birth: form.birth,
        group_ids: form.group_ids,
        labels: form.labels,
        image_url: image.download_url.clone(),
    };

    match state.store.create_member(record).await {
        Ok(_) => Ok(Json(UploadResponse {
            message: "Image uploaded successfully".to_string(),
            image_url: image.download_url,
        })),
        Err(err) => {
            state.ingest.discard_remote(&image).await;
            Err(ApiError::new(UPLOAD_FAILED, err))
        }
    }
}

/// GET /members: every member with group references resolved to embedded
/// documents, dangling ones as null.
pub async fn list_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = state
        .store
        .list_members_joined()
        .await
        .map_err(|err| ApiError::new(LIST_FAILED, err))?;

    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}
