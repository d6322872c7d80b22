use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::handlers::{
    validation::{self, GroupForm},
    ApiError, UploadResponse,
};
use crate::models::{GroupResponse, NewGroup};
use crate::AppState;

const UPLOAD_FAILED: &str = "Failed to upload";
const LIST_FAILED: &str = "Failed to retrieve groups";

/// POST /groups: parse the form, run the image pipeline, persist the
/// record. The staged file is gone by the time this returns, either way.
pub async fn create_group(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let fields = validation::collect_fields(&mut multipart)
        .await
        .map_err(|err| ApiError::new(UPLOAD_FAILED, err))?;
    let form = GroupForm::from_fields(fields)
        .map_err(|err| ApiError::new(UPLOAD_FAILED, err))?;

    let image = state
        .ingest
        .ingest(validation::IMAGE_FIELD, &form.image.file_name, &form.image.data)
        .await
        .map_err(|err| ApiError::new(UPLOAD_FAILED, err))?;

    let record = NewGroup {
        name: form.name,
        description: form.description,
        debut: form.debut,
        labels: form.labels,
        status: form.status,
        image_url: image.download_url.clone(),
    };

    match state.store.create_group(record).await {
        Ok(_) => Ok(Json(UploadResponse {
            message: "Image uploaded successfully".to_string(),
            image_url: image.download_url,
        })),
        Err(err) => {
            // The blob is already hosted; remove it rather than orphan it.
            state.ingest.discard_remote(&image).await;
            Err(ApiError::new(UPLOAD_FAILED, err))
        }
    }
}

/// GET /groups: the full collection, unfiltered and unpaginated.
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let groups = state
        .store
        .list_groups()
        .await
        .map_err(|err| ApiError::new(LIST_FAILED, err))?;

    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}
