//! Multipart parsing into typed per-endpoint commands.
//!
//! Form fields arrive untyped; everything date- or id-shaped is coerced
//! here, before any handler logic runs, so a malformed value fails the
//! request with a 400 instead of reaching the storage layer.

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use shared::CatalogError;

/// Field name carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

/// Maximum accepted image size (10MB).
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// The uploaded image part of a multipart form.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Bytes,
}

/// Raw multipart fields: text values in arrival order plus the image part.
#[derive(Default)]
pub struct FormFields {
    pub texts: Vec<(String, String)>,
    pub image: Option<ImageUpload>,
}

/// Drain a multipart stream into raw fields. Transport-level multipart
/// errors are reported as invalid input.
pub async fn collect_fields(multipart: &mut Multipart) -> Result<FormFields, CatalogError> {
    let mut fields = FormFields::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        CatalogError::InvalidInput(format!("Invalid multipart request: {}", err))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let data = field.bytes().await.map_err(|err| {
                CatalogError::InvalidInput(format!("Failed to read image field: {}", err))
            })?;
            fields.image = Some(ImageUpload { file_name, data });
        } else {
            let value = field.text().await.map_err(|err| {
                CatalogError::InvalidInput(format!("Failed to read field '{}': {}", name, err))
            })?;
            fields.texts.push((name, value));
        }
    }

    Ok(fields)
}

/// Typed command for POST /groups.
#[derive(Debug)]
pub struct GroupForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub debut: Option<BsonDateTime>,
    pub status: Option<String>,
    pub image: ImageUpload,
}

impl GroupForm {
    pub fn from_fields(fields: FormFields) -> Result<Self, CatalogError> {
        let image = require_image(fields.image)?;
        let mut form = Self {
            name: None,
            description: None,
            labels: Vec::new(),
            debut: None,
            status: None,
            image,
        };

        for (name, value) in fields.texts {
            match name.as_str() {
                "name" => form.name = Some(value),
                "description" => form.description = Some(value),
                "labels" => form.labels.push(value),
                "debut" => form.debut = Some(parse_date("debut", &value)?),
                "status" => form.status = Some(value),
                // Unknown fields are ignored.
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Typed command for POST /members.
#[derive(Debug)]
pub struct MemberForm {
    pub name: Option<String>,
    pub stage_name: Option<String>,
    pub role: Vec<String>,
    pub birth: Option<BsonDateTime>,
    pub group_ids: Vec<ObjectId>,
    pub labels: Vec<String>,
    pub image: ImageUpload,
}

impl MemberForm {
    pub fn from_fields(fields: FormFields) -> Result<Self, CatalogError> {
        let image = require_image(fields.image)?;
        let mut form = Self {
            name: None,
            stage_name: None,
            role: Vec::new(),
            birth: None,
            group_ids: Vec::new(),
            labels: Vec::new(),
            image,
        };

        for (name, value) in fields.texts {
            match name.as_str() {
                "name" => form.name = Some(value),
                "stageName" => form.stage_name = Some(value),
                "role" => form.role.push(value),
                "birth" => form.birth = Some(parse_date("birth", &value)?),
                "groupId" => form.group_ids.push(parse_object_id("groupId", &value)?),
                "labels" => form.labels.push(value),
                _ => {}
            }
        }

        Ok(form)
    }
}

fn require_image(image: Option<ImageUpload>) -> Result<ImageUpload, CatalogError> {
    let image = image
        .ok_or_else(|| CatalogError::InvalidInput("No image file provided".to_string()))?;

    if image.data.is_empty() {
        return Err(CatalogError::InvalidInput(
            "Empty image file provided".to_string(),
        ));
    }
    if image.data.len() > MAX_IMAGE_SIZE {
        return Err(CatalogError::InvalidInput(format!(
            "Image exceeds maximum size of {} MB",
            MAX_IMAGE_SIZE / (1024 * 1024)
        )));
    }

    Ok(image)
}

/// Accept `YYYY-MM-DD` (stored as midnight UTC) or a full RFC 3339
/// timestamp.
fn parse_date(field: &str, raw: &str) -> Result<BsonDateTime, CatalogError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        return Ok(BsonDateTime::from_chrono(midnight));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(BsonDateTime::from_chrono(datetime.with_timezone(&Utc)));
    }

    Err(CatalogError::InvalidInput(format!(
        "Invalid date for '{}': {}",
        field, raw
    )))
}

fn parse_object_id(field: &str, raw: &str) -> Result<ObjectId, CatalogError> {
    ObjectId::parse_str(raw).map_err(|_| {
        CatalogError::InvalidInput(format!("Invalid id for '{}': {}", field, raw))
    })
}
