use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Stored document for a group, collection `kpop_groups`.
///
/// Text fields are optional: an absent form field stores as an absent
/// document field, never a rejected write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debut: Option<BsonDateTime>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
}

/// Stored document for a member, collection `kpop_members`.
///
/// `groupId` holds non-owning references into `kpop_groups`; entries are
/// not checked at write time and dangling ones resolve to null on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "stageName", skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
    #[serde(default)]
    pub role: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth: Option<BsonDateTime>,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "groupId", default)]
    pub group_ids: Vec<ObjectId>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
}

/// Fields for a group insert; id and creation time are filled by the store.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: Option<String>,
    pub description: Option<String>,
    pub debut: Option<BsonDateTime>,
    pub labels: Vec<String>,
    pub status: Option<String>,
    pub image_url: String,
}

/// Fields for a member insert.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: Option<String>,
    pub stage_name: Option<String>,
    pub role: Vec<String>,
    pub birth: Option<BsonDateTime>,
    pub group_ids: Vec<ObjectId>,
    pub labels: Vec<String>,
    pub image_url: String,
}

/// A member with its group references resolved into embedded documents.
/// Positions line up with `member.group_ids`; dangling references are None.
#[derive(Debug, Clone)]
pub struct MemberWithGroups {
    pub member: MemberDocument,
    pub groups: Vec<Option<GroupDocument>>,
}

/// JSON shape of a group on the read endpoints.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub debut: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub status: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<GroupDocument> for GroupResponse {
    fn from(doc: GroupDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            name: doc.name,
            description: doc.description,
            debut: doc.debut.map(BsonDateTime::to_chrono),
            labels: doc.labels,
            status: doc.status,
            image_url: doc.image_url,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

/// JSON shape of a member on the read endpoints, with `groupId` carrying
/// the embedded group (or null) per reference.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "stageName")]
    pub stage_name: Option<String>,
    pub role: Vec<String>,
    pub birth: Option<DateTime<Utc>>,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "groupId")]
    pub groups: Vec<Option<GroupResponse>>,
    pub labels: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<MemberWithGroups> for MemberResponse {
    fn from(joined: MemberWithGroups) -> Self {
        let member = joined.member;
        Self {
            id: member.id.to_hex(),
            name: member.name,
            stage_name: member.stage_name,
            role: member.role,
            birth: member.birth.map(BsonDateTime::to_chrono),
            image_url: member.image_url,
            groups: joined
                .groups
                .into_iter()
                .map(|group| group.map(GroupResponse::from))
                .collect(),
            labels: member.labels,
            created_at: member.created_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> GroupDocument {
        GroupDocument {
            id: ObjectId::new(),
            name: Some("NewJeans".to_string()),
            description: None,
            debut: Some(BsonDateTime::now()),
            labels: vec!["ADOR".to_string()],
            status: Some("active".to_string()),
            image_url: "https://raw.example.com/image/image-1.png".to_string(),
            created_at: BsonDateTime::now(),
        }
    }

    #[test]
    fn test_group_response_field_names() {
        let response = GroupResponse::from(sample_group());
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("imageURL").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image_url").is_none());
        assert_eq!(json["name"], "NewJeans");
    }

    #[test]
    fn test_member_response_embeds_groups_or_null() {
        let group = sample_group();
        let member = MemberDocument {
            id: ObjectId::new(),
            name: Some("Minji".to_string()),
            stage_name: Some("Minji".to_string()),
            role: vec!["vocal".to_string(), "dance".to_string()],
            birth: None,
            image_url: "https://raw.example.com/image/image-2.jpg".to_string(),
            group_ids: vec![group.id, ObjectId::new()],
            labels: vec![],
            created_at: BsonDateTime::now(),
        };
        let joined = MemberWithGroups {
            member,
            groups: vec![Some(group), None],
        };

        let json = serde_json::to_value(MemberResponse::from(joined)).unwrap();
        let refs = json["groupId"].as_array().unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0]["name"], "NewJeans");
        assert!(refs[1].is_null());
        assert!(json.get("stageName").is_some());
    }

    #[test]
    fn test_group_document_roundtrip_keeps_wire_names() {
        let doc = sample_group();
        let bson = mongodb::bson::to_document(&doc).unwrap();

        assert!(bson.contains_key("_id"));
        assert!(bson.contains_key("imageURL"));
        assert!(bson.contains_key("createdAt"));
        // Absent optional fields stay absent in the stored document.
        assert!(!bson.contains_key("description"));

        let back: GroupDocument = mongodb::bson::from_document(bson).unwrap();
        assert_eq!(back.id, doc.id);
        assert_eq!(back.labels, doc.labels);
    }
}
