use std::collections::HashMap;

use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::{Collection, Database};
use shared::CatalogError;

use crate::models::{
    GroupDocument, MemberDocument, MemberWithGroups, NewGroup, NewMember,
};

const GROUPS_COLLECTION: &str = "kpop_groups";
const MEMBERS_COLLECTION: &str = "kpop_members";

/// Store client over the two catalog collections.
///
/// Constructed once at startup from an established database handle and
/// injected into handlers through application state.
#[derive(Clone)]
pub struct CatalogStore {
    groups: Collection<GroupDocument>,
    members: Collection<MemberDocument>,
}

impl CatalogStore {
    pub fn new(db: &Database) -> Self {
        Self {
            groups: db.collection(GROUPS_COLLECTION),
            members: db.collection(MEMBERS_COLLECTION),
        }
    }

    /// Insert a new group record
    pub async fn create_group(&self, new: NewGroup) -> Result<GroupDocument, CatalogError> {
        let group = GroupDocument {
            id: ObjectId::new(),
            name: new.name,
            description: new.description,
            debut: new.debut,
            labels: new.labels,
            status: new.status,
            image_url: new.image_url,
            created_at: BsonDateTime::now(),
        };

        self.groups.insert_one(&group).await?;
        tracing::info!("Created group record: id={}", group.id.to_hex());
        Ok(group)
    }

    /// Insert a new member record. Group references are stored as given;
    /// nothing checks they resolve.
    pub async fn create_member(&self, new: NewMember) -> Result<MemberDocument, CatalogError> {
        let member = MemberDocument {
            id: ObjectId::new(),
            name: new.name,
            stage_name: new.stage_name,
            role: new.role,
            birth: new.birth,
            image_url: new.image_url,
            group_ids: new.group_ids,
            labels: new.labels,
            created_at: BsonDateTime::now(),
        };

        self.members.insert_one(&member).await?;
        tracing::info!("Created member record: id={}", member.id.to_hex());
        Ok(member)
    }

    /// All groups, unfiltered and unpaginated.
    pub async fn list_groups(&self) -> Result<Vec<GroupDocument>, CatalogError> {
        let cursor = self.groups.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    /// All members with each group reference resolved into the embedded
    /// group document. Dangling references come back as None.
    pub async fn list_members_joined(&self) -> Result<Vec<MemberWithGroups>, CatalogError> {
        let members: Vec<MemberDocument> =
            self.members.find(doc! {}).await?.try_collect().await?;
        let groups: Vec<GroupDocument> =
            self.groups.find(doc! {}).await?.try_collect().await?;

        let by_id: HashMap<ObjectId, GroupDocument> = groups
            .into_iter()
            .map(|group| (group.id.clone(), group))
            .collect();

        Ok(resolve_member_groups(members, &by_id))
    }
}

/// Resolve each member's group references against a snapshot of the groups
/// collection, keeping one entry per reference so dangling ids surface as
/// None instead of silently disappearing.
pub fn resolve_member_groups(
    members: Vec<MemberDocument>,
    groups: &HashMap<ObjectId, GroupDocument>,
) -> Vec<MemberWithGroups> {
    members
        .into_iter()
        .map(|member| {
            let resolved = member
                .group_ids
                .iter()
                .map(|id| groups.get(id).cloned())
                .collect();
            MemberWithGroups {
                member,
                groups: resolved,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str) -> GroupDocument {
        GroupDocument {
            id: ObjectId::new(),
            name: Some(name.to_string()),
            description: None,
            debut: None,
            labels: vec![],
            status: None,
            image_url: format!("https://raw.example.com/image/{}.png", name),
            created_at: BsonDateTime::now(),
        }
    }

    fn member(name: &str, group_ids: Vec<ObjectId>) -> MemberDocument {
        MemberDocument {
            id: ObjectId::new(),
            name: Some(name.to_string()),
            stage_name: None,
            role: vec![],
            birth: None,
            image_url: "https://raw.example.com/image/m.png".to_string(),
            group_ids,
            labels: vec![],
            created_at: BsonDateTime::now(),
        }
    }

    #[test]
    fn test_resolve_known_reference() {
        let g = group("NewJeans");
        let mut groups = HashMap::new();
        groups.insert(g.id.clone(), g.clone());

        let resolved = resolve_member_groups(vec![member("Minji", vec![g.id])], &groups);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].groups.len(), 1);
        assert_eq!(
            resolved[0].groups[0].as_ref().unwrap().name.as_deref(),
            Some("NewJeans")
        );
    }

    #[test]
    fn test_dangling_reference_resolves_to_none() {
        let g = group("NewJeans");
        let mut groups = HashMap::new();
        groups.insert(g.id.clone(), g.clone());

        let dangling = ObjectId::new();
        let resolved =
            resolve_member_groups(vec![member("Minji", vec![g.id, dangling])], &groups);

        assert_eq!(resolved[0].groups.len(), 2);
        assert!(resolved[0].groups[0].is_some());
        assert!(resolved[0].groups[1].is_none());
    }

    #[test]
    fn test_member_without_references() {
        let groups = HashMap::new();
        let resolved = resolve_member_groups(vec![member("Solo", vec![])], &groups);

        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].groups.is_empty());
    }
}
