use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    EngineError, Group, GroupDetail, ResultEngine,
    storage::Storage,
    util::{normalize_display, normalize_key},
};

use super::{Engine, access, with_tx};

impl Engine {
    /// Create a group administered by `user_id`, who becomes its first member.
    ///
    /// Names are unique among the groups the user belongs to, ignoring case,
    /// accents and spacing.
    pub async fn create_group(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> ResultEngine<Group> {
        let name = normalize_display(name).ok_or_else(|| {
            EngineError::Validation("group name must not be empty".to_string())
        })?;
        let key = normalize_key(&name);
        let group = Group::new(name, description.trim().to_string(), user_id);

        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            storage.fetch_user_by_id(user_id).await?;
            let taken = storage
                .fetch_groups_by_user(user_id)
                .await?
                .iter()
                .any(|existing| normalize_key(&existing.name) == key);
            if taken {
                return Err(EngineError::ExistingKey(group.name));
            }

            storage.create_group(&group).await?;
            storage.add_user_to_group(group.id, user_id).await?;

            tracing::info!(group_id = %group.id, user_id, "group created");
            Ok(group)
        })
    }

    /// Add `new_member_id` to the group. The caller must belong to the group
    /// and be friends with the new member.
    pub async fn join_group(
        &self,
        user_id: &str,
        group_id: Uuid,
        new_member_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            access::require_group_member(&storage, group_id, user_id).await?;
            storage.fetch_user_by_id(new_member_id).await?;
            if new_member_id != user_id && !storage.are_friends(user_id, new_member_id).await? {
                return Err(EngineError::Validation(
                    "new member should be a friend of current user".to_string(),
                ));
            }
            if storage.is_group_member(group_id, new_member_id).await? {
                return Err(EngineError::ExistingKey(new_member_id.to_string()));
            }
            storage.add_user_to_group(group_id, new_member_id).await?;

            tracing::info!(%group_id, user_id, new_member_id, "group member added");
            Ok(())
        })
    }

    pub async fn leave_group(&self, user_id: &str, group_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            storage.fetch_group_by_id(group_id).await?;
            if !storage.is_group_member(group_id, user_id).await? {
                return Err(EngineError::Validation(
                    "user does not exist in group".to_string(),
                ));
            }
            storage.remove_user_from_group(group_id, user_id).await?;

            tracing::info!(%group_id, user_id, "group member left");
            Ok(())
        })
    }

    /// Delete the group with all of its expenses. Admin only.
    pub async fn delete_group(&self, user_id: &str, group_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            let group = storage.fetch_group_by_id(group_id).await?;
            if !group.is_admin(user_id) {
                return Err(EngineError::Validation(
                    "user is not admin of the group, cannot delete group".to_string(),
                ));
            }
            storage.delete_group(group_id).await?;

            tracing::info!(%group_id, user_id, "group deleted");
            Ok(())
        })
    }

    pub async fn group_detail(&self, user_id: &str, group_id: Uuid) -> ResultEngine<GroupDetail> {
        let storage = Storage::new(&self.database);
        let group = access::require_group_member(&storage, group_id, user_id).await?;
        let members = storage.fetch_group_members(group_id).await?;
        Ok(GroupDetail { group, members })
    }

    /// Groups the user belongs to.
    pub async fn groups(&self, user_id: &str) -> ResultEngine<Vec<Group>> {
        Storage::new(&self.database)
            .fetch_groups_by_user(user_id)
            .await
    }
}
