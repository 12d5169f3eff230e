use tracing::debug;

use palaver_shared::{CommunityId, ConversationId};

use crate::error::{Result, StoreError};
use crate::models::{Community, Conversation};
use crate::store::ConversationStore;

impl ConversationStore {
    pub fn communities(&self) -> &[Community] {
        &self.communities
    }

    pub fn community(&self, id: &CommunityId) -> Option<&Community> {
        self.communities.iter().find(|c| &c.id == id)
    }

    pub fn active_community(&self) -> Option<&Community> {
        self.active_community
            .as_ref()
            .and_then(|id| self.community(id))
    }

    /// The community's group conversations, in community order.
    pub fn community_groups(&self, id: &CommunityId) -> Result<Vec<&Conversation>> {
        let community = self
            .community(id)
            .ok_or_else(|| StoreError::CommunityNotFound(id.clone()))?;
        Ok(community
            .groups
            .iter()
            .filter_map(|g| self.conversation(g))
            .collect())
    }

    pub fn select_community(&mut self, id: Option<&CommunityId>) -> Result<()> {
        if let Some(id) = id {
            if self.community(id).is_none() {
                return Err(StoreError::CommunityNotFound(id.clone()));
            }
        }
        self.active_community = id.cloned();

        debug!(community = ?self.active_community, "Active community changed");
        self.publish();
        Ok(())
    }

    /// Open one of a community's groups: selects the community and makes the
    /// group the active conversation.
    pub fn select_community_group(
        &mut self,
        community: &CommunityId,
        group: &ConversationId,
    ) -> Result<()> {
        let owned = self
            .community(community)
            .ok_or_else(|| StoreError::CommunityNotFound(community.clone()))?
            .groups
            .contains(group);
        if !owned {
            return Err(StoreError::ConversationNotFound(group.clone()));
        }

        self.select_conversation(Some(group))?;
        self.select_community(Some(community))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{demo_store, family, sarah};

    fn maple() -> CommunityId {
        CommunityId::from("community-1")
    }

    #[test]
    fn test_select_community() {
        let mut store = demo_store();
        store.select_community(Some(&maple())).unwrap();
        assert_eq!(store.active_community().unwrap().name, "Maple Street");

        store.select_community(None).unwrap();
        assert!(store.active_community().is_none());

        let missing = CommunityId::from("community-9");
        assert_eq!(
            store.select_community(Some(&missing)),
            Err(StoreError::CommunityNotFound(missing))
        );
    }

    #[test]
    fn test_select_community_group() {
        let mut store = demo_store();
        store.select_community_group(&maple(), &family()).unwrap();
        assert_eq!(store.active_id(), Some(&family()));
        assert_eq!(store.active_community().map(|c| &c.id), Some(&maple()));

        let snap = store.snapshot();
        assert_eq!(snap.active.map(|c| c.id), Some(family()));
        assert_eq!(snap.active_community.map(|c| c.id), Some(maple()));
    }

    #[test]
    fn test_group_outside_community_is_rejected() {
        let mut store = demo_store();
        assert_eq!(
            store.select_community_group(&maple(), &sarah()),
            Err(StoreError::ConversationNotFound(sarah()))
        );
        assert!(store.active().is_none());
        assert!(store.active_community().is_none());
    }

    #[test]
    fn test_community_groups() {
        let store = demo_store();
        let names: Vec<&str> = store
            .community_groups(&maple())
            .unwrap()
            .iter()
            .filter_map(|c| c.group_name.as_deref())
            .collect();
        assert_eq!(names, vec!["Family Group", "Work Team"]);
    }
}
