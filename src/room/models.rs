use std::collections::HashSet;

/// A live session room: the connections currently joined to one campaign.
/// Lives only in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomModel {
    pub id: String, // campaign id
    pub connection_ids: HashSet<String>,
}

impl RoomModel {
    pub fn new(id: String) -> Self {
        Self {
            id,
            connection_ids: HashSet::new(),
        }
    }

    /// Returns false if the connection was already in the room
    pub fn add_connection(&mut self, connection_id: &str) -> bool {
        self.connection_ids.insert(connection_id.to_string())
    }

    pub fn remove_connection(&mut self, connection_id: &str) -> bool {
        self.connection_ids.remove(connection_id)
    }

    pub fn has_connection(&self, connection_id: &str) -> bool {
        self.connection_ids.contains(connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.connection_ids.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.connection_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connections_are_a_set() {
        let mut room = RoomModel::new("campaign-1".to_string());

        assert!(room.add_connection("a"));
        assert!(!room.add_connection("a"));
        assert_eq!(room.connection_count(), 1);

        assert!(room.remove_connection("a"));
        assert!(room.is_empty());
        assert!(!room.remove_connection("a"));
    }
}
