use crate::domain::Keyed;
use crate::store::EntityStore;

/// Local edit applied to a store ahead of the remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    Create(T),
    /// Replaces the entity stored under `old_key`. When the value carries a
    /// different key the old entry is removed and the value inserted under
    /// the new one.
    Update { old_key: String, value: T },
    Delete(String),
}

impl<T: Keyed> Mutation<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::Update { .. } => "update",
            Mutation::Delete(_) => "delete",
        }
    }

    /// Keys whose visible state this mutation changes.
    pub fn touched_keys(&self) -> Vec<String> {
        match self {
            Mutation::Create(value) => vec![value.key().to_string()],
            Mutation::Update { old_key, value } => {
                let mut keys = vec![old_key.clone()];
                if value.key() != old_key {
                    keys.push(value.key().to_string());
                }
                keys
            }
            Mutation::Delete(key) => vec![key.clone()],
        }
    }

    /// Key another entry already holds that a rename would overwrite.
    pub fn conflicting_key(&self, store: &EntityStore<T>) -> Option<&str> {
        match self {
            Mutation::Update { old_key, value }
                if value.key() != old_key && store.contains(value.key()) =>
            {
                Some(value.key())
            }
            _ => None,
        }
    }

    pub(crate) fn apply(self, store: &mut EntityStore<T>)
    where
        T: Clone,
    {
        match self {
            Mutation::Create(value) => store.upsert(value),
            Mutation::Update { old_key, value } => {
                if value.key() != old_key {
                    store.remove(&old_key);
                }
                store.upsert(value);
            }
            Mutation::Delete(key) => {
                store.remove(&key);
            }
        }
    }
}
