use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::puzzles::scoring::UserDirectory;
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let name_key = keys::username_index_key(&user.username);

        // Claim the name first so two registrations of the same name cannot
        // both succeed.
        let cas_result = self
            .users
            .compare_and_swap(
                name_key.as_bytes(),
                None::<&[u8]>,
                Some(user.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;

        if let Err(_current_value) = cas_result {
            return Err(StoreError::Conflict {
                entity: "username".to_string(),
                key: user.username.clone(),
            });
        }

        let user_key = keys::user_key(&user.id);
        let user_bytes = Self::serialize(user)?;
        if let Err(e) = self.users.insert(user_key.as_bytes(), user_bytes) {
            let _ = self.users.remove(name_key.as_bytes());
            return Err(StoreError::Sled(e));
        }

        Ok(())
    }

    pub fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        if user_id.starts_with("name:") {
            return Ok(None);
        }
        let key = keys::user_key(user_id);
        match self.users.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let index_key = keys::username_index_key(username);
        let Some(user_id_raw) = self.users.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        let user_id = match String::from_utf8(user_id_raw.to_vec()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid UTF-8 in username index");
                return Ok(None);
            }
        };
        self.get_user_by_id(&user_id)
    }

    pub fn list_users(&self, limit: usize, offset: usize) -> Result<Vec<User>, StoreError> {
        let mut users = Vec::new();
        for item in self.users.iter() {
            let (key, value) = item?;
            if key.starts_with(b"name:") {
                continue;
            }
            users.push(Self::deserialize::<User>(&value)?);
        }
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users.into_iter().skip(offset).take(limit).collect())
    }

    pub fn count_users(&self) -> Result<usize, StoreError> {
        let mut count = 0usize;
        for item in self.users.iter() {
            let (key, _) = item?;
            if !key.starts_with(b"name:") {
                count += 1;
            }
        }
        Ok(count)
    }
}

impl UserDirectory for Store {
    fn display_name(&self, user_id: &str) -> Option<String> {
        match self.get_user_by_id(user_id) {
            Ok(user) => user.map(|u| u.username),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to resolve user name");
                None
            }
        }
    }
}
