use chrono::{DateTime, Utc};
use log::{info, warn};
use uuid::Uuid;

use crate::directory::Directory;
use crate::error::{DashboardError, DashboardResult};
use crate::models::Role;
use crate::storage::LocalStore;

const USER_TYPE_KEY: &str = "userType";
const SESSION_ID_KEY: &str = "sessionId";
const SIGNED_IN_AT_KEY: &str = "signedInAt";

/// The signed-in identity handed to every view.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub role: Role,
    pub session_id: Uuid,
    pub opened_at: DateTime<Utc>,
}

fn id_field(role: Role) -> &'static str {
    match role {
        Role::Student => "student ID",
        Role::Mentor => "mentor ID",
    }
}

/// Resolves an id against the directory. Nothing is persisted here.
pub fn sign_in(directory: &Directory, role: Role, raw_id: &str) -> DashboardResult<Session> {
    let id = raw_id.trim();
    if id.is_empty() {
        return Err(DashboardError::MissingField(id_field(role)));
    }
    if !directory.contains(role, id) {
        return Err(DashboardError::UnknownId {
            role,
            id: id.to_string(),
        });
    }

    Ok(Session {
        id: id.to_string(),
        role,
        session_id: Uuid::new_v4(),
        opened_at: Utc::now(),
    })
}

/// Session flag persistence over the local store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: LocalStore,
}

impl SessionStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn save(&self, session: &Session) -> anyhow::Result<()> {
        self.clear().await?;
        self.store.set(session.role.id_key(), &session.id).await?;
        self.store.set(USER_TYPE_KEY, session.role.label()).await?;
        self.store
            .set(SESSION_ID_KEY, &session.session_id.to_string())
            .await?;
        self.store
            .set(SIGNED_IN_AT_KEY, &session.opened_at.to_rfc3339())
            .await?;
        info!("session {} opened for {} {}", session.session_id, session.role, session.id);
        Ok(())
    }

    /// The stored session for `role`, or `None` when the visitor has to sign
    /// in again: no id stored, or stored under the other role.
    pub async fn load(&self, role: Role) -> anyhow::Result<Option<Session>> {
        let user_type = self.store.get(USER_TYPE_KEY).await?;
        if user_type.as_deref() != Some(role.label()) {
            return Ok(None);
        }
        let Some(id) = self.store.get(role.id_key()).await? else {
            return Ok(None);
        };

        let session_id = match self.store.get(SESSION_ID_KEY).await? {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("stored session id {raw} is not a uuid; issuing a new one");
                Uuid::new_v4()
            }),
            None => Uuid::new_v4(),
        };
        let opened_at = self
            .store
            .get(SIGNED_IN_AT_KEY)
            .await?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(Some(Session {
            id,
            role,
            session_id,
            opened_at,
        }))
    }

    /// Whichever session is stored, regardless of role.
    pub async fn current(&self) -> anyhow::Result<Option<Session>> {
        for role in Role::ALL.iter().copied() {
            if let Some(session) = self.load(role).await? {
                return Ok(Some(session));
            }
        }
        Ok(None)
    }

    /// Removes every stored key. The local store only ever holds session
    /// state.
    pub async fn clear(&self) -> anyhow::Result<()> {
        for key in self.store.keys().await? {
            self.store.remove(&key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_store;

    #[test]
    fn blank_and_unknown_ids_are_refused() {
        let directory = Directory::seeded();
        assert_eq!(
            sign_in(&directory, Role::Student, "  "),
            Err(DashboardError::MissingField("student ID"))
        );
        assert!(matches!(
            sign_in(&directory, Role::Mentor, "205631"),
            Err(DashboardError::UnknownId { role: Role::Mentor, .. })
        ));
        let session = sign_in(&directory, Role::Mentor, " M002 ").expect("known mentor");
        assert_eq!(session.id, "M002");
    }

    #[tokio::test]
    async fn failed_sign_in_never_touches_the_store() {
        let directory = Directory::seeded();
        let sessions = SessionStore::new(memory_store().await);

        if let Ok(session) = sign_in(&directory, Role::Student, "999999") {
            sessions.save(&session).await.expect("save");
        }

        assert_eq!(sessions.current().await.expect("current"), None);
        assert!(sessions.store.keys().await.expect("keys").is_empty());
    }

    #[tokio::test]
    async fn stored_session_only_opens_matching_portal() {
        let directory = Directory::seeded();
        let sessions = SessionStore::new(memory_store().await);
        let session = sign_in(&directory, Role::Student, "205631").expect("sign in");
        sessions.save(&session).await.expect("save");

        let restored = sessions.load(Role::Student).await.expect("load").expect("session");
        assert_eq!(restored.id, "205631");
        assert_eq!(restored.session_id, session.session_id);
        assert_eq!(sessions.load(Role::Mentor).await.expect("load"), None);
        assert_eq!(
            sessions.store.get("studentId").await.expect("get").as_deref(),
            Some("205631")
        );
    }

    #[tokio::test]
    async fn signing_in_again_replaces_the_previous_role() {
        let directory = Directory::seeded();
        let sessions = SessionStore::new(memory_store().await);
        let student = sign_in(&directory, Role::Student, "205631").expect("student");
        sessions.save(&student).await.expect("save");
        let mentor = sign_in(&directory, Role::Mentor, "M001").expect("mentor");
        sessions.save(&mentor).await.expect("save");

        assert_eq!(sessions.load(Role::Student).await.expect("load"), None);
        assert_eq!(sessions.store.get("studentId").await.expect("get"), None);

        sessions.clear().await.expect("clear");
        assert_eq!(sessions.current().await.expect("current"), None);
        assert!(sessions.store.keys().await.expect("keys").is_empty());
    }
}
