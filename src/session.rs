//! Login identity sourced from durable storage.
//!
//! The store is injected with its storage backend so views and tests never
//! reach for ambient globals. Both change signals (the same-tab login
//! broadcast and the cross-tab storage change) funnel through one
//! re-derivation path, so the derived identity cannot diverge between the
//! two triggers.

use crate::storage::KeyValueStore;
use crate::types::{Conversation, Identity};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const USER_ID_KEY: &str = "userId";
pub const USER_NAME_KEY: &str = "userName";

type Listener = Box<dyn Fn(&Identity) + Send + Sync>;

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: Mutex<Identity>,
    epoch: AtomicU64,
    listeners: Mutex<Vec<Listener>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let current = Mutex::new(read_identity(storage.as_ref()));
        Self {
            storage,
            current,
            epoch: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Identity {
        self.current.lock().expect("session store poisoned").clone()
    }

    /// Bumped on every re-derivation; pollers compare it to spot changes.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }

    pub fn login(&self, user_id: i64, user_name: &str) -> Result<(), String> {
        self.storage.set(USER_ID_KEY, &user_id.to_string())?;
        self.storage.set(USER_NAME_KEY, user_name)?;
        self.notify_login_changed();
        Ok(())
    }

    pub fn logout(&self) -> Result<(), String> {
        self.storage.delete(USER_ID_KEY)?;
        self.storage.delete(USER_NAME_KEY)?;
        self.notify_login_changed();
        Ok(())
    }

    /// Same-tab signal, fired after any login/logout mutation.
    pub fn notify_login_changed(&self) {
        self.refresh();
    }

    /// Storage changed underneath us (another tab, another process).
    pub fn notify_storage_changed(&self) {
        self.refresh();
    }

    /// Register for identity changes. Listeners run on the notifying thread.
    pub fn subscribe(&self, listener: impl Fn(&Identity) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .expect("session store poisoned")
            .push(Box::new(listener));
    }

    fn refresh(&self) {
        let identity = read_identity(self.storage.as_ref());
        *self.current.lock().expect("session store poisoned") = identity.clone();
        self.epoch.fetch_add(1, Ordering::Relaxed);
        for listener in self.listeners.lock().expect("session store poisoned").iter() {
            listener(&identity);
        }
    }
}

fn read_identity(storage: &dyn KeyValueStore) -> Identity {
    let user_id = storage
        .get(USER_ID_KEY)
        .and_then(|raw| raw.trim().parse().ok());
    let user_name = storage.get(USER_NAME_KEY);
    Identity { user_id, user_name }
}

/// On transition to logged-out, server-backed threads must not linger in
/// the transcript as if they belonged to the guest.
pub fn drop_authenticated_conversations(conversations: &mut Vec<Conversation>) {
    conversations.retain(|c| c.id < 0);
}

/// True when the open thread belongs to the other storage partition than
/// the current identity selects. Writing such a thread through the newly
/// selected backend would only trip its id guard, so the view must drop
/// the selection instead.
pub fn thread_crosses_partition(identity: &Identity, active_id: Option<i64>) -> bool {
    match active_id {
        Some(id) => identity.is_logged_in() == (id < 0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EphemeralStore;

    fn fresh_store() -> SessionStore {
        SessionStore::new(Arc::new(EphemeralStore::default()))
    }

    #[test]
    fn starts_logged_out() {
        let session = fresh_store();
        assert!(!session.current().is_logged_in());
    }

    #[test]
    fn login_then_logout_rederives_identity() {
        let session = fresh_store();
        session.login(12, "Minji").unwrap();
        let identity = session.current();
        assert_eq!(identity.user_id, Some(12));
        assert_eq!(identity.user_name.as_deref(), Some("Minji"));

        session.logout().unwrap();
        assert_eq!(session.current(), Identity::default());
    }

    #[test]
    fn both_signals_share_the_rederivation_path() {
        let storage = Arc::new(EphemeralStore::default());
        let session = SessionStore::new(storage.clone());

        // A different tab writes the keys directly.
        storage.set(USER_ID_KEY, "7").unwrap();
        storage.set(USER_NAME_KEY, "Jun").unwrap();
        assert!(!session.current().is_logged_in());

        session.notify_storage_changed();
        assert_eq!(session.current().user_id, Some(7));

        storage.delete(USER_ID_KEY).unwrap();
        session.notify_login_changed();
        assert!(!session.current().is_logged_in());
    }

    #[test]
    fn epoch_advances_and_listeners_fire() {
        let session = fresh_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |identity| {
            sink.lock().unwrap().push(identity.clone());
        });

        let before = session.epoch();
        session.login(3, "Hana").unwrap();
        assert!(session.epoch() > before);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].user_id, Some(3));
    }

    #[test]
    fn garbage_user_id_reads_as_logged_out() {
        let storage = Arc::new(EphemeralStore::default());
        storage.set(USER_ID_KEY, "not-a-number").unwrap();
        let session = SessionStore::new(storage);
        assert!(!session.current().is_logged_in());
    }

    #[test]
    fn signing_in_over_an_open_guest_thread_crosses_partitions() {
        let logged_in = Identity {
            user_id: Some(7),
            user_name: Some("Jun".into()),
        };
        // A guest thread left selected when the user signs in must be
        // dropped, not written through the remote backend.
        assert!(thread_crosses_partition(&logged_in, Some(-2)));
        assert!(!thread_crosses_partition(&logged_in, Some(14)));
        assert!(!thread_crosses_partition(&logged_in, None));
    }

    #[test]
    fn logging_out_over_an_open_remote_thread_crosses_partitions() {
        let guest = Identity::default();
        assert!(thread_crosses_partition(&guest, Some(14)));
        assert!(!thread_crosses_partition(&guest, Some(-2)));
        assert!(!thread_crosses_partition(&guest, None));
    }

    #[test]
    fn logout_clears_authenticated_partition() {
        let conv = |id: i64| Conversation {
            id,
            title: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let mut listing = vec![conv(5), conv(-1), conv(12), conv(-2)];
        drop_authenticated_conversations(&mut listing);
        let ids: Vec<i64> = listing.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![-1, -2]);
    }
}
