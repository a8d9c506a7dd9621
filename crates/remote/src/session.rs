use std::sync::{Arc, RwLock};

/// The authenticated user, as far as the sync core cares. Login itself is
/// someone else's problem; we only ask who is signed in right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.map(str::to_string),
        }
    }
}

/// Shared login state, read before every remote operation rather than
/// cached: login and logout can happen at any point in the app's lifetime.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>, email: Option<&str>) -> Self {
        let handle = Self::new();
        handle.set(Session::new(user_id, email));
        handle
    }

    pub fn set(&self, session: Session) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(session),
            Err(poisoned) => *poisoned.into_inner() = Some(session),
        }
    }

    pub fn clear(&self) {
        match self.inner.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn current(&self) -> Option<Session> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_logout_roundtrip() {
        let handle = SessionHandle::new();
        assert!(handle.current().is_none());

        handle.set(Session::new("user-1", Some("a@b.c")));
        assert_eq!(handle.current().unwrap().user_id, "user-1");

        let clone = handle.clone();
        clone.clear();
        // Clones share state: logout is visible everywhere.
        assert!(handle.current().is_none());
    }
}
