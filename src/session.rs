//! Authenticated session management
//!
//! A [`Session`] remembers which account is logged in, persists that
//! choice so the app restarts into the same account, and keeps the
//! account under observation while it is active:
//!
//! - a liveness thread stamps `lastActive` once a minute so the admin
//!   dashboard can show who is online
//! - a watcher thread rechecks the account whenever the users
//!   collection changes (and at a slow poll as a safety net); if the
//!   account has been deleted the session logs itself out, if it was
//!   edited the cached copy is refreshed
//!
//! Both threads stop promptly on logout or when the session is
//! dropped.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use crate::db::{Database, User};
use crate::storage::watch::Fanout;
use crate::{CURRENT_USER_KEY, EXISTENCE_POLL_INTERVAL, LIVENESS_INTERVAL, USERS_KEY};

/// Session lifecycle notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// An account logged in
    LoggedIn,
    /// The session ended, by request or because the account vanished.
    /// Hosts should navigate back to the public screen on this.
    LoggedOut,
}

/// The logged-in account and its monitoring threads
pub struct Session {
    db: Database,
    inner: Arc<SessionInner>,
    monitor: Mutex<Option<Monitor>>,
}

impl Session {
    /// Create a session, restoring the previously logged-in account
    /// from the store when one is present.
    ///
    /// A restored account starts monitored right away, so one that was
    /// deleted while the app was closed logs out within the poll
    /// interval. Restoring emits no event.
    pub fn new(db: Database) -> Self {
        let session = Self {
            db,
            inner: Arc::new(SessionInner::new()),
            monitor: Mutex::new(None),
        };

        let stored: Option<User> = session.db.store().get(CURRENT_USER_KEY, None);
        if let Some(user) = stored {
            session.inner.set_current(Some(user.clone()));
            *session.lock_monitor() = Some(Monitor::start(
                session.db.clone(),
                Arc::clone(&session.inner),
                user.id,
            ));
        }

        session
    }

    /// Log an account in: persist it, cache it and start monitoring.
    ///
    /// Replaces any session that was already active.
    pub fn login(&self, user: &User) {
        self.db.store().set(CURRENT_USER_KEY, user);
        self.inner.set_current(Some(user.clone()));

        let monitor = Monitor::start(self.db.clone(), Arc::clone(&self.inner), user.id.clone());
        *self.lock_monitor() = Some(monitor);

        self.inner.events.publish(SessionEvent::LoggedIn);
    }

    /// End the session and forget the persisted account
    pub fn logout(&self) {
        *self.lock_monitor() = None;
        let was_logged_in = self.inner.take_current().is_some();
        self.db.store().remove(CURRENT_USER_KEY);
        if was_logged_in {
            self.inner.events.publish(SessionEvent::LoggedOut);
        }
    }

    /// Persist profile edits to both the session slot and the users
    /// collection
    pub fn update_profile(&self, user: &User) {
        self.db.store().set(CURRENT_USER_KEY, user);
        self.inner.set_current(Some(user.clone()));
        self.db.update_user(user);
    }

    /// The logged-in account, if any
    pub fn current_user(&self) -> Option<User> {
        self.inner.current()
    }

    /// Whether an account is logged in
    pub fn is_authenticated(&self) -> bool {
        self.inner.current().is_some()
    }

    /// Subscribe to login and logout notifications
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn lock_monitor(&self) -> MutexGuard<'_, Option<Monitor>> {
        self.monitor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// State shared between the session handle and its threads
struct SessionInner {
    current: Mutex<Option<User>>,
    events: Fanout<SessionEvent>,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            current: Mutex::new(None),
            events: Fanout::new(),
        }
    }

    fn current(&self) -> Option<User> {
        self.lock_current().clone()
    }

    fn set_current(&self, user: Option<User>) {
        *self.lock_current() = user;
    }

    fn take_current(&self) -> Option<User> {
        self.lock_current().take()
    }

    /// Replace the cached copy with a fresh one, but only while the
    /// same account is still logged in
    fn refresh(&self, fresh: User) {
        let mut current = self.lock_current();
        if let Some(user) = current.as_mut() {
            if user.id == fresh.id {
                *user = fresh;
            }
        }
    }

    /// Clear the cached account if it matches; reports whether it did
    fn clear_if(&self, user_id: &str) -> bool {
        let mut current = self.lock_current();
        match current.as_ref() {
            Some(user) if user.id == user_id => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<User>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Flag the monitor threads park on, wakeable for instant shutdown
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        let mut stopped = self
            .stopped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stopped = true;
        self.condvar.notify_all();
    }

    fn is_stopped(&self) -> bool {
        *self
            .stopped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Park until stopped or the timeout passes; true means stopped
    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = self
            .stopped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _timed_out) = self
                .condvar
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            stopped = guard;
        }
        true
    }
}

/// Handle to the two monitoring threads of one login.
///
/// Dropping it signals both threads to exit; they are detached, so
/// nothing blocks on them.
struct Monitor {
    stop: Arc<StopSignal>,
}

impl Monitor {
    fn start(db: Database, inner: Arc<SessionInner>, user_id: String) -> Self {
        let stop = Arc::new(StopSignal::default());

        // First ping happens right away, not a minute in
        db.update_last_active(&user_id);

        {
            let db = db.clone();
            let stop = Arc::clone(&stop);
            let user_id = user_id.clone();
            thread::spawn(move || {
                while !stop.wait(LIVENESS_INTERVAL) {
                    db.update_last_active(&user_id);
                }
            });
        }

        {
            let stop = Arc::clone(&stop);
            let events = db.store().subscribe();
            thread::spawn(move || {
                loop {
                    let wake = events.recv_timeout(EXISTENCE_POLL_INTERVAL);
                    if stop.is_stopped() {
                        break;
                    }
                    match wake {
                        // Only the users collection affects this session
                        Ok(event) if event.key != USERS_KEY => continue,
                        Ok(_) | Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }

                    match db.find_user(&user_id) {
                        Some(fresh) => inner.refresh(fresh),
                        None => {
                            // Account is gone: end the session from here
                            if inner.clear_if(&user_id) {
                                db.store().remove(CURRENT_USER_KEY);
                                inner.events.publish(SessionEvent::LoggedOut);
                            }
                            stop.stop();
                            break;
                        }
                    }
                }
            });
        }

        Self { stop }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::database::tests::create_test_db;

    /// Poll a condition for a few seconds; monitoring reacts within
    /// milliseconds normally
    fn wait_until(check: impl Fn() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(25));
        }
        check()
    }

    fn stored_user(db: &Database) -> Option<User> {
        db.store().get(CURRENT_USER_KEY, None)
    }

    #[test]
    fn test_login_authenticates_and_persists() {
        let (db, _temp) = create_test_db();
        let user = db.register_user("Ali", "1234").unwrap();

        let session = Session::new(db.clone());
        assert!(!session.is_authenticated());

        session.login(&user);

        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().id, user.id);
        assert_eq!(stored_user(&db).unwrap().id, user.id);
    }

    #[test]
    fn test_login_pings_last_active() {
        let (db, _temp) = create_test_db();
        let user = db.register_user("Ali", "1234").unwrap();
        assert!(user.last_active.is_none());

        let session = Session::new(db.clone());
        session.login(&user);

        assert!(wait_until(|| {
            db.find_user(&user.id).unwrap().last_active.is_some()
        }));
    }

    #[test]
    fn test_login_emits_event() {
        let (db, _temp) = create_test_db();
        let user = db.register_user("Ali", "1234").unwrap();
        let session = Session::new(db);
        let events = session.subscribe();

        session.login(&user);

        assert_eq!(
            events.recv_timeout(Duration::from_secs(1)).unwrap(),
            SessionEvent::LoggedIn
        );
    }

    #[test]
    fn test_session_restores_from_store() {
        let (db, _temp) = create_test_db();
        let user = db.register_user("Ali", "1234").unwrap();

        {
            let session = Session::new(db.clone());
            session.login(&user);
        }

        let restored = Session::new(db);
        assert!(restored.is_authenticated());
        assert_eq!(restored.current_user().unwrap().id, user.id);
    }

    #[test]
    fn test_fresh_store_starts_logged_out() {
        let (db, _temp) = create_test_db();
        let session = Session::new(db);
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_logout_clears_everything() {
        let (db, _temp) = create_test_db();
        let user = db.register_user("Ali", "1234").unwrap();
        let session = Session::new(db.clone());
        session.login(&user);
        let events = session.subscribe();

        session.logout();

        assert!(!session.is_authenticated());
        assert!(stored_user(&db).is_none());
        assert_eq!(
            events.recv_timeout(Duration::from_secs(1)).unwrap(),
            SessionEvent::LoggedOut
        );
    }

    #[test]
    fn test_logout_when_already_logged_out_is_quiet() {
        let (db, _temp) = create_test_db();
        let session = Session::new(db);
        let events = session.subscribe();

        session.logout();

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_deleting_user_forces_logout() {
        let (db, _temp) = create_test_db();
        let user = db.register_user("Ali", "1234").unwrap();
        let session = Session::new(db.clone());
        session.login(&user);
        let events = session.subscribe();

        db.delete_user(&user.id);

        assert!(wait_until(|| !session.is_authenticated()));
        assert!(stored_user(&db).is_none());
        assert_eq!(
            events.recv_timeout(Duration::from_secs(5)).unwrap(),
            SessionEvent::LoggedOut
        );
    }

    #[test]
    fn test_external_edit_refreshes_cached_user() {
        let (db, _temp) = create_test_db();
        let mut user = db.register_user("Ali", "1234").unwrap();
        let session = Session::new(db.clone());
        session.login(&user);

        // Another handle (say, the admin screen) edits the account
        user.total_points = 77;
        db.update_user(&user);

        assert!(wait_until(|| {
            session
                .current_user()
                .map(|u| u.total_points == 77)
                .unwrap_or(false)
        }));
    }

    #[test]
    fn test_update_profile_propagates() {
        let (db, _temp) = create_test_db();
        let mut user = db.register_user("Ali", "1234").unwrap();
        let session = Session::new(db.clone());
        session.login(&user);

        user.avatar = Some("data:image/png;base64,abc".to_string());
        session.update_profile(&user);

        assert_eq!(
            session.current_user().unwrap().avatar.as_deref(),
            Some("data:image/png;base64,abc")
        );
        assert_eq!(
            db.find_user(&user.id).unwrap().avatar.as_deref(),
            Some("data:image/png;base64,abc")
        );
        assert_eq!(
            stored_user(&db).unwrap().avatar.as_deref(),
            Some("data:image/png;base64,abc")
        );
    }

    #[test]
    fn test_second_login_replaces_first() {
        let (db, _temp) = create_test_db();
        let ali = db.register_user("Ali", "1234").unwrap();
        let vali = db.register_user("Vali", "1234").unwrap();
        let session = Session::new(db.clone());

        session.login(&ali);
        session.login(&vali);
        assert_eq!(session.current_user().unwrap().id, vali.id);

        // Deleting the replaced account must not end Vali's session
        db.delete_user(&ali.id);
        thread::sleep(Duration::from_millis(200));
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().id, vali.id);
    }
}
