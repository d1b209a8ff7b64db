use std::collections::{BTreeMap, BTreeSet};
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard};

use nix::sys::signal::Signal;

use jobscreen::session::{BoxFuture, SessionEntry, SessionService, SpawnRequest, INTERRUPT_KEYS};

/// Everything the supervisor asked of the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Create(String),
    List,
    SendKeys(String, String),
    Signal(u32, Signal),
    Terminate(String),
    Wipe,
    Attach(String),
}

#[derive(Debug, Default)]
struct State {
    sessions: BTreeMap<String, u32>,
    requests: Vec<SpawnRequest>,
    refused: BTreeSet<String>,
    deaf: BTreeSet<String>,
    calls: Vec<SessionCall>,
    next_pid: u32,
    ignore_interrupt: bool,
    ignore_quit: bool,
    fail_create: bool,
    fail_send_keys: bool,
    fail_signal: bool,
    fail_list: bool,
}

/// In-memory session service.
///
/// - Creating a session under a live name fails, so accidental double
///   starts show up in tests.
/// - Ctrl-C ends a session unless `ignore_interrupt` is set.
/// - Terminate ends a session unless `ignore_quit` is set.
/// - SIGKILL always ends the session it targets, unless signals fail.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// supervisor.
#[derive(Debug, Clone, Default)]
pub struct FakeSessions {
    state: Arc<Mutex<State>>,
}

impl FakeSessions {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.lock().next_pid = 1000;
        fake
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Pretend a session named `name` is already running; returns its pid.
    pub fn seed(&self, name: &str) -> u32 {
        let mut state = self.lock();
        state.next_pid += 1;
        let pid = state.next_pid;
        state.sessions.insert(name.to_string(), pid);
        pid
    }

    /// End a session as if its job exited on its own.
    pub fn end(&self, name: &str) {
        self.lock().sessions.remove(name);
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.lock().sessions.contains_key(name)
    }

    pub fn session_names(&self) -> Vec<String> {
        self.lock().sessions.keys().cloned().collect()
    }

    pub fn requests(&self) -> Vec<SpawnRequest> {
        self.lock().requests.clone()
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.lock().calls.clone()
    }

    /// Calls other than listings, which are mostly noise.
    pub fn actions(&self) -> Vec<SessionCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != SessionCall::List)
            .collect()
    }

    /// Make every create for `name` fail.
    pub fn refuse(&self, name: &str) {
        self.lock().refused.insert(name.to_string());
    }

    /// Make every keystroke sent to `name` fail.
    pub fn refuse_keys(&self, name: &str) {
        self.lock().deaf.insert(name.to_string());
    }

    pub fn set_ignore_interrupt(&self, value: bool) {
        self.lock().ignore_interrupt = value;
    }

    pub fn set_ignore_quit(&self, value: bool) {
        self.lock().ignore_quit = value;
    }

    pub fn set_fail_create(&self, value: bool) {
        self.lock().fail_create = value;
    }

    pub fn set_fail_send_keys(&self, value: bool) {
        self.lock().fail_send_keys = value;
    }

    pub fn set_fail_signal(&self, value: bool) {
        self.lock().fail_signal = value;
    }

    /// Make listings fail, as when `screen` cannot be run at all.
    pub fn set_fail_list(&self, value: bool) {
        self.lock().fail_list = value;
    }

    fn render_listing(state: &State) -> String {
        if state.sessions.is_empty() {
            return "No Sockets found in /run/screen/S-test.\n".to_string();
        }
        let mut out = String::from("There are screens on:\n");
        for (name, pid) in &state.sessions {
            out.push_str(&format!("\t{pid}.{name}\t(Detached)\n"));
        }
        out.push_str(&format!(
            "{} Sockets in /run/screen/S-test.\n",
            state.sessions.len()
        ));
        out
    }
}

impl SessionService for FakeSessions {
    fn create_detached<'a>(&'a self, request: &'a SpawnRequest) -> BoxFuture<'a, bool> {
        let mut state = self.lock();
        state.calls.push(SessionCall::Create(request.session.clone()));
        state.requests.push(request.clone());

        let ok = !state.fail_create
            && !state.refused.contains(&request.session)
            && !state.sessions.contains_key(&request.session);
        if ok {
            state.next_pid += 1;
            let pid = state.next_pid;
            state.sessions.insert(request.session.clone(), pid);
        }
        Box::pin(ready(ok))
    }

    fn list_sessions(&self) -> BoxFuture<'_, Option<String>> {
        let mut state = self.lock();
        state.calls.push(SessionCall::List);
        let listing = (!state.fail_list).then(|| Self::render_listing(&state));
        Box::pin(ready(listing))
    }

    fn send_keys<'a>(&'a self, session: &'a str, keys: &'a str) -> BoxFuture<'a, bool> {
        let mut state = self.lock();
        state
            .calls
            .push(SessionCall::SendKeys(session.to_string(), keys.to_string()));

        let ok = !state.fail_send_keys
            && !state.deaf.contains(session)
            && state.sessions.contains_key(session);
        if ok && keys == INTERRUPT_KEYS && !state.ignore_interrupt {
            state.sessions.remove(session);
        }
        Box::pin(ready(ok))
    }

    fn send_signal<'a>(&'a self, session: &'a SessionEntry, signal: Signal) -> BoxFuture<'a, bool> {
        let mut state = self.lock();
        state.calls.push(SessionCall::Signal(session.pid, signal));

        let ok = !state.fail_signal;
        if ok && signal == Signal::SIGKILL {
            state.sessions.retain(|_, pid| *pid != session.pid);
        }
        Box::pin(ready(ok))
    }

    fn terminate_session<'a>(&'a self, session: &'a str) -> BoxFuture<'a, bool> {
        let mut state = self.lock();
        state.calls.push(SessionCall::Terminate(session.to_string()));

        let ok = state.sessions.contains_key(session);
        if ok && !state.ignore_quit {
            state.sessions.remove(session);
        }
        Box::pin(ready(ok))
    }

    fn wipe(&self) -> BoxFuture<'_, bool> {
        self.lock().calls.push(SessionCall::Wipe);
        Box::pin(ready(true))
    }

    fn attach<'a>(&'a self, session: &'a str) -> BoxFuture<'a, bool> {
        let mut state = self.lock();
        state.calls.push(SessionCall::Attach(session.to_string()));
        let ok = state.sessions.contains_key(session);
        Box::pin(ready(ok))
    }
}
