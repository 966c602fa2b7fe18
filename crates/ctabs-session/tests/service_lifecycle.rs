#![forbid(unsafe_code)]

//! Service lifecycle across threads: sessions are created by the service,
//! shells report their pid from a spawner thread, and closing tabs tears
//! everything down.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use ctabs_session::remover::{remove_session, remove_x_session};
use ctabs_session::{
    ServiceAction, SessionFactory, SessionRegistry, SessionServiceClient, ShellParameter,
    StatusSummary, TermTab, TerminalSession, XSessionTab,
};

#[derive(Debug)]
struct Shell {
    handle: String,
    running: AtomicBool,
    pid: AtomicI32,
    input: Mutex<String>,
}

impl TerminalSession for Shell {
    fn handle(&self) -> &str {
        &self.handle
    }

    fn finish_if_running(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn write(&self, data: &str) {
        self.input
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_str(data);
    }

    fn set_shell_pid(&self, pid: i32) {
        self.pid.store(pid, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Display(u32);

#[derive(Default)]
struct Host {
    next: AtomicUsize,
    statuses: Mutex<Vec<StatusSummary>>,
}

impl SessionFactory for Host {
    type Session = Shell;
    type XSession = Display;
    type XParameter = u32;

    fn create_session(&self, parameter: &ShellParameter) -> Shell {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Shell {
            handle: format!("session-{n}"),
            running: AtomicBool::new(true),
            pid: AtomicI32::new(0),
            input: Mutex::new(parameter.initial_command.clone().unwrap_or_default()),
        }
    }

    fn create_x_session(&self, display: &u32) -> Display {
        Display(*display)
    }

    fn publish_status(&self, status: &StatusSummary) {
        self.statuses.lock().unwrap().push(*status);
    }
}

struct ShellTab {
    session: Option<Arc<Shell>>,
}

impl TermTab<Shell> for ShellTab {
    fn term_session(&self) -> Option<&Arc<Shell>> {
        self.session.as_ref()
    }

    fn cleanup(&mut self) {
        self.session = None;
    }
}

struct DisplayTab(Arc<Display>);

impl XSessionTab<Display> for DisplayTab {
    fn x_session(&self) -> Option<&Arc<Display>> {
        Some(&self.0)
    }
}

#[test]
fn pids_reported_from_other_threads_reach_sessions() {
    let shared = SessionRegistry::new(Host::default()).into_shared();
    let client = SessionServiceClient::new(Arc::clone(&shared));

    let sessions: Vec<Arc<Shell>> = (0..4)
        .map(|_| {
            client
                .registry()
                .create_term_session(&ShellParameter::new().with_executable("/bin/sh"))
                .unwrap()
        })
        .collect();

    let spawners: Vec<_> = sessions
        .iter()
        .enumerate()
        .map(|(i, session)| {
            let client = client.clone();
            let handle = session.handle().to_owned();
            thread::spawn(move || client.set_terminal_shell_pid(&handle, 1000 + i as i32))
        })
        .collect();
    for spawner in spawners {
        assert!(spawner.join().unwrap());
    }

    for (i, session) in sessions.iter().enumerate() {
        assert_eq!(session.pid.load(Ordering::SeqCst), 1000 + i as i32);
    }
}

#[test]
fn closing_tabs_tears_down_the_service_state() {
    let mut registry = SessionRegistry::new(Host::default());
    let first = registry
        .create_term_session(&ShellParameter::new().with_initial_command("echo hi\n"))
        .unwrap();
    let mut tab = ShellTab {
        session: Some(Arc::clone(&first)),
    };
    registry
        .create_term_session(
            &ShellParameter::new()
                .with_session_id(first.handle())
                .with_initial_command("exit"),
        )
        .unwrap();
    assert_eq!(*first.input.lock().unwrap(), "echo hi\nexit\n");

    let display = DisplayTab(registry.create_x_session(&0));
    registry.handle_action("com.thertxnetwork.andrinux.action.service.lock.acquire".parse().unwrap());
    assert_eq!(
        registry.status(),
        StatusSummary {
            sessions: 1,
            x_sessions: 1,
            lock_acquired: true,
        }
    );

    assert_eq!(remove_session(Some(&mut registry), &mut tab), Some(0));
    assert!(tab.session.is_none());
    assert!(!first.is_running());
    assert_eq!(remove_x_session(Some(&mut registry), Some(&display)), Some(0));
    assert_eq!(display.0.0, 0);

    registry.handle_action(ServiceAction::ReleaseLock);
    assert_eq!(registry.status(), StatusSummary::default());

    let statuses = registry.factory().statuses.lock().unwrap();
    assert_eq!(statuses.last(), Some(&StatusSummary::default()));
    assert_eq!(statuses.len(), 7);
}
