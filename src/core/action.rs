//! # Actions
//!
//! Everything that can happen in the client becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The thread list arrives? That's `Action::ThreadsLoaded(threads)`.
//!
//! The `update()` function applies an action to the session and returns the
//! side effects the TUI layer should start. No I/O happens here.
//!
//! ```text
//! Session + Action  →  update()  →  Session' + Vec<Effect>
//! ```
//!
//! Background tasks never touch the session. They send an `Action` over the
//! loop's channel, so every mutation happens on the render loop.

use log::{debug, info, warn};

use crate::core::format::RenderedMessage;
use crate::core::state::{ExitMode, Session, Viewport};
use crate::core::style::Attr;
use crate::core::tab::CommandOutcome;
use crate::messaging::Thread;

/// A message from the service, already resolved to display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub thread_id: String,
    pub author_name: String,
    pub message: RenderedMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Keyboard
    InsertChar(char),
    Backspace,
    Submit,
    NextTab,
    PrevTab,
    CloseTab,
    Resize { width: u16, height: u16 },
    ForceQuit,

    // Background task results
    ThreadsLoaded(Vec<Thread>),
    ThreadsFailed(String),
    SearchCompleted { query: String, threads: Vec<Thread> },
    SearchFailed { query: String, error: String },
    HistoryLoaded { thread_id: String, messages: Vec<RenderedMessage> },
    HistoryFailed { thread_id: String, error: String },
    MessageReceived(IncomingMessage),
    SendFailed { thread_id: String, error: String },
    /// The inbound stream ended; `Some` carries the error that ended it.
    ListenerStopped(Option<String>),
}

/// Work for the TUI layer to start after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchThreads { limit: usize },
    Search(String),
    FetchHistory { thread_id: String, limit: usize },
    SendMessage { thread_id: String, text: String },
    MarkRead(String),
    Exit(ExitMode),
}

/// Effects to run once the session exists: fetch the thread list.
pub fn startup(session: &Session) -> Vec<Effect> {
    vec![Effect::FetchThreads {
        limit: session.thread_list_limit(),
    }]
}

pub fn update(session: &mut Session, action: Action) -> Vec<Effect> {
    match action {
        Action::InsertChar(c) => {
            if c.is_control() {
                return Vec::new();
            }
            session.active_tab_mut().command_buffer.push(c);
            session.scheduler.request();
            // Typing in a tab counts as reading it
            session
                .active_tab_mut()
                .mark_seen()
                .map(Effect::MarkRead)
                .into_iter()
                .collect()
        }
        Action::Backspace => {
            if session.active_tab_mut().command_buffer.pop().is_some() {
                session.scheduler.request();
            }
            Vec::new()
        }
        Action::Submit => submit(session),
        Action::NextTab => session.step_tab(1),
        Action::PrevTab => session.step_tab(-1),
        Action::CloseTab => session.close_active_tab(),
        Action::Resize { width, height } => {
            session.set_viewport(Viewport::new(width, height));
            Vec::new()
        }
        Action::ForceQuit => vec![Effect::Exit(ExitMode::Quit)],

        Action::ThreadsLoaded(threads) => {
            info!("Loaded {} threads", threads.len());
            session.update_tab(0, |root| root.show_thread_list(threads));
            Vec::new()
        }
        Action::ThreadsFailed(error) => {
            session.push_message(0, format!("Failed to load threads: {error}"), Attr::BOLD);
            Vec::new()
        }
        Action::SearchCompleted { query, threads } => {
            debug!("Search '{}' returned {} threads", query, threads.len());
            session.update_tab(0, |root| root.append_search_results(&query, threads));
            Vec::new()
        }
        Action::SearchFailed { query, error } => {
            session.push_message(
                0,
                format!("Search for {query} failed: {error}"),
                Attr::BOLD,
            );
            Vec::new()
        }
        Action::HistoryLoaded {
            thread_id,
            messages,
        } => {
            match session.find_thread_tab(&thread_id) {
                Some(index) => {
                    session.update_tab(index, |tab| tab.load_history(messages));
                }
                None => debug!("History for closed thread {} dropped", thread_id),
            }
            Vec::new()
        }
        Action::HistoryFailed { thread_id, error } => {
            match session.find_thread_tab(&thread_id) {
                Some(index) => session.push_message(
                    index,
                    format!("Failed to load messages: {error}"),
                    Attr::BOLD,
                ),
                None => warn!("History fetch failed for closed thread {}: {}", thread_id, error),
            }
            Vec::new()
        }
        Action::MessageReceived(incoming) => {
            session.on_incoming_message(incoming);
            Vec::new()
        }
        Action::SendFailed { thread_id, error } => {
            match session.find_thread_tab(&thread_id) {
                Some(index) => session.push_message(
                    index,
                    format!("Failed to send message: {error}"),
                    Attr::BOLD,
                ),
                None => warn!("Send failed for closed thread {}: {}", thread_id, error),
            }
            Vec::new()
        }
        Action::ListenerStopped(error) => {
            let text = match error {
                Some(e) => format!("Lost connection to the message stream: {e}"),
                None => "The message stream closed.".to_string(),
            };
            session.push_message(0, text, Attr::BOLD);
            session.notify_tab(0);
            Vec::new()
        }
    }
}

/// Enter: hand the active tab's buffer to the tab and translate the outcome.
fn submit(session: &mut Session) -> Vec<Effect> {
    let command = std::mem::take(&mut session.active_tab_mut().command_buffer);
    if command.is_empty() {
        return Vec::new();
    }
    session.scheduler.request();

    debug!("Command in tab {}: {:?}", session.active_index(), command);
    match session.active_tab_mut().handle_command(&command) {
        CommandOutcome::Handled => Vec::new(),
        CommandOutcome::Quit => vec![Effect::Exit(ExitMode::Quit)],
        CommandOutcome::Logout => vec![Effect::Exit(ExitMode::Logout)],
        CommandOutcome::Reload => vec![Effect::FetchThreads {
            limit: session.thread_list_limit(),
        }],
        CommandOutcome::OpenThread(thread) => session.go_to_thread(thread),
        CommandOutcome::Search(query) => vec![Effect::Search(query)],
        CommandOutcome::Send { thread_id, text } => vec![Effect::SendMessage { thread_id, text }],
    }
}
