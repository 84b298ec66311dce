//! # Tabs
//!
//! One tab per conversation, plus the permanent root tab used to navigate.
//!
//! ```text
//! Tab
//! ├── title: String             // shown in the tab bar
//! ├── command_buffer: String    // what the user is typing in this tab
//! ├── log: Vec<LogEntry>        // scrollback, append-only
//! ├── notify: bool              // bold in the tab bar until seen
//! └── kind: TabKind
//!     ├── Root(RootTab)         // thread index + control commands
//!     └── Thread(ThreadTab)     // remote thread + dedup set
//! ```
//!
//! Tabs never talk to the network or the terminal. Commands come back as a
//! `CommandOutcome` and `Session` decides what to schedule.

use std::collections::HashSet;

use crate::core::format::RenderedMessage;
use crate::core::style::Attr;
use crate::messaging::Thread;

/// A single scrollback entry. May contain newlines; reflow splits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub attr: Attr,
}

impl LogEntry {
    pub fn new(text: impl Into<String>, attr: Attr) -> Self {
        Self {
            text: text.into(),
            attr,
        }
    }
}

pub const OUT_OF_RANGE_MESSAGE: &str = "Out of range, no thread on that index.";

/// State specific to the root tab.
#[derive(Debug, Clone)]
pub struct RootTab {
    account_name: String,
    /// Last fetched thread list, extended by search results. Numeric
    /// commands index into it.
    threads: Vec<Thread>,
}

/// State specific to a conversation tab.
#[derive(Debug, Clone)]
pub struct ThreadTab {
    thread: Thread,
    seen: HashSet<String>,
    has_unread: bool,
}

impl ThreadTab {
    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    pub fn has_unread(&self) -> bool {
        self.has_unread
    }
}

#[derive(Debug, Clone)]
pub enum TabKind {
    Root(RootTab),
    Thread(ThreadTab),
}

/// What a submitted command asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Fully handled inside the tab (e.g. an error line was logged).
    Handled,
    Quit,
    Logout,
    /// The root tab reset itself; the thread list must be fetched again.
    Reload,
    OpenThread(Thread),
    Search(String),
    Send { thread_id: String, text: String },
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub title: String,
    pub command_buffer: String,
    log: Vec<LogEntry>,
    notify: bool,
    kind: TabKind,
}

impl Tab {
    /// The root navigation tab, pre-filled with the welcome text.
    pub fn root(title: impl Into<String>, account_name: impl Into<String>) -> Self {
        let mut tab = Self {
            title: title.into(),
            command_buffer: String::new(),
            log: Vec::new(),
            notify: false,
            kind: TabKind::Root(RootTab {
                account_name: account_name.into(),
                threads: Vec::new(),
            }),
        };
        tab.write_welcome();
        tab
    }

    pub fn thread(thread: Thread) -> Self {
        Self {
            title: thread.name.clone(),
            command_buffer: String::new(),
            log: Vec::new(),
            notify: false,
            kind: TabKind::Thread(ThreadTab {
                has_unread: thread.unread,
                thread,
                seen: HashSet::new(),
            }),
        }
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn kind(&self) -> &TabKind {
        &self.kind
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, TabKind::Root(_))
    }

    pub fn is_notified(&self) -> bool {
        self.notify
    }

    pub fn remote_thread_id(&self) -> Option<&str> {
        match &self.kind {
            TabKind::Thread(t) => Some(&t.thread.id),
            TabKind::Root(_) => None,
        }
    }

    /// Threads known to the root tab, in index order. Empty for thread tabs.
    pub fn known_threads(&self) -> &[Thread] {
        match &self.kind {
            TabKind::Root(root) => &root.threads,
            TabKind::Thread(_) => &[],
        }
    }

    pub fn push_message(&mut self, text: impl Into<String>, attr: Attr) {
        self.log.push(LogEntry::new(text, attr));
    }

    pub fn notify(&mut self) {
        self.notify = true;
    }

    /// Clear the notify flag. For a thread tab with unread messages, returns
    /// the thread id that needs a read receipt.
    pub fn mark_seen(&mut self) -> Option<String> {
        self.notify = false;
        match &mut self.kind {
            TabKind::Thread(t) if t.has_unread => {
                t.has_unread = false;
                Some(t.thread.id.clone())
            }
            _ => None,
        }
    }

    /// Interpret a submitted command according to the tab kind.
    pub fn handle_command(&mut self, command: &str) -> CommandOutcome {
        match &self.kind {
            TabKind::Thread(t) => CommandOutcome::Send {
                thread_id: t.thread.id.clone(),
                text: command.to_string(),
            },
            TabKind::Root(root) => match command.to_lowercase().as_str() {
                "quit" => CommandOutcome::Quit,
                "logout" => CommandOutcome::Logout,
                "reload" => {
                    self.reload();
                    CommandOutcome::Reload
                }
                _ if is_numeric(command) => match command
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| root.threads.get(i))
                {
                    Some(thread) => CommandOutcome::OpenThread(thread.clone()),
                    None => {
                        self.push_message(OUT_OF_RANGE_MESSAGE, Attr::BOLD);
                        CommandOutcome::Handled
                    }
                },
                _ => {
                    self.push_message(format!("Searching for {command}"), Attr::NORMAL);
                    CommandOutcome::Search(command.to_string())
                }
            },
        }
    }

    /// Apply a message delivered by the service. Returns false for a
    /// redelivered id (or on the root tab), in which case nothing changes.
    pub fn apply_incoming(&mut self, message: RenderedMessage) -> bool {
        let TabKind::Thread(t) = &mut self.kind else {
            return false;
        };
        if !t.seen.insert(message.id) {
            return false;
        }
        t.has_unread = true;
        self.log.push(LogEntry::new(message.text, Attr::NORMAL));
        true
    }

    /// Append fetched history (oldest first). Ids are recorded so a later
    /// redelivery of the same message is dropped.
    pub fn load_history(&mut self, messages: Vec<RenderedMessage>) -> usize {
        let TabKind::Thread(t) = &mut self.kind else {
            return 0;
        };
        let mut added = 0;
        for message in messages {
            if t.seen.insert(message.id) {
                self.log.push(LogEntry::new(message.text, Attr::NORMAL));
                added += 1;
            }
        }
        added
    }

    /// Root only: clear the log and the thread index, re-render the welcome.
    pub fn reload(&mut self) {
        if let TabKind::Root(root) = &mut self.kind {
            root.threads.clear();
            self.log.clear();
            self.write_welcome();
        }
    }

    /// Root only: replace the thread index with a freshly fetched list.
    pub fn show_thread_list(&mut self, threads: Vec<Thread>) {
        let TabKind::Root(root) = &mut self.kind else {
            return;
        };
        self.log.push(LogEntry::new(
            format!("Your last {} threads:", threads.len()),
            Attr::NORMAL,
        ));
        for (i, thread) in threads.iter().enumerate() {
            let attr = if thread.unread { Attr::BOLD } else { Attr::NORMAL };
            self.log
                .push(LogEntry::new(format!("[{i}] {}", thread.name), attr));
        }
        root.threads = threads;
    }

    /// Root only: extend the thread index with search results, numbering
    /// them after the existing entries.
    pub fn append_search_results(&mut self, query: &str, threads: Vec<Thread>) {
        let TabKind::Root(root) = &mut self.kind else {
            return;
        };
        if threads.is_empty() {
            self.log.push(LogEntry::new(
                format!("No threads found for {query}"),
                Attr::NORMAL,
            ));
            return;
        }
        let start = root.threads.len();
        for (offset, thread) in threads.iter().enumerate() {
            self.log.push(LogEntry::new(
                format!("[{}] {}", start + offset, thread.name),
                Attr::NORMAL,
            ));
        }
        root.threads.extend(threads);
    }

    fn write_welcome(&mut self) {
        let TabKind::Root(root) = &self.kind else {
            return;
        };
        let lines = [
            "Welcome to Terminal Messenger".to_string(),
            format!("You're logged in as {}", root.account_name),
            String::new(),
            "Type `quit` to exit the program without logging out.".to_string(),
            "Type `logout` to log out then exit.".to_string(),
            "Type `reload` to reload your last threads.".to_string(),
            "Type a number to open that person's chat.".to_string(),
            "Type a name to search for that person.".to_string(),
            String::new(),
        ];
        self.log
            .extend(lines.into_iter().map(|l| LogEntry::new(l, Attr::NORMAL)));
    }
}

fn is_numeric(command: &str) -> bool {
    !command.is_empty() && command.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::thread;

    fn rendered(id: &str, text: &str) -> RenderedMessage {
        RenderedMessage {
            id: id.into(),
            text: text.into(),
        }
    }

    fn root_with_threads(n: usize) -> Tab {
        let mut tab = Tab::root("Messenger", "Felix Guo");
        let threads = (0..n)
            .map(|i| thread(&format!("t{i}"), &format!("Friend {i}"), false))
            .collect();
        tab.show_thread_list(threads);
        tab
    }

    #[test]
    fn root_starts_with_welcome() {
        let tab = Tab::root("Messenger", "Felix Guo");
        assert_eq!(tab.log()[0].text, "Welcome to Terminal Messenger");
        assert_eq!(tab.log()[1].text, "You're logged in as Felix Guo");
        assert_eq!(tab.log()[2].text, "");
        assert_eq!(tab.log().len(), 9);
        assert!(tab.is_root());
    }

    #[test]
    fn control_commands_are_case_insensitive() {
        let mut tab = Tab::root("Messenger", "Felix");
        assert_eq!(tab.handle_command("QUIT"), CommandOutcome::Quit);
        assert_eq!(tab.handle_command("Logout"), CommandOutcome::Logout);
    }

    #[test]
    fn reload_resets_log_and_index() {
        let mut tab = root_with_threads(3);
        tab.push_message("noise", Attr::NORMAL);
        assert_eq!(tab.handle_command("reload"), CommandOutcome::Reload);
        assert_eq!(tab.log().len(), 9);
        assert!(tab.known_threads().is_empty());
    }

    #[test]
    fn numeric_command_opens_known_thread() {
        let mut tab = root_with_threads(3);
        match tab.handle_command("2") {
            CommandOutcome::OpenThread(t) => assert_eq!(t.id, "t2"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn numeric_command_out_of_range_logs_bold_error() {
        let mut tab = root_with_threads(3);
        let before = tab.log().len();
        assert_eq!(tab.handle_command("5"), CommandOutcome::Handled);
        assert_eq!(tab.log().len(), before + 1);
        let last = tab.log().last().unwrap();
        assert_eq!(last.text, OUT_OF_RANGE_MESSAGE);
        assert_eq!(last.attr, Attr::BOLD);
    }

    #[test]
    fn huge_number_is_out_of_range_not_a_search() {
        let mut tab = root_with_threads(1);
        assert_eq!(
            tab.handle_command("99999999999999999999999"),
            CommandOutcome::Handled
        );
    }

    #[test]
    fn anything_else_is_a_search() {
        let mut tab = root_with_threads(0);
        assert_eq!(
            tab.handle_command("alice"),
            CommandOutcome::Search("alice".into())
        );
        assert_eq!(tab.log().last().unwrap().text, "Searching for alice");
    }

    #[test]
    fn thread_list_marks_unread_bold() {
        let mut tab = Tab::root("Messenger", "Felix");
        tab.show_thread_list(vec![thread("a", "Alice", true), thread("b", "Bob", false)]);
        let log = tab.log();
        assert_eq!(log[log.len() - 3].text, "Your last 2 threads:");
        assert_eq!(log[log.len() - 2], LogEntry::new("[0] Alice", Attr::BOLD));
        assert_eq!(log[log.len() - 1], LogEntry::new("[1] Bob", Attr::NORMAL));
    }

    #[test]
    fn search_results_extend_the_index() {
        let mut tab = root_with_threads(2);
        tab.append_search_results("car", vec![thread("c", "Carol", false), thread("d", "Dave", false)]);
        assert_eq!(tab.known_threads().len(), 4);
        assert_eq!(tab.log().last().unwrap().text, "[3] Dave");
        match tab.handle_command("2") {
            CommandOutcome::OpenThread(t) => assert_eq!(t.name, "Carol"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_search_says_so() {
        let mut tab = root_with_threads(1);
        tab.append_search_results("zed", Vec::new());
        assert_eq!(tab.log().last().unwrap().text, "No threads found for zed");
        assert_eq!(tab.known_threads().len(), 1);
    }

    #[test]
    fn thread_tab_sends_every_command() {
        let mut tab = Tab::thread(thread("t1", "Alice", false));
        assert_eq!(
            tab.handle_command("quit"),
            CommandOutcome::Send {
                thread_id: "t1".into(),
                text: "quit".into()
            }
        );
        assert!(tab.log().is_empty());
    }

    #[test]
    fn duplicate_delivery_is_dropped() {
        let mut tab = Tab::thread(thread("t1", "Alice", false));
        assert!(tab.apply_incoming(rendered("m1", "Alice: hi")));
        assert!(!tab.apply_incoming(rendered("m1", "Alice: hi")));
        assert_eq!(tab.log().len(), 1);
    }

    #[test]
    fn history_ids_suppress_redelivery() {
        let mut tab = Tab::thread(thread("t1", "Alice", false));
        let added = tab.load_history(vec![rendered("m1", "Alice: a"), rendered("m2", "Alice: b")]);
        assert_eq!(added, 2);
        assert!(!tab.apply_incoming(rendered("m2", "Alice: b")));
        assert_eq!(tab.log().len(), 2);
    }

    #[test]
    fn mark_seen_requests_read_receipt_once() {
        let mut tab = Tab::thread(thread("t1", "Alice", false));
        tab.apply_incoming(rendered("m1", "Alice: hi"));
        tab.notify();
        assert_eq!(tab.mark_seen(), Some("t1".to_string()));
        assert!(!tab.is_notified());
        assert_eq!(tab.mark_seen(), None);
    }

    #[test]
    fn unread_thread_starts_unread() {
        let mut tab = Tab::thread(thread("t1", "Alice", true));
        assert_eq!(tab.title, "Alice");
        assert_eq!(tab.mark_seen(), Some("t1".to_string()));
    }

    #[test]
    fn root_mark_seen_only_clears_notify() {
        let mut tab = Tab::root("Messenger", "Felix");
        tab.notify();
        assert_eq!(tab.mark_seen(), None);
        assert!(!tab.is_notified());
    }

    #[test]
    fn root_ignores_incoming_messages() {
        let mut tab = Tab::root("Messenger", "Felix");
        let before = tab.log().len();
        assert!(!tab.apply_incoming(rendered("m1", "x")));
        assert_eq!(tab.log().len(), before);
    }
}
