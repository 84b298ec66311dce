//! # Session State
//!
//! All client state in one place. No terminal types, no network handles.
//!
//! ```text
//! Session
//! ├── tabs: Vec<Tab>            // [0] is the root tab, never removed
//! ├── active: usize             // always < tabs.len()
//! ├── scheduler: UpdateScheduler // dirty flag for the next frame
//! ├── viewport: Viewport        // terminal size in cells
//! ├── me: UserInfo              // logged-in account
//! └── thread_list_limit: usize  // how many threads `reload` fetches
//! ```
//!
//! Mutations come from `update()` in action.rs, which runs on the render
//! loop. The routing helpers here decide which changes need a redraw.

use log::{debug, info};

use crate::core::action::{Effect, IncomingMessage};
use crate::core::scheduler::UpdateScheduler;
use crate::core::style::Attr;
use crate::core::tab::Tab;
use crate::messaging::{Thread, UserInfo};

/// Rows taken by the tab bar and the command line.
pub const CHROME_ROWS: u16 = 2;
/// Border cells around the chat window on each axis.
pub const CHAT_BORDER: u16 = 2;

/// How the user asked to leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMode {
    Quit,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Text rows inside the bordered chat window.
    pub fn chat_rows(&self) -> usize {
        self.height.saturating_sub(CHROME_ROWS + CHAT_BORDER) as usize
    }

    /// Text columns inside the bordered chat window.
    pub fn chat_columns(&self) -> usize {
        self.width.saturating_sub(CHAT_BORDER) as usize
    }
}

pub struct Session {
    tabs: Vec<Tab>,
    active: usize,
    pub scheduler: UpdateScheduler,
    viewport: Viewport,
    me: UserInfo,
    thread_list_limit: usize,
}

impl Session {
    pub fn new(root_title: &str, me: UserInfo, viewport: Viewport, thread_list_limit: usize) -> Self {
        Self {
            tabs: vec![Tab::root(root_title, me.name.clone())],
            active: 0,
            scheduler: UpdateScheduler::new(),
            viewport,
            me,
            thread_list_limit,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_tab_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    pub fn root_tab(&self) -> &Tab {
        &self.tabs[0]
    }

    pub fn me(&self) -> &UserInfo {
        &self.me
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn thread_list_limit(&self) -> usize {
        self.thread_list_limit
    }

    /// History fetched when a thread opens: one screenful.
    pub fn history_limit(&self) -> usize {
        self.viewport.chat_rows().max(1)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        self.scheduler.request();
    }

    /// Run `f` on tab `index`. Content changes only need a frame when the
    /// tab is on screen; background tabs are reflowed when activated.
    pub fn update_tab<R>(&mut self, index: usize, f: impl FnOnce(&mut Tab) -> R) -> Option<R> {
        let tab = self.tabs.get_mut(index)?;
        let result = f(tab);
        if index == self.active {
            self.scheduler.request();
        }
        Some(result)
    }

    pub fn push_message(&mut self, index: usize, text: impl Into<String>, attr: Attr) {
        self.update_tab(index, |tab| tab.push_message(text, attr));
    }

    /// Flag a tab as having news. The tab bar is always visible, so this
    /// always schedules a frame.
    pub fn notify_tab(&mut self, index: usize) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.notify();
            self.scheduler.request();
        }
    }

    pub fn find_thread_tab(&self, thread_id: &str) -> Option<usize> {
        self.tabs
            .iter()
            .position(|tab| tab.remote_thread_id() == Some(thread_id))
    }

    /// Activate tab `index`, wrapping one step past either end. The new tab
    /// is marked seen, which may owe the service a read receipt.
    pub fn go_to_tab(&mut self, index: isize) -> Vec<Effect> {
        let len = self.tabs.len() as isize;
        let index = if index < 0 {
            len - 1
        } else if index >= len {
            0
        } else {
            index
        };
        self.active = index as usize;
        self.scheduler.request();

        self.tabs[self.active]
            .mark_seen()
            .map(Effect::MarkRead)
            .into_iter()
            .collect()
    }

    /// Move `delta` tabs left or right of the active one.
    pub fn step_tab(&mut self, delta: isize) -> Vec<Effect> {
        self.go_to_tab(self.active as isize + delta)
    }

    /// Close the active tab and move one to the left. The root tab can't be
    /// closed.
    pub fn close_active_tab(&mut self) -> Vec<Effect> {
        if self.active == 0 {
            return Vec::new();
        }
        let closed = self.tabs.remove(self.active);
        info!("Closed tab '{}'", closed.title);
        self.go_to_tab(self.active as isize - 1)
    }

    /// Activate the tab for `thread`, opening (and fetching history for) a
    /// new one if none exists yet.
    pub fn go_to_thread(&mut self, thread: Thread) -> Vec<Effect> {
        if let Some(index) = self.find_thread_tab(&thread.id) {
            return self.go_to_tab(index as isize);
        }

        info!("Opening thread '{}' ({})", thread.name, thread.id);
        let mut effects = vec![Effect::FetchHistory {
            thread_id: thread.id.clone(),
            limit: self.history_limit(),
        }];
        self.tabs.push(Tab::thread(thread));
        effects.extend(self.go_to_tab(self.tabs.len() as isize - 1));
        effects
    }

    /// Route a message from the service. Messages for an open thread go to
    /// its tab (once per id); anything else becomes a notice on the root tab.
    pub fn on_incoming_message(&mut self, incoming: IncomingMessage) {
        let Some(index) = self.find_thread_tab(&incoming.thread_id) else {
            let thread_name = self
                .root_tab()
                .known_threads()
                .iter()
                .find(|t| t.id == incoming.thread_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| incoming.thread_id.clone());
            self.push_message(
                0,
                format!(
                    "New message from {} in {}",
                    incoming.author_name, thread_name
                ),
                Attr::BOLD,
            );
            self.notify_tab(0);
            return;
        };

        let applied = self
            .update_tab(index, |tab| tab.apply_incoming(incoming.message))
            .unwrap_or(false);
        if !applied {
            debug!("Dropped duplicate message in thread {}", incoming.thread_id);
            return;
        }
        if index != self.active {
            self.notify_tab(index);
        }
    }
}
