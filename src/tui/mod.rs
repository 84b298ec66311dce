//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values, and runs the
//! effects `update()` asks for on the tokio runtime.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//!   keyboard ──▶ TuiEvent ──▶ Action ─┐
//!                                     ├──▶ update(session) ──▶ Vec<Effect>
//!   background tasks ──▶ Action ──────┘                            │
//!          ▲                                                       │
//!          └──────────────── tokio::spawn ◀────────────────────────┘
//! ```
//!
//! Background tasks only ever send `Action`s over a std mpsc channel; the
//! session is touched on this thread alone.
//!
//! ## Redraw Strategy
//!
//! Each pass draws at most one frame, and only when the session's
//! `UpdateScheduler` is dirty. The loop then waits up to `poll_interval`
//! for input, drains every pending key, and drains every pending background
//! action before the next draw.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::sync::{Arc, mpsc};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::execute;
use tokio::task::JoinHandle;

use crate::core::action::{Action, Effect, IncomingMessage, startup, update};
use crate::core::config::ResolvedConfig;
use crate::core::format::RenderedMessage;
use crate::core::state::{ExitMode, Session, Viewport};
use crate::messaging::{InboundMessage, MessagingClient, UserDirectory, UserInfo};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};

/// Buffer between the service listener and the forwarder.
const INBOUND_BUFFER: usize = 100;

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(stdout(), Show, SetCursorStyle::SteadyBlock)?;
        info!("Terminal modes enabled (steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), SetCursorStyle::DefaultUserShape);
    }
}

/// Runs effects against the messaging client. Every result comes back to the
/// loop as an `Action`.
#[derive(Clone)]
struct EffectRunner {
    client: Arc<dyn MessagingClient>,
    directory: Arc<UserDirectory>,
    tx: mpsc::Sender<Action>,
}

enum Dispatched {
    Spawned(JoinHandle<()>),
    Exit(ExitMode),
}

impl EffectRunner {
    fn dispatch(&self, effect: Effect) -> Dispatched {
        debug!("Dispatching effect: {:?}", effect);
        let runner = self.clone();
        let handle = match effect {
            Effect::Exit(mode) => return Dispatched::Exit(mode),
            Effect::FetchThreads { limit } => tokio::spawn(async move {
                let action = match runner.client.fetch_thread_list(limit).await {
                    Ok(threads) => Action::ThreadsLoaded(threads),
                    Err(e) => Action::ThreadsFailed(e.to_string()),
                };
                runner.send(action);
            }),
            Effect::Search(query) => tokio::spawn(async move {
                let action = match runner.client.search_threads(&query).await {
                    Ok(threads) => Action::SearchCompleted { query, threads },
                    Err(e) => Action::SearchFailed {
                        query,
                        error: e.to_string(),
                    },
                };
                runner.send(action);
            }),
            Effect::FetchHistory { thread_id, limit } => tokio::spawn(async move {
                let action = match runner.client.fetch_thread_messages(&thread_id, limit).await {
                    Ok(messages) => {
                        // The service returns newest first
                        let mut rendered = Vec::with_capacity(messages.len());
                        for message in messages.iter().rev() {
                            let author = runner.directory.first_name(&message.author_id).await;
                            rendered.push(RenderedMessage::new(message, &author));
                        }
                        Action::HistoryLoaded {
                            thread_id,
                            messages: rendered,
                        }
                    }
                    Err(e) => Action::HistoryFailed {
                        thread_id,
                        error: e.to_string(),
                    },
                };
                runner.send(action);
            }),
            Effect::SendMessage { thread_id, text } => tokio::spawn(async move {
                if let Err(e) = runner.client.send_message(&text, &thread_id).await {
                    warn!("Send to {} failed: {}", thread_id, e);
                    runner.send(Action::SendFailed {
                        thread_id,
                        error: e.to_string(),
                    });
                }
            }),
            Effect::MarkRead(thread_id) => tokio::spawn(async move {
                if let Err(e) = runner.client.mark_as_read(&thread_id).await {
                    warn!("Read receipt for {} failed: {}", thread_id, e);
                }
            }),
        };
        Dispatched::Spawned(handle)
    }

    /// Dispatch a batch. The first exit request wins.
    fn apply(&self, effects: Vec<Effect>, exit: &mut Option<ExitMode>) {
        for effect in effects {
            if let Dispatched::Exit(mode) = self.dispatch(effect) {
                exit.get_or_insert(mode);
            }
        }
    }

    fn send(&self, action: Action) {
        if self.tx.send(action).is_err() {
            warn!("Failed to deliver action: receiver dropped");
        }
    }
}

/// Subscribe to the service and forward every inbound message to the loop.
/// When the subscription ends, the loop gets `ListenerStopped`.
fn spawn_listener(runner: EffectRunner) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (inbound_tx, inbound_rx) = tokio::sync::mpsc::channel(INBOUND_BUFFER);
        let forwarder = tokio::spawn(forward_inbound(runner.clone(), inbound_rx));

        info!("Listening for messages via {}", runner.client.name());
        let result = runner.client.listen(inbound_tx).await;
        if forwarder.await.is_err() {
            warn!("Inbound forwarder panicked");
        }

        let error = match result {
            Ok(()) => None,
            Err(e) => {
                warn!("Listener stopped: {}", e);
                Some(e.to_string())
            }
        };
        runner.send(Action::ListenerStopped(error));
    })
}

async fn forward_inbound(
    runner: EffectRunner,
    mut inbound_rx: tokio::sync::mpsc::Receiver<InboundMessage>,
) {
    let mut forwarded = 0usize;
    while let Some(inbound) = inbound_rx.recv().await {
        let author_name = runner.directory.first_name(&inbound.author_id).await;
        let message = RenderedMessage::new(&inbound.message, &author_name);
        let incoming = IncomingMessage {
            thread_id: inbound.thread_id.clone(),
            author_name,
            message,
        };
        if runner.tx.send(Action::MessageReceived(incoming)).is_err() {
            warn!("Failed to forward inbound message: receiver dropped");
            return;
        }
        forwarded += 1;

        if let Err(e) = runner
            .client
            .mark_as_delivered(&inbound.thread_id, &inbound.message.id)
            .await
        {
            warn!("Delivery receipt for {} failed: {}", inbound.message.id, e);
        }
    }
    info!("Inbound channel closed after {} messages", forwarded);
}

/// Run the client until the user quits or logs out.
pub fn run(
    config: &ResolvedConfig,
    client: Arc<dyn MessagingClient>,
    me: UserInfo,
) -> io::Result<ExitMode> {
    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()?;

    let size = terminal.size()?;
    let mut session = Session::new(
        &config.root_title,
        me.clone(),
        Viewport::new(size.width, size.height),
        config.thread_list_limit,
    );

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let runner = EffectRunner {
        directory: Arc::new(UserDirectory::with_user(client.clone(), me)),
        client,
        tx,
    };
    let listener = spawn_listener(runner.clone());

    let mut exit: Option<ExitMode> = None;
    runner.apply(startup(&session), &mut exit);

    let result = loop {
        if session.scheduler.take()
            && let Err(e) = terminal.draw(|f| ui::draw_ui(f, &session))
        {
            break Err(e);
        }

        // First event waits up to poll_interval, the rest are drained
        let mut next = match poll_event_timeout(config.poll_interval) {
            Ok(event) => event,
            Err(e) => break Err(e),
        };
        while let Some(event) = next {
            runner.apply(update(&mut session, event.into()), &mut exit);
            next = match poll_event_immediate() {
                Ok(event) => event,
                Err(e) => {
                    warn!("Failed to read terminal event: {}", e);
                    None
                }
            };
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            debug!("Event loop received: {:?}", action);
            runner.apply(update(&mut session, action), &mut exit);
        }

        if let Some(mode) = exit {
            break Ok(mode);
        }
    };

    listener.abort();
    ratatui::restore();
    if let Ok(mode) = &result {
        info!("Leaving TUI: {:?}", mode);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::Message;
    use crate::test_support::{FakeMessenger, me, text_message, thread};

    fn runner(fake: Arc<FakeMessenger>) -> (EffectRunner, mpsc::Receiver<Action>) {
        let (tx, rx) = mpsc::channel();
        let runner = EffectRunner {
            directory: Arc::new(UserDirectory::with_user(fake.clone(), me())),
            client: fake,
            tx,
        };
        (runner, rx)
    }

    async fn run_to_completion(runner: &EffectRunner, effect: Effect) {
        match runner.dispatch(effect) {
            Dispatched::Spawned(handle) => handle.await.unwrap(),
            Dispatched::Exit(mode) => panic!("unexpected exit {mode:?}"),
        }
    }

    #[tokio::test]
    async fn test_exit_is_not_spawned() {
        let (runner, _rx) = runner(Arc::new(FakeMessenger::new()));
        assert!(matches!(
            runner.dispatch(Effect::Exit(ExitMode::Logout)),
            Dispatched::Exit(ExitMode::Logout)
        ));
    }

    #[tokio::test]
    async fn test_fetch_threads_reports_back() {
        let fake = Arc::new(FakeMessenger::new());
        fake.add_thread("t1", "Alice", true);
        fake.add_thread("t2", "Bob", false);
        let (runner, rx) = runner(fake.clone());

        run_to_completion(&runner, Effect::FetchThreads { limit: 1 }).await;
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::ThreadsLoaded(vec![thread("t1", "Alice", true)])
        );
    }

    #[tokio::test]
    async fn test_history_is_oldest_first_with_names() {
        let fake = Arc::new(FakeMessenger::new());
        fake.add_user("u1", "Alice Liddell");
        fake.add_message("t1", "m1", "u1", "first");
        fake.add_message("t1", "m2", "me", "second");
        fake.add_message("t1", "m3", "u1", "third");
        let (runner, rx) = runner(fake.clone());

        run_to_completion(
            &runner,
            Effect::FetchHistory {
                thread_id: "t1".into(),
                limit: 2,
            },
        )
        .await;

        match rx.try_recv().unwrap() {
            Action::HistoryLoaded {
                thread_id,
                messages,
            } => {
                assert_eq!(thread_id, "t1");
                let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
                assert_eq!(texts, vec!["Felix: second", "Alice: third"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_send_is_reported() {
        let fake = Arc::new(FakeMessenger::new());
        fake.fail_sends();
        let (runner, rx) = runner(fake.clone());

        run_to_completion(
            &runner,
            Effect::SendMessage {
                thread_id: "t1".into(),
                text: "hi".into(),
            },
        )
        .await;
        match rx.try_recv().unwrap() {
            Action::SendFailed { thread_id, error } => {
                assert_eq!(thread_id, "t1");
                assert!(error.contains("connection refused"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_successful_send_is_silent() {
        let fake = Arc::new(FakeMessenger::new());
        let (runner, rx) = runner(fake.clone());

        run_to_completion(
            &runner,
            Effect::SendMessage {
                thread_id: "t1".into(),
                text: "hi".into(),
            },
        )
        .await;
        assert!(rx.try_recv().is_err());
        assert_eq!(fake.sent(), vec![("t1".to_string(), "hi".to_string())]);
    }

    #[tokio::test]
    async fn test_listener_forwards_and_acknowledges() {
        let fake = Arc::new(FakeMessenger::new());
        fake.add_user("u1", "Alice Liddell");
        let message: Message = text_message("m1", "u1", "hello");
        fake.push_inbound(InboundMessage {
            author_id: "u1".into(),
            thread_id: "t1".into(),
            message,
        });
        let (runner, rx) = runner(fake.clone());

        spawn_listener(runner).await.unwrap();

        match rx.try_recv().unwrap() {
            Action::MessageReceived(incoming) => {
                assert_eq!(incoming.thread_id, "t1");
                assert_eq!(incoming.author_name, "Alice");
                assert_eq!(incoming.message.text, "Alice: hello");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(rx.try_recv().unwrap(), Action::ListenerStopped(None));
        assert_eq!(fake.calls_to("mark_as_delivered"), 1);
    }
}
