#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! The runtime owns the update/view loop: terminal events and subscription
//! messages flow into [`Model::update`], updates return [`Cmd`]s for side
//! effects, and [`Model::view`] redraws the frame surface. State lives in
//! the model; the loop itself is stateless glue.

pub mod subscription;

use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use tracing::debug;

use crate::render::{self, Surface};
use crate::terminal::TerminalSession;
use subscription::{Subscription, SubscriptionManager};

/// Poll cadence for terminal events; doubles as the maximum frame latency.
const FRAME: Duration = Duration::from_millis(16);

/// Input event delivered to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press or repeat (releases are filtered out).
    Key(KeyEvent),
    /// The terminal was resized.
    Resize { width: u16, height: u16 },
}

/// The Model trait defines application state and behavior.
pub trait Model: Sized {
    /// Message type driving state transitions. Must be convertible from
    /// terminal events.
    type Message: From<Event> + Send + 'static;

    /// Startup command, run once before the first frame.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Core state transition: apply a message, return follow-up effects.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state.
    fn view(&self, surface: &mut Surface);

    /// Declare the currently wanted subscriptions. Reconciled by id after
    /// every update.
    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        vec![]
    }
}

/// A side effect requested by an update.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Stop the program.
    Quit,
    /// Run several commands.
    Batch(Vec<Cmd<M>>),
    /// Feed a message back into the model.
    Msg(M),
    /// Run a blocking closure on a background thread; its result comes back
    /// as a message.
    Task(Box<dyn FnOnce() -> M + Send>),
    /// Set the terminal (window/tab) title.
    SetTitle(String),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(_) => write!(f, "Task"),
            Self::SetTitle(title) => f.debug_tuple("SetTitle").field(title).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    #[must_use]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    #[must_use]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a batch; empty and single-element batches collapse.
    #[must_use]
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => Self::Batch(cmds),
        }
    }

    /// Create a background task command.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(Box::new(f))
    }

    /// Create a terminal title command.
    #[must_use]
    pub fn set_title(title: impl Into<String>) -> Self {
        Self::SetTitle(title.into())
    }
}

/// The program: a model plus the terminal session driving it.
pub struct Program<M: Model> {
    model: M,
    surface: Surface,
    subs: SubscriptionManager<M::Message>,
    sender: mpsc::Sender<M::Message>,
    receiver: mpsc::Receiver<M::Message>,
    _session: TerminalSession,
}

impl<M: Model> Program<M> {
    /// Enter the terminal session and prepare the loop.
    pub fn new(model: M) -> io::Result<Self> {
        let session = TerminalSession::new()?;
        let (width, height) = TerminalSession::size()?;
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            model,
            surface: Surface::new(width, height),
            subs: SubscriptionManager::new(sender.clone()),
            sender,
            receiver,
            _session: session,
        })
    }

    /// Run until the model quits. The terminal is restored on every exit
    /// path, including panics.
    pub fn run(mut self) -> io::Result<()> {
        // Tell the model its initial dimensions before the first frame.
        let mut inbox: Vec<M::Message> = vec![M::Message::from(Event::Resize {
            width: self.surface.width(),
            height: self.surface.height(),
        })];

        let init = self.model.init();
        if self.process(init, &mut inbox)? {
            return Ok(());
        }

        loop {
            if event::poll(FRAME)? {
                // Drain everything already buffered before updating.
                loop {
                    if let Some(ev) = convert(event::read()?) {
                        if let Event::Resize { width, height } = ev {
                            self.surface.resize(width, height);
                        }
                        inbox.push(M::Message::from(ev));
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
            inbox.extend(self.receiver.try_iter());

            for msg in std::mem::take(&mut inbox) {
                let cmd = self.model.update(msg);
                if self.process(cmd, &mut inbox)? {
                    return Ok(());
                }
            }

            self.subs.reconcile(self.model.subscriptions());

            self.surface.clear();
            self.model.view(&mut self.surface);
            let mut out = io::stdout().lock();
            render::present(&mut out, &self.surface)?;
        }
    }

    /// Execute one command tree. Returns `true` when the program should
    /// quit.
    fn process(&mut self, cmd: Cmd<M::Message>, inbox: &mut Vec<M::Message>) -> io::Result<bool> {
        let mut stack = vec![cmd];
        while let Some(cmd) = stack.pop() {
            match cmd {
                Cmd::None => {}
                Cmd::Quit => {
                    debug!("quit requested");
                    self.subs.stop_all();
                    return Ok(true);
                }
                Cmd::Batch(cmds) => stack.extend(cmds.into_iter().rev()),
                Cmd::Msg(m) => inbox.push(m),
                Cmd::Task(f) => {
                    let sender = self.sender.clone();
                    thread::spawn(move || {
                        // The receiver outlives every task unless the program
                        // is quitting; either way a dead channel is fine.
                        let _ = sender.send(f());
                    });
                }
                Cmd::SetTitle(title) => {
                    execute!(io::stdout(), SetTitle(&title))?;
                }
            }
        }
        Ok(false)
    }
}

/// Map a crossterm event to a runtime event. Key releases and events this
/// app has no use for (mouse, focus, paste) are dropped.
fn convert(ev: event::Event) -> Option<Event> {
    match ev {
        event::Event::Key(key) if key.kind != KeyEventKind::Release => Some(Event::Key(key)),
        event::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        _ => None,
    }
}
