use async_trait::async_trait;
use crossbeam_channel::{unbounded, Sender};
use std::thread;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard.
///
/// One `arboard::Clipboard` is opened lazily on a dedicated thread and kept
/// until the last `SystemClipboard` clone is dropped. On X11 the copied text
/// is only available while that handle is alive, so keep this value around for
/// as long as pasting should work.
#[derive(Clone)]
pub struct SystemClipboard {
    requests: Sender<Request>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::with_owner(arboard::Clipboard::new)
    }

    fn with_owner<O, F>(open: F) -> Self
    where
        O: SelectionOwner + 'static,
        F: FnMut() -> Result<O, arboard::Error> + Send + 'static,
    {
        Self {
            requests: spawn_owner(open),
        }
    }

    /// Keeps serving the last written text until another program takes the
    /// selection. Returns immediately where the platform keeps clipboard
    /// contents on its own, or when nothing was written.
    pub async fn hold_until_replaced(&self) -> Result<(), ClipboardError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Hold { reply })
            .map_err(|_| ClipboardError::Closed)?;
        response.await.map_err(|_| ClipboardError::Closed)??;
        Ok(())
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Write {
                text: text.to_owned(),
                reply,
            })
            .map_err(|_| ClipboardError::Closed)?;
        response.await.map_err(|_| ClipboardError::Closed)??;
        Ok(())
    }
}

type Reply = oneshot::Sender<Result<(), arboard::Error>>;

enum Request {
    Write { text: String, reply: Reply },
    Hold { reply: Reply },
}

trait SelectionOwner {
    fn write(&mut self, text: String) -> Result<(), arboard::Error>;
    fn hold(&mut self, text: String) -> Result<(), arboard::Error>;
}

impl SelectionOwner for arboard::Clipboard {
    fn write(&mut self, text: String) -> Result<(), arboard::Error> {
        self.set_text(text)
    }

    #[cfg(target_os = "linux")]
    fn hold(&mut self, text: String) -> Result<(), arboard::Error> {
        use arboard::SetExtLinux;
        self.set().wait().text(text)
    }

    #[cfg(not(target_os = "linux"))]
    fn hold(&mut self, _text: String) -> Result<(), arboard::Error> {
        Ok(())
    }
}

fn spawn_owner<O, F>(mut open: F) -> Sender<Request>
where
    O: SelectionOwner + 'static,
    F: FnMut() -> Result<O, arboard::Error> + Send + 'static,
{
    let (requests, incoming) = unbounded::<Request>();
    thread::spawn(move || {
        let mut owner: Option<O> = None;
        let mut last_text: Option<String> = None;

        while let Ok(request) = incoming.recv() {
            match request {
                Request::Write { text, reply } => {
                    let result = open_owner(&mut owner, &mut open)
                        .and_then(|owner| owner.write(text.clone()));
                    if result.is_ok() {
                        last_text = Some(text);
                    }
                    let _ = reply.send(result);
                }
                Request::Hold { reply } => {
                    let result = match (owner.as_mut(), last_text.take()) {
                        (Some(owner), Some(text)) => owner.hold(text),
                        _ => Ok(()),
                    };
                    let _ = reply.send(result);
                }
            }
        }
        debug!("clipboard owner released");
    });
    requests
}

fn open_owner<'a, O, F>(slot: &'a mut Option<O>, open: &mut F) -> Result<&'a mut O, arboard::Error>
where
    F: FnMut() -> Result<O, arboard::Error>,
{
    if slot.is_none() {
        *slot = Some(open()?);
        debug!("clipboard opened");
    }
    slot.as_mut().ok_or(arboard::Error::ClipboardNotSupported)
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[from] arboard::Error),
    #[error("clipboard owner thread stopped")]
    Closed,
}
