//! Typed message passing between the engine and its collaborator layer.
//!
//! Messages travel as one JSON document per frame. A frame transport only
//! moves strings; [`MessageSender`] and [`MessageReceiver`] add the typing.
//! Two transports ship here: newline-delimited byte streams (stdin/stdout,
//! sockets) and an in-process queue.

use std::io::{self, BufRead, Write};
use std::marker::PhantomData;
use std::sync::mpsc;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("channel closed")]
    Closed,
}

pub trait FrameSink: Send {
    fn send_frame(&mut self, frame: &str) -> Result<(), ChannelError>;
}

pub trait FrameSource: Send {
    /// `Ok(None)` once the peer has gone away.
    fn recv_frame(&mut self) -> Result<Option<String>, ChannelError>;
}

/// Writes each frame as one line. Frames never contain raw newlines because
/// serde_json escapes them.
pub struct LineWriter<W> {
    writer: W,
}

impl<W: Write + Send> LineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> FrameSink for LineWriter<W> {
    fn send_frame(&mut self, frame: &str) -> Result<(), ChannelError> {
        self.writer.write_all(frame.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

pub struct LineReader<R> {
    reader: R,
}

impl<R: BufRead + Send> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send> FrameSource for LineReader<R> {
    fn recv_frame(&mut self) -> Result<Option<String>, ChannelError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let frame = line.trim();
            if !frame.is_empty() {
                return Ok(Some(frame.to_string()));
            }
        }
    }
}

impl FrameSink for mpsc::Sender<String> {
    fn send_frame(&mut self, frame: &str) -> Result<(), ChannelError> {
        self.send(frame.to_string()).map_err(|_| ChannelError::Closed)
    }
}

impl FrameSource for mpsc::Receiver<String> {
    fn recv_frame(&mut self) -> Result<Option<String>, ChannelError> {
        Ok(self.recv().ok())
    }
}

pub struct MessageSender<S> {
    sink: S,
}

impl<S: FrameSink> MessageSender<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn send<M: Serialize>(&mut self, message: &M) -> Result<(), ChannelError> {
        let frame = serde_json::to_string(message)?;
        self.sink.send_frame(&frame)
    }
}

pub struct MessageReceiver<S, M> {
    source: S,
    _message: PhantomData<fn() -> M>,
}

impl<S: FrameSource, M: DeserializeOwned> MessageReceiver<S, M> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            _message: PhantomData,
        }
    }

    /// Next message, `Ok(None)` when the stream ended. A malformed frame is
    /// reported as an error and consumed; the next call reads the frame after it.
    pub fn recv(&mut self) -> Result<Option<M>, ChannelError> {
        match self.source.recv_frame()? {
            Some(frame) => Ok(Some(serde_json::from_str(&frame)?)),
            None => Ok(None),
        }
    }
}

/// Connected sender/receiver pair backed by an in-process queue.
pub fn in_process<M: Serialize + DeserializeOwned>() -> (
    MessageSender<mpsc::Sender<String>>,
    MessageReceiver<mpsc::Receiver<String>, M>,
) {
    let (tx, rx) = mpsc::channel();
    (MessageSender::new(tx), MessageReceiver::new(rx))
}
