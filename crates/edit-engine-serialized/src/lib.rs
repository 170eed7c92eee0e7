#![warn(missing_docs)]
//! Serialized access to an `edit-engine` buffer.
//!
//! [`SerializedBuffer`] owns a [`Buffer`] on a dedicated worker thread. Every operation is shipped
//! to the worker as a closure and the caller blocks until the result comes back, so any number of
//! threads can share one buffer without locks:
//!
//! ```text
//! caller thread                      worker thread
//! ─────────────                      ─────────────
//! send Run(job)  ─────────────────▶  job(&mut buffer)
//!                                     (panics are caught)
//! receive reply  ◀─────────────────  send result
//! ```
//!
//! A panic inside an operation is caught on the worker, logged, and reported as
//! [`SerializedError::OperationPanicked`]; the worker keeps serving requests afterwards.
//!
//! ```rust
//! use edit_engine::{BufferConfig, Region};
//! use edit_engine_serialized::SerializedBuffer;
//!
//! let buffer = SerializedBuffer::spawn(BufferConfig::default())?;
//! buffer.insert(0, "Hello World")?;
//! assert_eq!(buffer.substr(Region::new(6, 11))?, "World");
//! buffer.close()?;
//! # Ok::<(), edit_engine_serialized::SerializedError>(())
//! ```

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use edit_engine::{Buffer, BufferConfig, ConfigError, Region};
use thiserror::Error;

/// Errors returned by [`SerializedBuffer`].
#[derive(Debug, Error)]
pub enum SerializedError {
    #[error("buffer worker is no longer running")]
    /// The worker thread has exited; the buffer is gone.
    WorkerGone,

    #[error("buffer operation panicked: {0}")]
    /// The operation panicked on the worker. The buffer may hold a partial edit.
    OperationPanicked(String),

    #[error("invalid buffer config: {0}")]
    /// The config passed to [`SerializedBuffer::spawn`] was rejected.
    Config(#[from] ConfigError),

    #[error("failed to spawn buffer worker: {0}")]
    /// The worker thread could not be started.
    Spawn(#[from] io::Error),
}

type Job = Box<dyn FnOnce(&mut Buffer) + Send>;

enum WorkerCommand {
    Run(Job),
    Shutdown,
}

/// A [`Buffer`] living on its own thread.
pub struct SerializedBuffer {
    tx: Sender<WorkerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl SerializedBuffer {
    /// Start a worker owning an empty buffer built from `config`.
    pub fn spawn(config: BufferConfig) -> Result<Self, SerializedError> {
        config.validate()?;
        let (tx, rx) = mpsc::channel::<WorkerCommand>();
        let handle = thread::Builder::new()
            .name("edit-engine-buffer".to_string())
            .spawn(move || worker_main(rx, config))?;
        tracing::debug!("buffer worker started");
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Run `f` against the buffer on the worker thread and return its result.
    pub fn with_buffer<R, F>(&self, f: F) -> Result<R, SerializedError>
    where
        F: FnOnce(&mut Buffer) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel::<Result<R, String>>();
        let job: Job = Box::new(move |buffer| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(buffer)));
            let reply = outcome.map_err(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(%message, "buffer operation panicked");
                message
            });
            // The caller may have given up waiting; nothing to do then.
            let _ = reply_tx.send(reply);
        });

        self.tx
            .send(WorkerCommand::Run(job))
            .map_err(|_| SerializedError::WorkerGone)?;
        match reply_rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(SerializedError::OperationPanicked(message)),
            Err(_) => Err(SerializedError::WorkerGone),
        }
    }

    /// See [`Buffer::size`].
    pub fn size(&self) -> Result<usize, SerializedError> {
        self.with_buffer(|buffer| buffer.size())
    }

    /// See [`Buffer::substr`].
    pub fn substr(&self, region: Region) -> Result<String, SerializedError> {
        self.with_buffer(move |buffer| buffer.substr(region))
    }

    /// See [`Buffer::insert`].
    pub fn insert(&self, point: usize, value: impl Into<String>) -> Result<usize, SerializedError> {
        let value = value.into();
        self.with_buffer(move |buffer| buffer.insert(point, &value))
    }

    /// See [`Buffer::erase`].
    pub fn erase(&self, point: usize, length: usize) -> Result<usize, SerializedError> {
        self.with_buffer(move |buffer| buffer.erase(point, length))
    }

    /// See [`Buffer::char_at`].
    pub fn char_at(&self, point: usize) -> Result<Option<char>, SerializedError> {
        self.with_buffer(move |buffer| buffer.char_at(point))
    }

    /// See [`Buffer::row_col`].
    pub fn row_col(&self, point: usize) -> Result<(usize, usize), SerializedError> {
        self.with_buffer(move |buffer| buffer.row_col(point))
    }

    /// See [`Buffer::text_point`].
    pub fn text_point(&self, row: usize, col: usize) -> Result<usize, SerializedError> {
        self.with_buffer(move |buffer| buffer.text_point(row, col))
    }

    /// The whole buffer contents.
    pub fn to_string(&self) -> Result<String, SerializedError> {
        self.with_buffer(|buffer| buffer.to_string())
    }

    /// Stop the worker and wait for it to exit.
    pub fn close(mut self) -> Result<(), SerializedError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), SerializedError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // The worker may already be gone; joining below still reaps it.
        let _ = self.tx.send(WorkerCommand::Shutdown);
        handle.join().map_err(|_| SerializedError::WorkerGone)?;
        tracing::debug!("buffer worker stopped");
        Ok(())
    }
}

impl Drop for SerializedBuffer {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(%err, "buffer worker did not shut down cleanly");
        }
    }
}

fn worker_main(rx: Receiver<WorkerCommand>, config: BufferConfig) {
    let mut buffer = match Buffer::with_config(config) {
        Ok(buffer) => buffer,
        Err(err) => {
            tracing::error!(%err, "buffer worker could not build its buffer");
            return;
        }
    };
    while let Ok(command) = rx.recv() {
        match command {
            WorkerCommand::Run(job) => job(&mut buffer),
            WorkerCommand::Shutdown => break,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
