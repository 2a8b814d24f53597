//! Barcode scanner collaborator.
//!
//! A scanner runs on its own (a camera pipeline, a serial device, a reader
//! thread) and reports decoded text through a channel. The owning event loop
//! drains that channel between user actions via [`ScanSession::poll`], so a
//! scan result is never applied while an add is in progress.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Nothing decodable in the current frame/read. Normal scanning noise.
    #[error("no barcode found")]
    NotFound,

    /// Device or decoder failure.
    #[error("{0}")]
    Device(String),
}

impl ScanError {
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    /// Transient errors are swallowed instead of being shown to the user.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScanError::NotFound)
    }
}

/// One report from a running scanner.
pub type ScanEvent = Result<String, ScanError>;

/// Capture device producing decoded barcode text.
pub trait BarcodeScanner {
    /// Begin capturing; every decode attempt is sent to `results`.
    fn start(&mut self, results: Sender<ScanEvent>) -> Result<(), ScanError>;

    /// Stop capturing and release the underlying device handle.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// A scanner plus the receiving end of its result channel.
pub struct ScanSession<B> {
    scanner: B,
    results: Option<Receiver<ScanEvent>>,
}

impl<B: BarcodeScanner> ScanSession<B> {
    pub fn new(scanner: B) -> Self {
        Self {
            scanner,
            results: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.results.is_some() && self.scanner.is_running()
    }

    pub fn start(&mut self) -> Result<(), ScanError> {
        if self.results.is_some() {
            return Ok(());
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        self.scanner.start(tx)?;
        self.results = Some(rx);
        tracing::debug!("scanner started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.results.take().is_some() {
            self.scanner.stop();
            tracing::debug!("scanner stopped");
        }
    }

    /// Next pending report, if any. Never blocks.
    pub fn poll(&mut self) -> Option<ScanEvent> {
        let rx = self.results.as_ref()?;
        match rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::debug!("scanner channel closed");
                self.stop();
                None
            }
        }
    }

    pub fn scanner(&self) -> &B {
        &self.scanner
    }
}
