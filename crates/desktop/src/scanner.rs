//! Line-oriented barcode scanner.
//!
//! Keyboard-wedge and serial scanners deliver one decoded code per line. The
//! scanner reads such a source on a worker thread and forwards every line as a
//! scan report; a blank line is reported as "nothing found".
//!
//! Device nodes and FIFOs are read through tokio's non-blocking pipe support so
//! that `stop` can wake the worker while it waits for input. Regular files are
//! read to the end with plain blocking IO.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use stocktally_inventory::{BarcodeScanner, ScanError, ScanEvent};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

type Opened = Sender<io::Result<()>>;

pub struct ReaderScanner {
    path: PathBuf,
    stop: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ReaderScanner {
    /// Scan from a device node, FIFO or file; the path is reopened on every start.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stop: None,
            worker: None,
        }
    }
}

impl BarcodeScanner for ReaderScanner {
    fn start(&mut self, results: Sender<ScanEvent>) -> Result<(), ScanError> {
        if self.is_running() {
            return Ok(());
        }
        // Reap a worker that ran out of input on its own.
        self.stop();

        let (stop_tx, stop_rx) = oneshot::channel();
        let (opened_tx, opened_rx) = crossbeam_channel::bounded(1);
        let path = self.path.clone();

        let worker = thread::Builder::new()
            .name("barcode-reader".to_string())
            .spawn(move || read_device(&path, stop_rx, &opened_tx, &results))
            .map_err(|e| ScanError::device(format!("failed to start reader thread: {e}")))?;

        match opened_rx.recv() {
            Ok(Ok(())) => {
                self.stop = Some(stop_tx);
                self.worker = Some(worker);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(ScanError::device(e.to_string()))
            }
            Err(_) => {
                let _ = worker.join();
                Err(ScanError::device("barcode reader exited before opening the device"))
            }
        }
    }

    /// Signals the worker and waits for it, so the device is closed on return.
    fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("barcode reader thread panicked");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

impl Drop for ReaderScanner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_device(
    path: &Path,
    stop: oneshot::Receiver<()>,
    opened: &Opened,
    results: &Sender<ScanEvent>,
) {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => read_file(path, stop, opened, results),
        Ok(meta) => read_stream(path, &meta, stop, opened, results),
        Err(e) => {
            let _ = opened.send(Err(e));
        }
    }
    tracing::debug!(path = %path.display(), "barcode reader finished");
}

fn read_file(
    path: &Path,
    mut stop: oneshot::Receiver<()>,
    opened: &Opened,
    results: &Sender<ScanEvent>,
) {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            let _ = opened.send(Err(e));
            return;
        }
    };
    let _ = opened.send(Ok(()));

    for line in BufReader::new(file).lines() {
        if !matches!(stop.try_recv(), Err(TryRecvError::Empty)) {
            break;
        }
        let failed = line.is_err();
        if results.send(scan_event(line)).is_err() || failed {
            break;
        }
    }
}

#[cfg(unix)]
fn read_stream(
    path: &Path,
    meta: &std::fs::Metadata,
    mut stop: oneshot::Receiver<()>,
    opened: &Opened,
    results: &Sender<ScanEvent>,
) {
    use std::os::unix::fs::FileTypeExt;
    use tokio::io::AsyncBufReadExt;

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = opened.send(Err(e));
            return;
        }
    };
    let fifo = meta.file_type().is_fifo();

    runtime.block_on(async {
        let receiver = match open_receiver(path, fifo) {
            Ok(receiver) => receiver,
            Err(e) => {
                let _ = opened.send(Err(e));
                return;
            }
        };
        let _ = opened.send(Ok(()));

        let mut lines = tokio::io::BufReader::new(receiver).lines();
        loop {
            let line = tokio::select! {
                _ = &mut stop => break,
                line = lines.next_line() => line,
            };
            let line = match line {
                Ok(Some(line)) => Ok(line),
                Ok(None) => break,
                Err(e) => Err(e),
            };
            let failed = line.is_err();
            if results.send(scan_event(line)).is_err() || failed {
                break;
            }
        }
    });
}

#[cfg(not(unix))]
fn read_stream(
    path: &Path,
    _meta: &std::fs::Metadata,
    stop: oneshot::Receiver<()>,
    opened: &Opened,
    results: &Sender<ScanEvent>,
) {
    read_file(path, stop, opened, results)
}

#[cfg(unix)]
fn open_receiver(path: &Path, fifo: bool) -> io::Result<tokio::net::unix::pipe::Receiver> {
    let mut options = tokio::net::unix::pipe::OpenOptions::new();
    // Holding a write end keeps a FIFO from hitting end-of-file between writers.
    #[cfg(target_os = "linux")]
    options.read_write(fifo);
    #[cfg(not(target_os = "linux"))]
    let _ = fifo;
    options.unchecked(true).open_receiver(path)
}

fn scan_event(line: io::Result<String>) -> ScanEvent {
    match line {
        Ok(line) => match line.trim() {
            "" => Err(ScanError::NotFound),
            code => Ok(code.to_string()),
        },
        Err(e) => Err(ScanError::device(e.to_string())),
    }
}
