//! Calibration workflow glue between the framing layer, user actions and the
//! calibration pipeline.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::{debug, error, info, warn};

use crate::codec::{self, CalibrationPayload};
use crate::collector::{CollectorState, PointCollector};
use crate::error::{Error, Result};
use crate::frame::decode_frame;
use crate::io::CalibrationStore;
use crate::solver::{CalibrationResult, HomographySolver};
use crate::types::ReferenceCorner;

/// Source of complete frames, typically a serial port behind an HDLC decoder.
pub trait FrameSource: Send {
    /// Next complete frame, `Ok(None)` when nothing arrived within the
    /// source's read timeout. An error is terminal.
    fn next_frame(&mut self) -> std::io::Result<Option<Vec<u8>>>;
}

/// Action on a calibration session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Frame(Vec<u8>),
    Commit(ReferenceCorner),
    Reset,
    Compute,
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::InvalidCommand(format!("odd length hex '{}'", s)));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|byte| u8::from_str_radix(byte, 16).ok())
                .ok_or_else(|| Error::InvalidCommand(format!("invalid hex '{}'", s)))
        })
        .collect()
}

impl FromStr for Command {
    type Err = Error;

    /// `frame <hex>`, `commit <corner>`, `reset` or `compute`.
    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some("frame"), Some(hex)) => Command::Frame(parse_hex(hex)?),
            (Some("commit"), Some(corner)) => Command::Commit(corner.parse()?),
            (Some("reset"), None) => Command::Reset,
            (Some("compute"), None) => Command::Compute,
            _ => return Err(Error::InvalidCommand(line.to_string())),
        };
        if words.next().is_some() {
            return Err(Error::InvalidCommand(line.to_string()));
        }
        Ok(command)
    }
}

pub struct CalibrationSession {
    collector: PointCollector,
    solver: HomographySolver,
    store: CalibrationStore,
    last_result: Option<CalibrationResult>,
}

impl CalibrationSession {
    pub fn new(store: CalibrationStore) -> Self {
        Self::with_solver(store, HomographySolver::default())
    }

    pub fn with_solver(store: CalibrationStore, solver: HomographySolver) -> Self {
        CalibrationSession {
            collector: PointCollector::new(),
            solver,
            store,
            last_result: None,
        }
    }

    /// Decodes a frame into the pending sample.
    pub fn handle_frame(&mut self, frame: &[u8]) -> Result<()> {
        let sample = decode_frame(frame)?;
        debug!("data received: {:?}", sample);
        self.collector.set_pending(sample);
        Ok(())
    }

    pub fn commit_point(&mut self, corner: ReferenceCorner) -> Result<()> {
        self.collector.commit_point(corner)
    }

    pub fn reset(&mut self) {
        self.collector.reset();
        self.last_result = None;
    }

    pub fn state(&self) -> CollectorState {
        self.collector.state()
    }

    /// All four corners are set and a calibration can be computed.
    pub fn is_ready(&self) -> bool {
        self.state() == CollectorState::Complete
    }

    pub fn collector(&self) -> &PointCollector {
        &self.collector
    }

    pub fn store(&self) -> &CalibrationStore {
        &self.store
    }

    pub fn last_result(&self) -> Option<&CalibrationResult> {
        self.last_result.as_ref()
    }

    /// Solves, encodes and saves the calibration.
    ///
    /// Nothing is saved on failure and the collected points are kept.
    pub fn compute_calibration(&mut self) -> Result<CalibrationPayload> {
        let result = self.solver.solve(self.collector.points())?;
        let payload = codec::encode(&result)?;
        self.store.save(&payload)?;
        self.last_result = Some(result);
        Ok(payload)
    }

    /// Previously saved calibration, a corrupt file counts as absent.
    pub fn load_calibration(&self) -> Option<CalibrationPayload> {
        match self.store.load() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("ignoring stored calibration: {}", e);
                None
            }
        }
    }

    /// Applies one action, returning the payload when a calibration was saved.
    pub fn apply(&mut self, command: &Command) -> Result<Option<CalibrationPayload>> {
        match command {
            Command::Frame(bytes) => self.handle_frame(bytes)?,
            Command::Commit(corner) => self.commit_point(*corner)?,
            Command::Reset => self.reset(),
            Command::Compute => return self.compute_calibration().map(Some),
        }
        Ok(None)
    }
}

/// Feeds frames from `source` into `session` until `stop` is raised or the
/// source fails.
///
/// Invalid frames are dropped. A source error or a poisoned session raises
/// `stop` and ends the loop with [`Error::Transport`]. The source is dropped when the loop returns.
pub fn run_reader<S: FrameSource>(
    mut source: S,
    session: &Mutex<CalibrationSession>,
    stop: &AtomicBool,
) -> Result<()> {
    while !stop.load(Ordering::Relaxed) {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                error!("error reading transport: {}", e);
                stop.store(true, Ordering::Relaxed);
                return Err(Error::Transport(e.to_string()));
            }
        };
        let Ok(mut session) = session.lock() else {
            error!("calibration session lock poisoned");
            stop.store(true, Ordering::Relaxed);
            return Err(Error::Transport("calibration session lock poisoned".to_string()));
        };
        match session.handle_frame(&frame) {
            Ok(()) => {}
            Err(Error::InvalidFrame { len }) => {
                warn!("invalid payload received ({} bytes): {:02x?}", len, frame)
            }
            Err(e) => return Err(e),
        }
    }
    info!("reader stopped");
    Ok(())
}

/// Runs [`run_reader`] on its own thread.
pub fn spawn_reader<S: FrameSource + 'static>(
    source: S,
    session: Arc<Mutex<CalibrationSession>>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<Result<()>> {
    std::thread::spawn(move || run_reader(source, &session, &stop))
}
