//! Replayer - deterministic reconstruction from the event log.
//!
//! Only the input-kind events are reissued: every `NewOrderAck` becomes a
//! new-order command and every `CancelAck` a cancel command against a fresh
//! engine. Trades are never replayed - the matching logic regenerates them
//! bit-exactly, which is precisely what the determinism tests pin down.
//!
//! The persisted format is one ASCII CSV line per event (see
//! [`crate::events::Event`]'s `Display`). The reader is deliberately
//! forgiving: empty lines and lines it cannot parse are skipped, so
//! hand-edited and mixed-version logs still load.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::engine::Engine;
use crate::error::{EngineError, ReplayError};
use crate::events::Event;

pub struct Replayer;

impl Replayer {
    /// Rebuild an engine by reissuing the input-kind events of `log`.
    ///
    /// The fresh engine is sized to the number of new-order events: each
    /// live order traces back to exactly one of them, so the replay can
    /// never run the pool dry on its own.
    pub fn replay(log: &[Event]) -> Result<Engine, EngineError> {
        let new_orders = log
            .iter()
            .filter(|event| matches!(event, Event::NewOrderAck { .. }))
            .count();
        let mut engine = Engine::new(new_orders.max(1) as u32);

        for event in log {
            match *event {
                Event::NewOrderAck {
                    id,
                    side,
                    price,
                    qty,
                    ..
                } => engine.process_new_order(id, side, price, qty)?,
                Event::CancelAck { id, .. } => engine.process_cancel(id),
                // Regenerated by the matching logic.
                Event::Trade { .. } => {}
            }
        }

        Ok(engine)
    }

    /// Write `log` to `path`, one event per line.
    pub fn save<P: AsRef<Path>>(log: &[Event], path: P) -> Result<(), ReplayError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for event in log {
            writeln!(writer, "{event}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a persisted log. Empty and unparseable lines are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Event>, ReplayError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match Event::parse_line(&line) {
                Some(event) => events.push(event),
                None => debug!(line = %line, "skipping unparseable log line"),
            }
        }
        Ok(events)
    }

    /// Load a persisted log and replay it into a fresh engine.
    pub fn load_and_replay<P: AsRef<Path>>(path: P) -> Result<Engine, ReplayError> {
        let log = Self::load(path)?;
        Ok(Self::replay(&log)?)
    }
}
