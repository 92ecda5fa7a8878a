use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    adif,
    core::log::{LogError, LogSnapshot, QsoLog},
    engine::{ContestSession, ContestSessionEngine, DupeKey, ScoringRules, SessionError},
    qso::{Qso, QsoDraft, QsoPatch},
    types::QsoId,
};

use super::events::LogEvent;

/// Failures reported through [`ContestLogHandle`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Log validation or lookup failed.
    #[error(transparent)]
    Log(#[from] LogError),
    /// Contest start/end out of order.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Duplicate refused because [`RuntimeConfig::reject_duplicates`] is set.
    #[error("duplicate qso: {call} on {band} {mode}")]
    Duplicate {
        /// Call of the refused QSO.
        call: String,
        /// Band of the refused QSO.
        band: String,
        /// Mode of the refused QSO.
        mode: String,
    },
    /// The runtime task is gone.
    #[error("contest log runtime has stopped")]
    ChannelClosed,
}

/// Runtime tuning knobs.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Pending commands before callers wait.
    pub command_queue_bound: usize,
    /// Events buffered per subscriber before it lags.
    pub event_queue_bound: usize,
    /// Look up call/band/mode before logging.
    pub duplicate_check: bool,
    /// Refuse duplicates instead of logging them with a warning.
    pub reject_duplicates: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_queue_bound: 1024,
            duplicate_check: true,
            reject_duplicates: false,
        }
    }
}

/// Result of logging one draft.
#[derive(Debug, Clone, PartialEq)]
pub struct LogOutcome {
    /// The stored record, with id, points, serial, and multiplier flag filled in.
    pub qso: Qso,
    /// True when the same call/band/mode was already logged.
    pub duplicate: bool,
}

/// Cloneable front end to the runtime task.
#[derive(Clone)]
pub struct ContestLogHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LogEvent>,
}

type Reply<T> = oneshot::Sender<T>;

enum Command {
    LogQso {
        draft: QsoDraft,
        resp: Reply<Result<LogOutcome, RuntimeError>>,
    },
    CheckDuplicate {
        key: DupeKey,
        resp: Reply<bool>,
    },
    Update {
        qso: Qso,
        resp: Reply<Result<(), RuntimeError>>,
    },
    Patch {
        id: QsoId,
        patch: QsoPatch,
        resp: Reply<Result<(), RuntimeError>>,
    },
    Remove {
        id: QsoId,
        resp: Reply<Result<Qso, RuntimeError>>,
    },
    Clear {
        resp: Reply<()>,
    },
    Load {
        qsos: Vec<Qso>,
        resp: Reply<Result<usize, RuntimeError>>,
    },
    ImportAdif {
        text: String,
        resp: Reply<usize>,
    },
    ExportAdif {
        resp: Reply<String>,
    },
    StartContest {
        name: String,
        exchange: String,
        resp: Reply<Result<(), RuntimeError>>,
    },
    EndContest {
        resp: Reply<Result<ContestSession, RuntimeError>>,
    },
    SetMultipliers {
        multipliers: u32,
        resp: Reply<ContestSession>,
    },
    SetExchange {
        exchange: String,
        resp: Reply<()>,
    },
    Session {
        resp: Reply<ContestSession>,
    },
    Get {
        id: QsoId,
        resp: Reply<Option<Qso>>,
    },
    Recent {
        n: usize,
        resp: Reply<Vec<Qso>>,
    },
    ByCall {
        call: String,
        resp: Reply<Vec<Qso>>,
    },
    Snapshot {
        resp: Reply<LogSnapshot>,
    },
    Shutdown {
        resp: Reply<()>,
    },
}

/// Spawns the task that owns `log` and `engine`; every mutation goes through it in order.
///
/// Must be called from within a tokio runtime.
pub fn spawn_contest_log<R: ScoringRules>(
    log: QsoLog,
    engine: ContestSessionEngine<R>,
    config: RuntimeConfig,
) -> ContestLogHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<LogEvent>(config.event_queue_bound);
    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut log = log;
        let mut engine = engine;

        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut log, &mut engine, &events_tx_loop, &config) {
                break;
            }
        }
        debug!(qsos = log.len(), "contest log runtime stopped");
    });

    ContestLogHandle { cmd_tx, events_tx }
}

impl ContestLogHandle {
    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events_tx.subscribe()
    }

    /// Checks for a duplicate, stamps serial and score, and stores the QSO as one step.
    pub async fn log_qso(&self, draft: QsoDraft) -> Result<LogOutcome, RuntimeError> {
        self.request(|resp| Command::LogQso { draft, resp }).await?
    }

    /// True when the key is already in the log.
    pub async fn is_duplicate(&self, key: DupeKey) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::CheckDuplicate { key, resp }).await
    }

    /// Replaces a stored QSO.
    pub async fn update(&self, qso: Qso) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Update { qso, resp }).await?
    }

    /// Patches a stored QSO.
    pub async fn patch(&self, id: impl Into<QsoId>, patch: QsoPatch) -> Result<(), RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Patch { id, patch, resp }).await?
    }

    /// Deletes a QSO and returns it.
    pub async fn remove(&self, id: impl Into<QsoId>) -> Result<Qso, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Remove { id, resp }).await?
    }

    /// Empties the log. The contest session is untouched.
    pub async fn clear(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Clear { resp }).await
    }

    /// Replaces the log, e.g. with records restored by the host's storage.
    pub async fn load(&self, qsos: Vec<Qso>) -> Result<usize, RuntimeError> {
        self.request(|resp| Command::Load { qsos, resp }).await?
    }

    /// Appends the complete records found in `text`; returns how many were added.
    pub async fn import_adif(&self, text: impl Into<String>) -> Result<usize, RuntimeError> {
        let text = text.into();
        self.request(|resp| Command::ImportAdif { text, resp }).await
    }

    /// Whole log as ADIF text.
    pub async fn export_adif(&self) -> Result<String, RuntimeError> {
        self.request(|resp| Command::ExportAdif { resp }).await
    }

    /// Starts a contest, resetting serial and score.
    pub async fn start_contest(
        &self,
        name: impl Into<String>,
        exchange: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let (name, exchange) = (name.into(), exchange.into());
        self.request(|resp| Command::StartContest { name, exchange, resp })
            .await?
    }

    /// Ends the contest and returns the frozen session.
    pub async fn end_contest(&self) -> Result<ContestSession, RuntimeError> {
        self.request(|resp| Command::EndContest { resp }).await?
    }

    /// Overrides the multiplier count; returns the updated session.
    pub async fn set_multipliers(&self, multipliers: u32) -> Result<ContestSession, RuntimeError> {
        self.request(|resp| Command::SetMultipliers { multipliers, resp })
            .await
    }

    /// Replaces the exchange description.
    pub async fn set_exchange(&self, exchange: impl Into<String>) -> Result<(), RuntimeError> {
        let exchange = exchange.into();
        self.request(|resp| Command::SetExchange { exchange, resp }).await
    }

    /// Current contest session.
    pub async fn session(&self) -> Result<ContestSession, RuntimeError> {
        self.request(|resp| Command::Session { resp }).await
    }

    /// QSO by id.
    pub async fn get(&self, id: impl Into<QsoId>) -> Result<Option<Qso>, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Get { id, resp }).await
    }

    /// Last `n` QSOs, oldest first.
    pub async fn recent(&self, n: usize) -> Result<Vec<Qso>, RuntimeError> {
        self.request(|resp| Command::Recent { n, resp }).await
    }

    /// Every QSO with this exact call.
    pub async fn by_call(&self, call: impl Into<String>) -> Result<Vec<Qso>, RuntimeError> {
        let call = call.into();
        self.request(|resp| Command::ByCall { call, resp }).await
    }

    /// Serializable copy of the log.
    pub async fn snapshot(&self) -> Result<LogSnapshot, RuntimeError> {
        self.request(|resp| Command::Snapshot { resp }).await
    }

    /// Stops the runtime task once earlier commands are handled.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command<R: ScoringRules>(
    cmd: Command,
    log: &mut QsoLog,
    engine: &mut ContestSessionEngine<R>,
    events_tx: &broadcast::Sender<LogEvent>,
    config: &RuntimeConfig,
) -> bool {
    match cmd {
        Command::LogQso { draft, resp } => {
            let res = log_draft(draft, log, engine, config);
            if let Ok(out) = &res {
                let _ = events_tx.send(LogEvent::Logged {
                    id: out.qso.id.clone(),
                    serial_sent: out.qso.serial_sent.clone(),
                    duplicate: out.duplicate,
                });
            }
            let _ = resp.send(res);
        }
        Command::CheckDuplicate { key, resp } => {
            let _ = resp.send(log.contains_key(&key));
        }
        Command::Update { qso, resp } => {
            let id = qso.id.clone();
            let res = log.update(qso).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(LogEvent::Updated { id });
            }
            let _ = resp.send(res);
        }
        Command::Patch { id, patch, resp } => {
            let res = log.patch(&id, &patch).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(LogEvent::Updated { id });
            }
            let _ = resp.send(res);
        }
        Command::Remove { id, resp } => {
            let res = log.remove(&id).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(LogEvent::Removed { id });
            }
            let _ = resp.send(res);
        }
        Command::Clear { resp } => {
            log.clear();
            let _ = events_tx.send(LogEvent::Cleared);
            let _ = resp.send(());
        }
        Command::Load { qsos, resp } => {
            let res = log.load(qsos).map(|()| log.len()).map_err(RuntimeError::from);
            if let Ok(count) = res {
                let _ = events_tx.send(LogEvent::Loaded { count });
            }
            let _ = resp.send(res);
        }
        Command::ImportAdif { text, resp } => {
            let count = log.import(adif::decode_adif(&text));
            info!(count, "imported ADIF records");
            let _ = events_tx.send(LogEvent::Imported { count });
            let _ = resp.send(count);
        }
        Command::ExportAdif { resp } => {
            let _ = resp.send(adif::encode_adif(&log.to_vec()));
        }
        Command::StartContest { name, exchange, resp } => {
            let res = engine.start(&name, &exchange).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(LogEvent::ContestStarted { name });
            }
            let _ = resp.send(res);
        }
        Command::EndContest { resp } => {
            let res = engine
                .end()
                .map(|()| engine.session().clone())
                .map_err(RuntimeError::from);
            if let Ok(session) = &res {
                let _ = events_tx.send(LogEvent::ContestEnded {
                    score: session.score,
                });
            }
            let _ = resp.send(res);
        }
        Command::SetMultipliers { multipliers, resp } => {
            engine.set_multipliers(multipliers);
            let _ = events_tx.send(LogEvent::ScoreChanged {
                score: engine.score(),
            });
            let _ = resp.send(engine.session().clone());
        }
        Command::SetExchange { exchange, resp } => {
            engine.set_exchange(exchange);
            let _ = resp.send(());
        }
        Command::Session { resp } => {
            let _ = resp.send(engine.session().clone());
        }
        Command::Get { id, resp } => {
            let _ = resp.send(log.get(&id).cloned());
        }
        Command::Recent { n, resp } => {
            let _ = resp.send(log.recent_cloned(n));
        }
        Command::ByCall { call, resp } => {
            let _ = resp.send(log.by_call_cloned(&call));
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(log.export_snapshot());
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn log_draft<R: ScoringRules>(
    draft: QsoDraft,
    log: &mut QsoLog,
    engine: &mut ContestSessionEngine<R>,
    config: &RuntimeConfig,
) -> Result<LogOutcome, RuntimeError> {
    let key = DupeKey::new(draft.call.as_str(), draft.band.as_str(), draft.mode.as_str());
    let duplicate = config.duplicate_check && log.contains_key(&key);
    if duplicate {
        if config.reject_duplicates {
            return Err(RuntimeError::Duplicate {
                call: key.call,
                band: key.band,
                mode: key.mode,
            });
        }
        warn!(call = %key.call, band = %key.band, mode = %key.mode, "logging duplicate qso");
    }

    let mut qso = draft.into_qso(Uuid::now_v7().to_string(), 0);
    qso.points = engine.points_for(&qso);
    // Reject before the engine hands out a serial.
    if let Some(field) = qso.missing_required_field() {
        return Err(LogError::MissingField(field).into());
    }

    engine.record_qso(&mut qso);
    log.insert(qso.clone())?;
    Ok(LogOutcome { qso, duplicate })
}
