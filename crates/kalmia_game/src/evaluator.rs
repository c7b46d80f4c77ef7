//! Advisory position evaluation on a second engine.
//!
//! The evaluator ponders on whatever position it is given and turns the
//! engine's `info` scores into win rates for display. It never decides
//! legality or game termination.

use parking_lot::Mutex;
use reversi_core::{DiscColor, Position};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{EngineConfig, EvaluatorOptions};
use crate::engine::{EngineEvent, EngineProcess};
use crate::error::EngineError;
use crate::events::{EventHub, SubscriptionId};
use crate::protocol::{ScoreScale, ScoreType, SearchInfo};
use crate::session::TerminationKind;

/// Disc differences this close to zero count as an even position.
const EVEN_EPSILON: f64 = 1.0e-7;

/// Map an engine score to a win rate in percent for the side to move.
///
/// Disc differences are classified by sign only: even is 50, ahead is 100,
/// behind is 0. Win rates and unknown scales pass through unchanged.
pub fn to_win_rate(score: f64, scale: &ScoreScale) -> f64 {
    match scale.kind {
        ScoreType::WinRate | ScoreType::Other => score,
        ScoreType::DiscDiff => {
            if score.abs() <= EVEN_EPSILON {
                50.0
            } else if score > 0.0 {
                100.0
            } else {
                0.0
            }
        }
    }
}

/// One evaluation update.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Side to move in the evaluated position
    pub color: DiscColor,
    /// Discs placed since the initial position. Passes do not advance it, so
    /// it can lag a ply count that includes them.
    pub move_num: u32,
    pub info: SearchInfo,
    /// Win rate for `color` in percent; None for multi-PV lines and lines without a score
    pub win_rate: Option<f64>,
}

impl Evaluation {
    pub fn black_win_rate(&self) -> Option<f64> {
        self.win_rate.map(|rate| match self.color {
            DiscColor::Black => rate,
            DiscColor::White => 100.0 - rate,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatorEvent {
    Evaluation(Evaluation),
    /// The engine closed its search with `bestmove`
    Stopped,
    Terminated(TerminationKind),
}

#[derive(Debug, Clone, Copy)]
struct Target {
    color: DiscColor,
    move_num: u32,
}

pub struct Evaluator {
    engine: EngineProcess,
    target: Arc<Mutex<Option<Target>>>,
    /// Released by the `bestmove` that closes a stopped search
    stop_waiter: Arc<Mutex<Option<Sender<()>>>>,
    events: Arc<EventHub<EvaluatorEvent>>,
}

impl Evaluator {
    /// Launch the evaluation engine and send `options`.
    pub fn launch(config: EngineConfig, options: &EvaluatorOptions) -> Result<Self, EngineError> {
        let engine = EngineProcess::new(config);
        engine.run()?;
        for (name, value) in options.to_pairs() {
            engine.set_option(name, value)?;
        }
        Ok(Self::from_engine(engine))
    }

    pub(crate) fn from_engine(engine: EngineProcess) -> Self {
        let target: Arc<Mutex<Option<Target>>> = Arc::new(Mutex::new(None));
        let stop_waiter: Arc<Mutex<Option<Sender<()>>>> = Arc::new(Mutex::new(None));
        let events = Arc::new(EventHub::new());

        {
            let target = Arc::clone(&target);
            let stop_waiter = Arc::clone(&stop_waiter);
            let events = Arc::clone(&events);
            engine.subscribe(move |event| {
                match event {
                    EngineEvent::Info { info, scale } => {
                        let Some(target) = *target.lock() else {
                            return true;
                        };
                        let win_rate = match info.multipv {
                            Some(_) => None,
                            None => info.score.map(|score| to_win_rate(score, scale)),
                        };
                        events.publish(&EvaluatorEvent::Evaluation(Evaluation {
                            color: target.color,
                            move_num: target.move_num,
                            info: info.clone(),
                            win_rate,
                        }));
                    }
                    EngineEvent::BestMove(_) => {
                        if let Some(tx) = stop_waiter.lock().take() {
                            tx.send(()).ok();
                        }
                        events.publish(&EvaluatorEvent::Stopped);
                    }
                    EngineEvent::Terminated(kind) => {
                        if let Some(tx) = stop_waiter.lock().take() {
                            tx.send(()).ok();
                        }
                        events.publish(&EvaluatorEvent::Terminated(*kind));
                    }
                }
                true
            });
        }

        Self {
            engine,
            target,
            stop_waiter,
            events,
        }
    }

    /// Start pondering on `pos`. Any evaluation in progress is stopped first.
    pub fn start_evaluation(&self, pos: &Position) -> Result<(), EngineError> {
        self.stop_evaluation()?;
        *self.target.lock() = Some(Target {
            color: pos.side_to_move(),
            move_num: pos.move_number(),
        });

        let started = self
            .engine
            .set_position(pos)
            .and_then(|()| self.engine.go_ponder());
        match &started {
            Ok(()) => debug!(
                color = %pos.side_to_move(),
                move_num = pos.move_number(),
                "evaluation started"
            ),
            Err(_) => {
                self.target.lock().take();
            }
        }
        started
    }

    /// Stop the current evaluation and wait, bounded, for the engine to close it.
    /// Does nothing if none is running.
    pub fn stop_evaluation(&self) -> Result<(), EngineError> {
        if self.target.lock().take().is_none() || self.engine.has_exited() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        *self.stop_waiter.lock() = Some(tx);
        if let Err(e) = self.engine.stop_go() {
            self.stop_waiter.lock().take();
            return Err(e);
        }

        let timeout = self.engine.config().ponder_stop_timeout();
        if rx.recv_timeout(timeout).is_err() {
            warn!(?timeout, "evaluation engine did not answer stop");
        }
        self.stop_waiter.lock().take();
        Ok(())
    }

    pub fn is_evaluating(&self) -> bool {
        self.target.lock().is_some()
    }

    /// Side to move in the position being evaluated.
    pub fn last_evaluated_color(&self) -> Option<DiscColor> {
        self.target.lock().map(|t| t.color)
    }

    pub fn last_evaluated_move_num(&self) -> Option<u32> {
        self.target.lock().map(|t| t.move_num)
    }

    pub fn has_quit_unexpectedly(&self) -> bool {
        self.engine.session().has_quit_unexpectedly()
    }

    pub fn events(&self) -> Receiver<EvaluatorEvent> {
        self.events.subscribe()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&EvaluatorEvent) -> bool + Send + 'static,
    {
        self.events.subscribe_fn(callback)
    }

    pub fn engine(&self) -> &EngineProcess {
        &self.engine
    }

    pub fn quit(&self) -> bool {
        self.target.lock().take();
        self.engine.quit()
    }
}

impl Drop for Evaluator {
    fn drop(&mut self) {
        self.quit();
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
