//! Background proving with cancellation.
//!
//! A [`Session`] runs at most one live job: submitting new input cancels the job before it.

use crate::error::{ProveError, Result};
use crate::parser::{parse_argument, Argument};
use crate::prover::{prove_with_cancel, ProverConfig, TruthTreeResult};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Shared flag asking a running prover to stop
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A proof running on its own thread.
#[derive(Debug)]
pub struct Job {
    argument: Argument,
    cancel: CancelToken,
    handle: JoinHandle<std::result::Result<TruthTreeResult, ProveError>>,
}

impl Job {
    pub fn argument(&self) -> &Argument {
        &self.argument
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the prover returns. A panic on the prover thread is resumed here.
    pub fn wait(self) -> Result<TruthTreeResult> {
        match self.handle.join() {
            Ok(result) => Ok(result?),
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    current: Option<CancelToken>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and starts proving it in the background.
    ///
    /// Input errors are returned right away and leave the running job alone. Otherwise the
    /// previous job is cancelled before the new one starts.
    pub fn submit(&mut self, text: &str, config: ProverConfig) -> Result<Job> {
        let argument = parse_argument(text)?;
        if let Some(previous) = self.current.take() {
            debug!("cancelling previous job");
            previous.cancel();
        }
        let cancel = CancelToken::new();
        self.current = Some(cancel.clone());
        let handle = {
            let Argument {
                premises,
                conclusion,
            } = argument.clone();
            let cancel = cancel.clone();
            thread::spawn(move || prove_with_cancel(&premises, &conclusion, config, &cancel))
        };
        Ok(Job {
            argument,
            cancel,
            handle,
        })
    }

    /// Cancels the current job, if any.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.current.take() {
            cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationError};
    use crate::prover::Strategy;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!shared.is_cancelled());
        token.cancel();
        assert!(shared.is_cancelled());
    }

    #[test]
    fn test_submit() {
        let mut session = Session::new();
        for strategy in [Strategy::Greedy, Strategy::Exhaustive] {
            let job = session
                .submit("P implies Q; P\nQ", ProverConfig { strategy })
                .unwrap();
            assert_eq!(job.argument().premises.len(), 2);
            let result = job.wait().unwrap();
            assert!(result.valid);
        }
    }

    #[test]
    fn test_job_finishes() {
        let mut session = Session::new();
        let job = session.submit("A -> B; A; B", ProverConfig::default()).unwrap();
        while !job.is_finished() {
            thread::yield_now();
        }
        assert!(job.wait().unwrap().valid);
    }

    #[test]
    fn test_submit_cancels_previous() {
        let mut session = Session::new();
        let first = session.submit("A or B; A", ProverConfig::default()).unwrap();
        let previous = first.cancel.clone();
        let second = session.submit("A; A", ProverConfig::default()).unwrap();
        assert!(previous.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        // the first job either finished before the cancellation or stopped because of it
        match first.wait() {
            Ok(result) => assert!(!result.valid),
            Err(err) => assert_eq!(err, Error::Prove(ProveError::Cancelled)),
        }
        assert!(second.wait().unwrap().valid);
    }

    #[test]
    fn test_invalid_input_keeps_current_job() {
        let mut session = Session::new();
        let job = session.submit("A; A", ProverConfig::default()).unwrap();
        assert_eq!(
            session.submit("A", ProverConfig::default()).unwrap_err(),
            Error::Validation(ValidationError::TooFewSentences { found: 1 })
        );
        assert!(!job.cancel.is_cancelled());
        assert!(job.wait().unwrap().valid);
    }

    #[test]
    fn test_cancel_job() {
        let mut session = Session::new();
        let job = session.submit("A; A", ProverConfig::default()).unwrap();
        session.cancel();
        assert!(job.cancel.is_cancelled());
        assert!(matches!(
            job.wait(),
            Ok(_) | Err(Error::Prove(ProveError::Cancelled))
        ));
    }
}
