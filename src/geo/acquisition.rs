//! Resumable three-step location acquisition.
//!
//! ```text
//!   AwaitingFix ──ok──▶ AwaitingTimezone ──ok──▶ AwaitingPlace ──ok──▶ Done
//!       ▲  │fail            │fail                   │fail
//!       │  └─ retry same step after the retry interval ┘
//!       └──────────── link down (from any step) ──────────────────────┘
//! ```
//!
//! Each scheduler tick runs at most one step. The current step lives in
//! [`AcquisitionState`], not on a call stack, so a failure in a later step
//! retries only that step. A successful step asks to be re-run after the
//! short step interval, a failed one after the longer retry interval, and
//! `Done` disables the unit until the link drops.

use core::fmt::Write;

use heapless::String;

use super::GeoContext;
use super::service::{LookupService, SessionError};
use crate::config::Config;
use crate::system::{Clock, ErrorLog, Schedule};
use crate::system::errlog::MESSAGE_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AwaitingFix,
    AwaitingTimezone,
    AwaitingPlace,
    Done,
}

impl Step {
    /// 1-based position in the sequence, as shown to the user.
    pub fn number(&self) -> u8 {
        match self {
            Step::AwaitingFix => 1,
            Step::AwaitingTimezone => 2,
            Step::AwaitingPlace => 3,
            Step::Done => 4,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Step::AwaitingFix => "WiFi geolocation",
            Step::AwaitingTimezone => "timezone",
            Step::AwaitingPlace => "geocoding",
            Step::Done => "done",
        }
    }

    fn next(&self) -> Step {
        match self {
            Step::AwaitingFix => Step::AwaitingTimezone,
            Step::AwaitingTimezone => Step::AwaitingPlace,
            Step::AwaitingPlace | Step::Done => Step::Done,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Step {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "step {=u8}", self.number())
    }
}

/// Most recent failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub error: SessionError,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionState {
    pub step: Step,
    pub last_error: Option<StepFailure>,
    /// Clock time at which the next tick is due.
    pub next_retry_at: u64,
}

impl Default for AcquisitionState {
    fn default() -> Self {
        Self {
            step: Step::AwaitingFix,
            last_error: None,
            next_retry_at: 0,
        }
    }
}

/// The acquisition state machine.
#[derive(Debug, Clone)]
pub struct Acquisition {
    state: AcquisitionState,
    step_interval_ms: u32,
    retry_interval_ms: u32,
}

impl Acquisition {
    pub fn new(step_interval_ms: u32, retry_interval_ms: u32) -> Self {
        Self {
            state: AcquisitionState::default(),
            step_interval_ms,
            retry_interval_ms,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.step_interval_ms, config.retry_interval_ms)
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    /// `true` when a tick at `now_ms` would do work.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.state.step != Step::Done && now_ms >= self.state.next_retry_at
    }

    /// Starts over from the first step.
    pub fn restart(&mut self, ctx: &mut GeoContext) {
        self.state.step = Step::AwaitingFix;
        ctx.valid = false;
    }

    /// Runs one scheduler invocation. Failures and the next due time are
    /// stamped with `clock`.
    pub fn tick<S: LookupService, C: Clock, const E: usize>(
        &mut self,
        service: &mut S,
        ctx: &mut GeoContext,
        errors: &mut ErrorLog<E>,
        clock: &C,
    ) -> Schedule {
        let now_ms = clock.now_ms();
        if !service.is_connected() {
            if self.state.step != Step::AwaitingFix || ctx.valid {
                log::info!("link down, geolocation restarts");
            }
            self.restart(ctx);
            return self.reschedule(now_ms, self.retry_interval_ms);
        }

        let step = self.state.step;
        log::debug!("geolocation step {} ({})", step.number(), step.label());
        let outcome = match step {
            Step::Done => return Schedule::Disable,
            Step::AwaitingFix => service.fix().map(|fix| ctx.fix = Some(fix)),
            Step::AwaitingTimezone | Step::AwaitingPlace => {
                let Some(fix) = ctx.fix else {
                    log::warn!("no fix for step {}, starting over", step.number());
                    self.restart(ctx);
                    return self.reschedule(now_ms, self.step_interval_ms);
                };
                if step == Step::AwaitingTimezone {
                    service.timezone(&fix).map(|info| ctx.timezone = Some(info))
                } else {
                    service.place(&fix).map(|place| ctx.place = Some(place))
                }
            }
        };

        match outcome {
            Ok(()) => {
                self.state.step = step.next();
                log::info!("geolocation step {} successful", step.number());
                if self.state.step == Step::Done {
                    ctx.valid = true;
                    self.state.next_retry_at = u64::MAX;
                    return Schedule::Disable;
                }
                self.reschedule(now_ms, self.step_interval_ms)
            }
            Err(error) => {
                let mut message: String<MESSAGE_LEN> = String::new();
                let _ = write!(message, "Geolocation failure step {} ({})", step.number(), step.label());
                errors.record(now_ms, &message);
                log::debug!("step {} error: {:?}", step.number(), error);
                self.state.last_error = Some(StepFailure {
                    step,
                    error,
                    at_ms: now_ms,
                });
                self.reschedule(now_ms, self.retry_interval_ms)
            }
        }
    }

    fn reschedule(&mut self, now_ms: u64, delay_ms: u32) -> Schedule {
        self.state.next_retry_at = now_ms.saturating_add(u64::from(delay_ms));
        Schedule::After(delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoFix, PlaceName, TimezoneInfo};

    struct At(u64);

    impl Clock for At {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    struct Scripted {
        connected: bool,
        fail_next: bool,
        calls: u8,
    }

    impl LookupService for Scripted {
        fn is_connected(&self) -> bool {
            self.connected
        }
        fn fix(&mut self) -> Result<GeoFix, SessionError> {
            self.calls += 1;
            if core::mem::take(&mut self.fail_next) {
                return Err(SessionError::Incomplete);
            }
            Ok(GeoFix::new(1.0, 2.0))
        }
        fn timezone(&mut self, _fix: &GeoFix) -> Result<TimezoneInfo, SessionError> {
            self.calls += 1;
            Ok(TimezoneInfo::default())
        }
        fn place(&mut self, _fix: &GeoFix) -> Result<PlaceName, SessionError> {
            self.calls += 1;
            Ok(PlaceName::default())
        }
    }

    #[test_log::test]
    fn test_failure_message_lands_in_error_log() {
        let mut machine = Acquisition::new(1_000, 15_000);
        let mut service = Scripted { connected: true, fail_next: true, calls: 0 };
        let mut ctx = GeoContext::new();
        let mut errors: ErrorLog = ErrorLog::new();

        assert_eq!(machine.tick(&mut service, &mut ctx, &mut errors, &At(500)), Schedule::After(15_000));
        assert_eq!(errors.latest(), Some("Geolocation failure step 1 (WiFi geolocation)"));
        assert_eq!(errors.entry(0).map(|e| e.at_ms), Some(500));
        assert_eq!(machine.state().next_retry_at, 15_500);
        assert!(!machine.is_due(10_000));
        assert!(machine.is_due(15_500));
    }

    #[test]
    fn test_missing_fix_restarts_sequence() {
        let mut machine = Acquisition::new(1_000, 15_000);
        let mut service = Scripted { connected: true, fail_next: false, calls: 0 };
        let mut ctx = GeoContext::new();
        let mut errors: ErrorLog = ErrorLog::new();

        machine.tick(&mut service, &mut ctx, &mut errors, &At(0));
        assert_eq!(machine.step(), Step::AwaitingTimezone);

        ctx = GeoContext::new();
        assert_eq!(machine.tick(&mut service, &mut ctx, &mut errors, &At(1)), Schedule::After(1_000));
        assert_eq!(machine.step(), Step::AwaitingFix);
        assert_eq!(service.calls, 1);
    }
}
