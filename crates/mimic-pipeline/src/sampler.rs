//! Timer-driven sampling of labeled frames.
//!
//! A [`Sampler`] is a single scheduled task: once started, it takes one sample
//! per interval until `max_samples` slots are used, then stops by itself. Each
//! tick runs to completion before the next one can start:
//!
//! 1. Request a capture from the [`CaptureSource`]
//! 2. Normalize it to the target size
//! 3. Read the held keys from the [`SharedDirection`] and encode them
//! 4. Append the labeled frame to the [`ReplayBuffer`]
//!
//! The sampler does not own a clock. The host event loop calls
//! [`Sampler::poll`] with the current time, and uses
//! [`Sampler::next_tick_at`] to know when to wake up.
//!
//! # Unavailable Captures
//!
//! When the source cannot produce a capture the tick is skipped and logged.
//! [`SkippedTickPolicy`] decides whether that tick used up a sample slot.

use std::time::{Duration, Instant};

use mimic_vision::{Frame, TargetSize};
use serde::{Deserialize, Serialize};

use crate::{
    CaptureSource, DisplaySink, PipelineConfig, ReplayBuffer, ReplayEntry, SharedDirection,
};

/// Whether a tick skipped for lack of a capture counts toward `max_samples`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum SkippedTickPolicy {
    /// Skipped ticks are free; sampling ends after `max_samples` captures.
    #[default]
    Retry,
    /// Skipped ticks use up a slot; sampling ends after `max_samples` ticks.
    Consume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SamplerState {
    /// Never started.
    Idle,
    Running,
    /// All sample slots used.
    Finished,
    /// Cancelled with [`Sampler::stop`].
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// A frame was appended at `index`.
    Sampled { index: usize },
    /// The capture source was not ready.
    Skipped,
    /// The next tick is not due yet.
    NotDue,
    /// The sampler is not running.
    Inactive,
}

#[derive(Debug, Clone)]
pub struct Sampler {
    target: TargetSize,
    letterbox: bool,
    policy: SkippedTickPolicy,
    state: SamplerState,
    interval: Duration,
    next_tick_at: Option<Instant>,
    max_samples: usize,
    slots_used: usize,
    sampled: usize,
    skipped: usize,
}

impl Sampler {
    #[must_use]
    pub fn new(target: TargetSize, letterbox: bool, policy: SkippedTickPolicy) -> Self {
        Self {
            target,
            letterbox,
            policy,
            state: SamplerState::Idle,
            interval: Duration::ZERO,
            next_tick_at: None,
            max_samples: 0,
            slots_used: 0,
            sampled: 0,
            skipped: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.target_size(),
            config.letterbox,
            config.skipped_tick_policy,
        )
    }

    /// Starts sampling, discarding the counters of any previous run.
    ///
    /// The first tick is due at `first_tick_at`, then one every `interval`.
    pub fn start(&mut self, first_tick_at: Instant, interval: Duration, max_samples: usize) {
        self.interval = interval;
        self.max_samples = max_samples;
        self.slots_used = 0;
        self.sampled = 0;
        self.skipped = 0;
        self.state = SamplerState::Running;
        self.next_tick_at = Some(first_tick_at);
        tracing::info!(
            ?interval,
            max_samples,
            policy = %self.policy,
            "sampling started"
        );
        self.finish_if_done();
    }

    /// Cancels a running sampler. Entries already sampled are kept.
    pub fn stop(&mut self) {
        if self.state.is_running() {
            self.state = SamplerState::Stopped;
            self.next_tick_at = None;
            tracing::info!(sampled = self.sampled, "sampling stopped");
        }
    }

    #[must_use]
    pub fn state(&self) -> SamplerState {
        self.state
    }

    #[must_use]
    pub fn policy(&self) -> SkippedTickPolicy {
        self.policy
    }

    #[must_use]
    pub fn next_tick_at(&self) -> Option<Instant> {
        self.next_tick_at
    }

    #[must_use]
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Number of frames appended in the current run.
    #[must_use]
    pub fn sampled(&self) -> usize {
        self.sampled
    }

    /// Number of ticks skipped in the current run.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.max_samples.saturating_sub(self.slots_used)
    }

    /// Runs a tick if one is due at `now`.
    ///
    /// At most one tick runs per call. If the host fell behind by more than one
    /// interval, the missed ticks are dropped rather than run back to back.
    pub fn poll<S>(
        &mut self,
        now: Instant,
        source: &mut S,
        direction: &SharedDirection,
        buffer: &mut ReplayBuffer,
        display: &mut dyn DisplaySink,
    ) -> TickOutcome
    where
        S: CaptureSource + ?Sized,
    {
        let Some(due) = self.next_tick_at.filter(|_| self.state.is_running()) else {
            return TickOutcome::Inactive;
        };
        if now < due {
            return TickOutcome::NotDue;
        }

        let outcome = self.tick(source, direction, buffer, display);

        self.next_tick_at = self.state.is_running().then(|| {
            let next = due + self.interval;
            if next <= now { now + self.interval } else { next }
        });
        outcome
    }

    /// Runs one tick immediately, regardless of the schedule.
    pub fn tick<S>(
        &mut self,
        source: &mut S,
        direction: &SharedDirection,
        buffer: &mut ReplayBuffer,
        display: &mut dyn DisplaySink,
    ) -> TickOutcome
    where
        S: CaptureSource + ?Sized,
    {
        if !self.state.is_running() {
            return TickOutcome::Inactive;
        }

        let capture = match source.request_capture() {
            Ok(capture) => capture,
            Err(err) => {
                self.skipped += 1;
                if self.policy == SkippedTickPolicy::Consume {
                    self.slots_used += 1;
                }
                tracing::warn!(
                    %err,
                    sampled = self.sampled,
                    remaining = self.remaining(),
                    "sampling tick skipped"
                );
                self.finish_if_done();
                return TickOutcome::Skipped;
            }
        };

        let frame = Frame::normalize(&capture, self.target, self.letterbox);
        let label = direction.snapshot().encode();
        display.show_frame(&frame);
        let index = buffer.push(ReplayEntry::new(frame, label));
        self.sampled += 1;
        self.slots_used += 1;
        tracing::debug!(index, label = ?label.values(), "frame sampled");

        self.finish_if_done();
        TickOutcome::Sampled { index }
    }

    fn finish_if_done(&mut self) {
        if self.state.is_running() && self.slots_used >= self.max_samples {
            self.state = SamplerState::Finished;
            self.next_tick_at = None;
            tracing::info!(
                sampled = self.sampled,
                skipped = self.skipped,
                "sampling finished"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Direction, DirectionState, NoDisplay,
        test_util::{RecordingDisplay, ScriptedSource},
    };

    const TARGET: TargetSize = TargetSize::new(4, 4);
    const INTERVAL: Duration = Duration::from_millis(250);

    fn sampler(policy: SkippedTickPolicy) -> Sampler {
        Sampler::new(TARGET, false, policy)
    }

    fn marker(buffer: &ReplayBuffer, index: usize) -> u8 {
        buffer.get(index).unwrap().frame().image().get_pixel(0, 0)[0]
    }

    #[test]
    fn test_idle_sampler_does_nothing() {
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        let mut source = ScriptedSource::new(vec![Some(1)]);
        let mut buffer = ReplayBuffer::new();
        let outcome = sampler.poll(
            Instant::now(),
            &mut source,
            &SharedDirection::new(),
            &mut buffer,
            &mut NoDisplay,
        );
        assert_eq!(outcome, TickOutcome::Inactive);
        assert!(sampler.state().is_idle());
        assert_eq!(source.requests(), 0);
    }

    #[test]
    fn test_ticks_follow_schedule() {
        let start = Instant::now();
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        let mut source = ScriptedSource::new(vec![Some(10), Some(20), Some(30)]);
        let direction = SharedDirection::new();
        let mut buffer = ReplayBuffer::new();

        sampler.start(start + Duration::from_secs(1), INTERVAL, 3);
        let mut poll = |sampler: &mut Sampler, at: Duration| {
            sampler.poll(start + at, &mut source, &direction, &mut buffer, &mut NoDisplay)
        };

        assert_eq!(poll(&mut sampler, Duration::from_millis(999)), TickOutcome::NotDue);
        assert_eq!(
            poll(&mut sampler, Duration::from_millis(1000)),
            TickOutcome::Sampled { index: 0 }
        );
        assert_eq!(
            sampler.next_tick_at(),
            Some(start + Duration::from_millis(1250))
        );
        assert_eq!(poll(&mut sampler, Duration::from_millis(1100)), TickOutcome::NotDue);
        assert_eq!(
            poll(&mut sampler, Duration::from_millis(1260)),
            TickOutcome::Sampled { index: 1 }
        );
        // next slot stays aligned to the schedule, not to the late poll
        assert_eq!(
            sampler.next_tick_at(),
            Some(start + Duration::from_millis(1500))
        );
        assert_eq!(
            poll(&mut sampler, Duration::from_millis(1500)),
            TickOutcome::Sampled { index: 2 }
        );

        assert!(sampler.state().is_finished());
        assert_eq!(sampler.next_tick_at(), None);
        assert_eq!(poll(&mut sampler, Duration::from_secs(10)), TickOutcome::Inactive);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_late_poll_runs_one_tick() {
        let start = Instant::now();
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        let mut source = ScriptedSource::new(vec![Some(1); 10]);
        let direction = SharedDirection::new();
        let mut buffer = ReplayBuffer::new();

        sampler.start(start, INTERVAL, 10);
        let late = start + Duration::from_secs(5);
        let outcome = sampler.poll(late, &mut source, &direction, &mut buffer, &mut NoDisplay);
        assert!(outcome.is_sampled());
        assert_eq!(buffer.len(), 1);
        assert_eq!(sampler.next_tick_at(), Some(late + INTERVAL));
    }

    #[test]
    fn test_entries_keep_capture_order_and_labels() {
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        let mut source = ScriptedSource::new(vec![Some(10), Some(20), Some(30), Some(40)]);
        let direction = SharedDirection::new();
        let mut buffer = ReplayBuffer::new();
        sampler.start(Instant::now(), INTERVAL, 4);

        let held = [
            vec![],
            vec![Direction::Up],
            vec![Direction::Up, Direction::Right],
            vec![Direction::Left],
        ];
        for keys in &held {
            direction.release_all();
            for key in keys {
                direction.press(*key);
            }
            sampler.tick(&mut source, &direction, &mut buffer, &mut NoDisplay);
        }

        assert_eq!(buffer.len(), 4);
        for (i, (entry, keys)) in buffer.iter().zip(&held).enumerate() {
            assert_eq!(entry.frame().size(), TARGET);
            assert_eq!(entry.direction(), DirectionState::from_held(keys.iter().copied()));
            let expected = u8::try_from((i + 1) * 10).unwrap();
            assert!(marker(&buffer, i).abs_diff(expected) <= 1);
        }
    }

    #[test]
    fn test_retry_policy_does_not_consume_slots() {
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        let mut source = ScriptedSource::new(vec![None, Some(10), None, Some(20), Some(30)]);
        let direction = SharedDirection::new();
        let mut buffer = ReplayBuffer::new();
        sampler.start(Instant::now(), INTERVAL, 3);

        let outcomes = (0..6)
            .map(|_| sampler.tick(&mut source, &direction, &mut buffer, &mut NoDisplay))
            .collect::<Vec<_>>();
        assert_eq!(
            outcomes,
            [
                TickOutcome::Skipped,
                TickOutcome::Sampled { index: 0 },
                TickOutcome::Skipped,
                TickOutcome::Sampled { index: 1 },
                TickOutcome::Sampled { index: 2 },
                TickOutcome::Inactive,
            ]
        );
        assert_eq!(sampler.sampled(), 3);
        assert_eq!(sampler.skipped(), 2);
        assert_eq!(source.requests(), 5);
        assert!(sampler.state().is_finished());
    }

    #[test]
    fn test_consume_policy_counts_skipped_ticks() {
        let mut sampler = sampler(SkippedTickPolicy::Consume);
        let mut source = ScriptedSource::new(vec![None, Some(10), None, Some(20)]);
        let direction = SharedDirection::new();
        let mut buffer = ReplayBuffer::new();
        sampler.start(Instant::now(), INTERVAL, 3);

        for _ in 0..4 {
            sampler.tick(&mut source, &direction, &mut buffer, &mut NoDisplay);
        }
        assert!(sampler.state().is_finished());
        assert_eq!(buffer.len(), 1);
        assert_eq!(sampler.skipped(), 2);
        assert_eq!(sampler.remaining(), 0);
        assert_eq!(source.requests(), 3);
    }

    #[test]
    fn test_stop_cancels_sampling() {
        let start = Instant::now();
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        let mut source = ScriptedSource::new(vec![Some(1); 5]);
        let direction = SharedDirection::new();
        let mut buffer = ReplayBuffer::new();
        sampler.start(start, INTERVAL, 5);

        sampler.poll(start, &mut source, &direction, &mut buffer, &mut NoDisplay);
        sampler.stop();
        assert!(sampler.state().is_stopped());
        assert_eq!(sampler.next_tick_at(), None);
        let outcome = sampler.poll(
            start + INTERVAL,
            &mut source,
            &direction,
            &mut buffer,
            &mut NoDisplay,
        );
        assert_eq!(outcome, TickOutcome::Inactive);
        assert_eq!(buffer.len(), 1);

        // restarting begins a fresh run and keeps appending
        sampler.start(start, INTERVAL, 1);
        sampler.poll(start, &mut source, &direction, &mut buffer, &mut NoDisplay);
        assert_eq!(sampler.sampled(), 1);
        assert_eq!(buffer.len(), 2);
        assert!(sampler.state().is_finished());
    }

    #[test]
    fn test_zero_samples_finishes_immediately() {
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        sampler.start(Instant::now(), INTERVAL, 0);
        assert!(sampler.state().is_finished());
        assert_eq!(sampler.next_tick_at(), None);
    }

    #[test]
    fn test_sampled_frames_are_displayed() {
        let mut sampler = sampler(SkippedTickPolicy::Retry);
        let mut source = ScriptedSource::new(vec![None, Some(5)]);
        let mut display = RecordingDisplay::default();
        let mut buffer = ReplayBuffer::new();
        sampler.start(Instant::now(), INTERVAL, 1);

        sampler.tick(&mut source, &SharedDirection::new(), &mut buffer, &mut display);
        assert!(display.frames.is_empty());
        sampler.tick(&mut source, &SharedDirection::new(), &mut buffer, &mut display);
        assert_eq!(display.frames.len(), 1);
        assert_eq!(&display.frames[0], buffer.get(0).unwrap().frame());
        assert!(display.predictions.is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("retry".parse::<SkippedTickPolicy>().unwrap(), SkippedTickPolicy::Retry);
        assert_eq!(
            "Consume".parse::<SkippedTickPolicy>().unwrap(),
            SkippedTickPolicy::Consume
        );
    }
}
