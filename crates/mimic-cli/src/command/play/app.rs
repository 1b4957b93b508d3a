use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use mimic_arena::Arena;
use mimic_pipeline::{
    CaptureSource as _, InferenceStep, ReplayBuffer, Sampler, SharedDirection, TrainingLoop,
    TrainingReport,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
    widgets::Block,
};
use ratatui_runtime::{App, RenderMode, Runtime};

use crate::{
    command::play::{
        capture::FrameCapture,
        input::{HOLD_TIMEOUT, HeldKeys, key_direction},
    },
    schema::{config::AppConfig, model_file::ModelFile},
    view::{FramebufferDisplay, PipelineView, StatusPanel, ViewMode},
};

const FPS: f64 = 30.0;

#[derive(Debug)]
pub struct PlayApp {
    arena: Arena,
    config: AppConfig,
    model: ModelFile,
    direction: SharedDirection,
    held: HeldKeys,
    capture: FrameCapture,
    sampler: Sampler,
    buffer: ReplayBuffer,
    training: TrainingLoop,
    inference: InferenceStep,
    view: PipelineView,
    last_training: Option<TrainingReport>,
    message: String,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(arena: Arena, config: AppConfig, model: ModelFile) -> Self {
        Self {
            arena,
            direction: SharedDirection::new(),
            held: HeldKeys::new(Some(HOLD_TIMEOUT)),
            capture: FrameCapture::default(),
            sampler: Sampler::from_config(&config.pipeline),
            buffer: ReplayBuffer::new(),
            training: TrainingLoop::from_config(&config.pipeline),
            inference: InferenceStep::from_config(&config.pipeline),
            view: PipelineView::default(),
            last_training: None,
            message: String::new(),
            is_exiting: false,
            config,
            model,
        }
    }

    pub fn into_parts(self) -> (AppConfig, ModelFile, ReplayBuffer) {
        (self.config, self.model, self.buffer)
    }

    fn start_sampling(&mut self, runtime: &mut Runtime, now: Instant) {
        let pipeline = &self.config.pipeline;
        self.sampler.start(
            now + pipeline.start_delay(),
            pipeline.sample_interval(),
            pipeline.max_samples,
        );
        runtime.clear_wakeups();
        if let Some(at) = self.sampler.next_tick_at() {
            runtime.wake_at(at);
        }
    }

    fn train(&mut self) {
        if self.sampler.state().is_running() {
            self.message = "Sampling in progress, train once it finishes".to_owned();
            return;
        }
        match self
            .training
            .run(&mut self.model.classifier, &self.buffer, |_| {})
        {
            Ok(report) => {
                self.model.record_training(&report);
                self.message = format!(
                    "Trained {} steps, final loss {:.4}",
                    report.len(),
                    report.final_loss().unwrap_or(f32::NAN)
                );
                self.last_training = Some(report);
            }
            Err(err) => {
                tracing::warn!(%err, "training failed");
                self.message = format!("Training failed: {err}");
            }
        }
    }

    fn evaluate(&mut self) {
        let capture = match self.capture.request_capture() {
            Ok(capture) => capture,
            Err(err) => {
                self.message = err.to_string();
                return;
            }
        };
        match self
            .inference
            .predict_with_display(&self.model.classifier, &capture, &mut self.view)
        {
            Ok(scores) => {
                self.message = format!("Predicted {}", scores.argmax());
            }
            Err(err) => {
                tracing::warn!(%err, "evaluation failed");
                self.message = format!("Evaluation failed: {err}");
            }
        }
    }

    fn handle_key(&mut self, runtime: &mut Runtime, key: KeyEvent) {
        let now = Instant::now();
        if let Some(direction) = key_direction(key.code) {
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    self.direction.press(direction);
                    self.held.press(direction, now);
                    if self.arena.try_move(direction).is_ok() {
                        self.capture.invalidate();
                    }
                }
                KeyEventKind::Release => {
                    self.direction.release(direction);
                    self.held.release(direction);
                }
            }
            return;
        }

        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('t' | 'T') => self.train(),
            KeyCode::Char('e' | 'E') => self.evaluate(),
            KeyCode::Char('m' | 'M') => self.view.mode = self.view.mode.toggled(),
            KeyCode::Char('r' | 'R') => {
                self.buffer = ReplayBuffer::new();
                self.start_sampling(runtime, now);
                self.message = "Sampling restarted".to_owned();
            }
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => self.is_exiting = true,
            _ => {}
        }
    }

    fn help_text(&self) -> &'static str {
        if self.sampler.state().is_running() {
            "Arrows (Move) | E (Evaluate) | M (View) | R (Restart) | Q (Quit)"
        } else {
            "Arrows (Move) | T (Train) | E (Evaluate) | M (View) | R (Restart) | Q (Quit)"
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(FPS));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FPS));
        if runtime.key_release_events() {
            self.held = HeldKeys::new(None);
        }
        self.start_sampling(runtime, Instant::now());
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(runtime, key),
            Event::FocusLost => {
                self.direction.release_all();
                self.held.release_all();
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        let [view_area, status_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(34)]).areas(main_area);

        let title = format!("View ({})", self.view.mode);
        let image = match self.view.mode {
            ViewMode::Human => self.capture.latest(),
            ViewMode::Machine => self.view.last_frame.as_ref().map(|f| f.image()),
        };
        match image {
            Some(image) => frame.render_widget(
                FramebufferDisplay::new(image).block(Block::bordered().title(title)),
                view_area,
            ),
            None => frame.render_widget(Block::bordered().title(title), view_area),
        }

        frame.render_widget(
            StatusPanel {
                sampler: &self.sampler,
                buffer: &self.buffer,
                held: self.direction.snapshot(),
                coins: self.arena.coins_collected(),
                model: &self.model,
                last_training: self.last_training.as_ref(),
                prediction: self.view.last_prediction.as_ref(),
                mode: self.view.mode,
                message: &self.message,
            },
            status_area,
        );

        let help = Text::from(self.help_text())
            .style(Style::default().fg(Color::DarkGray))
            .centered();
        frame.render_widget(help, help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        for direction in self.held.expire(Instant::now()) {
            self.direction.release(direction);
        }
        self.capture.refresh(&self.arena);
    }

    fn wake(&mut self, runtime: &mut Runtime, _deadline: Instant) {
        self.sampler.poll(
            Instant::now(),
            &mut self.capture,
            &self.direction,
            &mut self.buffer,
            &mut self.view,
        );
        if let Some(at) = self.sampler.next_tick_at() {
            runtime.wake_at(at);
        }
    }
}
