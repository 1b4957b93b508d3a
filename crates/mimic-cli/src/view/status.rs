use mimic_pipeline::{
    Direction, DirectionScores, DirectionState, ReplayBuffer, Sampler, SamplerState,
    TrainingReport,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::{schema::model_file::ModelFile, view::ViewMode};

/// Side panel with sampling, training and prediction state.
#[derive(Debug)]
pub struct StatusPanel<'a> {
    pub sampler: &'a Sampler,
    pub buffer: &'a ReplayBuffer,
    pub held: DirectionState,
    pub coins: usize,
    pub model: &'a ModelFile,
    pub last_training: Option<&'a TrainingReport>,
    pub prediction: Option<&'a DirectionScores>,
    pub mode: ViewMode,
    pub message: &'a str,
}

const LABEL: Style = Style::new().fg(Color::DarkGray);
const HEADING: Style = Style::new().add_modifier(Modifier::BOLD);

fn field<'a>(label: &'static str, value: impl Into<String>) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:>10} "), LABEL),
        Span::raw(value.into()),
    ])
}

fn held_keys(state: DirectionState) -> String {
    if state.is_idle() {
        return "-".to_owned();
    }
    state
        .held()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn sampler_state(sampler: &Sampler) -> String {
    match sampler.state() {
        SamplerState::Idle => "idle".to_owned(),
        SamplerState::Running => format!(
            "running ({}/{})",
            sampler.max_samples() - sampler.remaining(),
            sampler.max_samples()
        ),
        SamplerState::Finished => "finished".to_owned(),
        SamplerState::Stopped => "stopped".to_owned(),
    }
}

impl StatusPanel<'_> {
    fn lines(&self) -> Vec<Line<'_>> {
        let counts = self.buffer.direction_counts();
        let mut lines = vec![
            Line::styled("Sampling", HEADING),
            field("state", sampler_state(self.sampler)),
            field("buffer", self.buffer.len().to_string()),
            field(
                "labels",
                Direction::ALL
                    .iter()
                    .map(|d| format!("{d}:{}", counts[d.index()]))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            field("skipped", self.sampler.skipped().to_string()),
            field("held", held_keys(self.held)),
            field("coins", self.coins.to_string()),
            field("view", self.mode.to_string()),
            Line::default(),
            Line::styled("Model", HEADING),
            field("name", self.model.name.clone()),
            field("steps", self.model.steps.to_string()),
        ];

        if let Some(report) = self.last_training {
            let fmt = |v: Option<f32>| v.map_or_else(|| "-".to_owned(), |v| format!("{v:.4}"));
            lines.push(field("last run", format!("{} steps", report.len())));
            lines.push(field("mean loss", fmt(report.mean_loss())));
            lines.push(field("final loss", fmt(report.final_loss())));
            lines.push(field("accuracy", fmt(report.mean_accuracy())));
        }

        lines.push(Line::default());
        lines.push(Line::styled("Prediction", HEADING));
        match self.prediction {
            Some(scores) => {
                let best = scores.argmax();
                for direction in Direction::ALL {
                    let style = if direction == best {
                        Style::new().fg(Color::Yellow)
                    } else {
                        Style::new()
                    };
                    lines.push(Line::from(vec![
                        Span::styled(format!("{:>10} ", direction.to_string()), LABEL),
                        Span::styled(format!("{:.3}", scores.score(direction)), style),
                    ]));
                }
            }
            None => lines.push(field("", "press E to evaluate")),
        }

        if !self.message.is_empty() {
            lines.push(Line::default());
            lines.push(Line::raw(self.message));
        }
        lines
    }
}

impl Widget for StatusPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(Block::bordered().title("Status"))
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
