use crate::expr::{validate, Expr, ValidationResult};
use crate::sample::{sample, SampleGrid, SampleSeries};
use std::time::{Duration, Instant};
use tracing::debug;

/// The quiet period between the last edit and resampling.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Feedback for the expression input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// The expression compiled; nothing to report
    Ok,
    /// There is no input yet
    EnterExpression,
    /// The input was rejected
    InvalidExpression,
}

impl Feedback {
    /// The message to show under the input field
    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "",
            Self::EnterExpression => "Enter an expression",
            Self::InvalidExpression => "This expression is invalid",
        }
    }

    /// Whether the message gets error styling. Missing input is
    /// informational, not an error.
    pub fn is_error(self) -> bool {
        self == Self::InvalidExpression
    }
}

struct PendingSample {
    expr: Expr,
    due: Instant,
}

/// Debounced expression-to-series pipeline.
///
/// The pipeline owns the grid, the last rendered series and at most one
/// pending sampling job. Validation runs synchronously on every edit, but
/// the expensive sampling pass only runs once the input has been quiet for
/// the debounce period. Cancellation is replacement: scheduling a new job
/// drops the previous one, so a superseded edit can never render.
///
/// The caller supplies the clock, which keeps the pipeline free of timers
/// and deterministic under test:
///
/// ```
/// use plotcalc::{Feedback, GraphPipeline, DEBOUNCE};
/// use std::time::Instant;
///
/// let mut pipeline = GraphPipeline::default();
/// let now = Instant::now();
///
/// assert_eq!(pipeline.edit("x*x", now), Feedback::Ok);
/// assert!(pipeline.poll(now).is_none());
/// assert!(pipeline.poll(now + DEBOUNCE).is_some());
/// ```
pub struct GraphPipeline {
    grid: SampleGrid,
    debounce: Duration,
    pending: Option<PendingSample>,
    series: Option<SampleSeries>,
}

impl GraphPipeline {
    /// Create a pipeline sampling over `grid` after `debounce` of quiet
    pub fn new(grid: SampleGrid, debounce: Duration) -> Self {
        Self {
            grid,
            debounce,
            pending: None,
            series: None,
        }
    }

    /// Handle an edit of the expression input.
    ///
    /// The raw string is validated immediately and the feedback reflects
    /// the outcome. Empty input clears the rendered series; invalid input
    /// leaves it alone; valid input schedules a sampling job due after the
    /// quiet period, replacing any pending one.
    pub fn edit(&mut self, raw: &str, now: Instant) -> Feedback {
        self.pending = None;
        match validate(raw) {
            ValidationResult::Empty => {
                self.series = None;
                Feedback::EnterExpression
            }
            ValidationResult::Invalid(_) => Feedback::InvalidExpression,
            ValidationResult::Valid(expr) => {
                debug!("expression accepted, sampling after {:?}", self.debounce);
                self.pending = Some(PendingSample {
                    expr,
                    due: now + self.debounce,
                });
                Feedback::Ok
            }
        }
    }

    /// Run the pending sampling job if its quiet period has elapsed.
    ///
    /// Returns the freshly rendered series, or `None` when there is
    /// nothing due yet.
    pub fn poll(&mut self, now: Instant) -> Option<&SampleSeries> {
        match self.pending.take() {
            Some(pending) if now >= pending.due => {
                self.series = Some(sample(&pending.expr, &self.grid));
                self.series.as_ref()
            }
            pending => {
                self.pending = pending;
                None
            }
        }
    }

    /// The last rendered series, if any
    pub fn series(&self) -> Option<&SampleSeries> {
        self.series.as_ref()
    }

    /// Check if a sampling job is waiting for its quiet period
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for GraphPipeline {
    fn default() -> Self {
        Self::new(SampleGrid::default(), DEBOUNCE)
    }
}
