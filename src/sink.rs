use crate::error::SinkError;
use crate::session::{PaginationSession, SessionStatus};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::warn;

/// Append-only measurement file shared by every run of the tool.
#[derive(Debug, Clone)]
pub struct MeasurementLog {
    path: PathBuf,
    with_latency: bool,
}

impl MeasurementLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            with_latency: false,
        }
    }

    /// Also record the mean per-call response time as a third field.
    pub fn with_latency(mut self, enabled: bool) -> Self {
        self.with_latency = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `elapsedSeconds,callCount[,avgResponseSeconds]`, without newline.
    pub fn line(&self, session: &PaginationSession) -> String {
        let mut line = format!("{},{}", seconds(session.elapsed()), session.calls());
        if self.with_latency {
            line.push_str(&format!(",{}", seconds(session.average_response_time())));
        }
        line
    }

    pub fn append(&self, session: &PaginationSession) -> Result<(), SinkError> {
        let to_error = |source| SinkError::Measurement {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;
        writeln!(file, "{}", self.line(session)).map_err(to_error)
    }
}

/// Millisecond precision, printed as fractional seconds.
fn seconds(duration: Duration) -> f64 {
    duration.as_millis() as f64 / 1000.0
}

/// Reports a finished session: bindings, diagnostics and measurements.
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    measurement: Option<MeasurementLog>,
    started: Option<Instant>,
}

impl ResultSink {
    pub fn new(measurement: Option<MeasurementLog>) -> Self {
        Self {
            measurement,
            started: None,
        }
    }

    /// Measure elapsed time from `started` up to the end of output, instead
    /// of the session's own fetch loop.
    pub fn measured_from(mut self, started: Instant) -> Self {
        self.started = Some(started);
        self
    }

    /// A sink that records no measurement.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn measurement(&self) -> Option<&MeasurementLog> {
        self.measurement.as_ref()
    }

    /// Write one JSON object per binding to `out`, keys sorted.
    ///
    /// A failed session still has its bindings written; the failure goes to
    /// `diagnostics`. The measurement line is appended even when writing the
    /// output fails, and the first error is returned.
    pub fn emit<W: Write, D: Write>(
        &self,
        mut session: PaginationSession,
        out: &mut W,
        diagnostics: &mut D,
    ) -> Result<(), SinkError> {
        let reported = report_status(&session, diagnostics);
        let written = reported.and(write_bindings(&session, out));

        if let Some(started) = self.started {
            session.set_elapsed(started.elapsed());
        }
        let measured = match &self.measurement {
            Some(log) => log.append(&session),
            None => Ok(()),
        };
        written.and(measured)
    }
}

fn report_status<D: Write>(session: &PaginationSession, diagnostics: &mut D) -> Result<(), SinkError> {
    match session.status() {
        SessionStatus::Failed(error) => writeln!(diagnostics, "Error: {error}")?,
        SessionStatus::TimedOut => warn!(
            rows = session.bindings().len(),
            "session timed out, emitting partial results"
        ),
        SessionStatus::Done | SessionStatus::Running => {}
    }
    Ok(())
}

fn write_bindings<W: Write>(session: &PaginationSession, out: &mut W) -> Result<(), SinkError> {
    for binding in session.bindings() {
        serde_json::to_writer(&mut *out, binding)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
