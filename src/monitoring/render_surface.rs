use crate::error::RenderError;
use crate::monitoring::log_buffer::LogBuffer;
use crate::monitoring::metrics::MetricsReport;
use crate::shared_data::{Direction, LightMap, LightPhase, LogEntry, SimTime};
use crate::simulation_engine::emergency::EmergencyVehicle;
use crate::simulation_engine::vehicles::Vehicle;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A time series fed by the metrics tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartSeries {
    QueueLength(Direction),
    Delay(Direction),
}

impl fmt::Display for ChartSeries {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChartSeries::QueueLength(d) => write!(f, "Queue Length {}", d),
            ChartSeries::Delay(d) => write!(f, "Delay {}", d),
        }
    }
}

/// Receives plain simulation data and draws it somewhere. Owns no simulation logic.
///
/// Every call may fail; the simulation logs the failure and carries on.
pub trait RenderSurface {
    fn render_lights(&mut self, _lights: &LightMap) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_vehicles(&mut self, _vehicles: &[Vehicle]) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_emergency_list(&mut self, _active: &[EmergencyVehicle]) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_metrics(&mut self, _metrics: &MetricsReport) -> Result<(), RenderError> {
        Ok(())
    }

    fn append_log_entry(&mut self, _entry: &LogEntry) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_log_history(&mut self, _history: &LogBuffer) -> Result<(), RenderError> {
        Ok(())
    }

    fn push_chart_sample(&mut self, _series: ChartSeries, _value: f64) -> Result<(), RenderError> {
        Ok(())
    }

    /// Writes any chart images this surface keeps and returns their paths.
    fn export_charts(&mut self) -> Result<Vec<PathBuf>, RenderError> {
        Ok(Vec::new())
    }
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn render_lights(&mut self, lights: &LightMap) -> Result<(), RenderError> {
        (**self).render_lights(lights)
    }
    fn render_vehicles(&mut self, vehicles: &[Vehicle]) -> Result<(), RenderError> {
        (**self).render_vehicles(vehicles)
    }
    fn render_emergency_list(&mut self, active: &[EmergencyVehicle]) -> Result<(), RenderError> {
        (**self).render_emergency_list(active)
    }
    fn render_metrics(&mut self, metrics: &MetricsReport) -> Result<(), RenderError> {
        (**self).render_metrics(metrics)
    }
    fn append_log_entry(&mut self, entry: &LogEntry) -> Result<(), RenderError> {
        (**self).append_log_entry(entry)
    }
    fn render_log_history(&mut self, history: &LogBuffer) -> Result<(), RenderError> {
        (**self).render_log_history(history)
    }
    fn push_chart_sample(&mut self, series: ChartSeries, value: f64) -> Result<(), RenderError> {
        (**self).push_chart_sample(series, value)
    }
    fn export_charts(&mut self) -> Result<Vec<PathBuf>, RenderError> {
        (**self).export_charts()
    }
}

fn phase_symbol(phase: LightPhase) -> char {
    match phase {
        LightPhase::Red => 'R',
        LightPhase::Yellow => 'Y',
        LightPhase::Green => 'G',
    }
}

/// Dashboard rendered through the `log` facade.
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl RenderSurface for ConsoleSurface {
    fn render_lights(&mut self, lights: &LightMap) -> Result<(), RenderError> {
        info!(
            "Lights N:{} S:{} E:{} W:{}",
            phase_symbol(lights.north),
            phase_symbol(lights.south),
            phase_symbol(lights.east),
            phase_symbol(lights.west)
        );
        Ok(())
    }

    fn render_vehicles(&mut self, vehicles: &[Vehicle]) -> Result<(), RenderError> {
        for vehicle in vehicles {
            trace!(
                "{} {} at {:.3}{}",
                vehicle.id,
                vehicle.direction,
                vehicle.position,
                if vehicle.is_emergency { " (beacon)" } else { "" }
            );
        }
        Ok(())
    }

    fn render_emergency_list(&mut self, active: &[EmergencyVehicle]) -> Result<(), RenderError> {
        if active.is_empty() {
            info!("No emergency vehicles active");
            return Ok(());
        }
        for ev in active {
            info!(
                "{} {} {} ETA: {}s [{}]",
                ev.id, ev.kind, ev.location, ev.eta_secs, ev.status
            );
        }
        Ok(())
    }

    fn render_metrics(&mut self, metrics: &MetricsReport) -> Result<(), RenderError> {
        info!(
            "Vehicles: {} | Emergency active: {} | Avg wait: {:.1}s",
            metrics.total_vehicles, metrics.emergency_active, metrics.avg_wait_time
        );
        Ok(())
    }

    fn append_log_entry(&mut self, entry: &LogEntry) -> Result<(), RenderError> {
        info!("[{}] {} {}", entry.time, entry.severity, entry.message);
        Ok(())
    }

    fn render_log_history(&mut self, history: &LogBuffer) -> Result<(), RenderError> {
        debug!("Log history holds {} entries", history.len());
        Ok(())
    }
}

/// One render call as a serialisable event.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RenderEvent<'a> {
    Lights { lights: LightMap },
    Vehicles { vehicles: &'a [Vehicle] },
    EmergencyList { active: &'a [EmergencyVehicle] },
    Metrics { metrics: &'a MetricsReport },
    LogEntry { entry: &'a LogEntry },
    LogHistory { entries: Vec<&'a LogEntry> },
    ChartSample { series: ChartSeries, value: f64 },
}

/// Event-stream surface: one JSON object per line.
pub struct JsonEventSurface<W: Write> {
    writer: W,
}

impl<W: Write> JsonEventSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, event: &RenderEvent) -> Result<(), RenderError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> RenderSurface for JsonEventSurface<W> {
    fn render_lights(&mut self, lights: &LightMap) -> Result<(), RenderError> {
        self.emit(&RenderEvent::Lights { lights: *lights })
    }

    fn render_vehicles(&mut self, vehicles: &[Vehicle]) -> Result<(), RenderError> {
        self.emit(&RenderEvent::Vehicles { vehicles })
    }

    fn render_emergency_list(&mut self, active: &[EmergencyVehicle]) -> Result<(), RenderError> {
        self.emit(&RenderEvent::EmergencyList { active })
    }

    fn render_metrics(&mut self, metrics: &MetricsReport) -> Result<(), RenderError> {
        self.emit(&RenderEvent::Metrics { metrics })
    }

    fn append_log_entry(&mut self, entry: &LogEntry) -> Result<(), RenderError> {
        self.emit(&RenderEvent::LogEntry { entry })
    }

    fn render_log_history(&mut self, history: &LogBuffer) -> Result<(), RenderError> {
        self.emit(&RenderEvent::LogHistory {
            entries: history.iter().collect(),
        })
    }

    fn push_chart_sample(&mut self, series: ChartSeries, value: f64) -> Result<(), RenderError> {
        self.emit(&RenderEvent::ChartSample { series, value })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogFeedRecord {
    pub time: String,
    pub severity: String,
    pub message: String,
}

impl From<&LogEntry> for LogFeedRecord {
    fn from(entry: &LogEntry) -> Self {
        Self {
            time: entry.time.to_string(),
            severity: entry.severity.to_string(),
            message: entry.message.clone(),
        }
    }
}

/// Appends each log-feed entry as a CSV row.
pub struct CsvLogSurface<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvLogSurface<W> {
    pub fn new(writer: W, write_headers: bool) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(write_headers)
            .from_writer(writer);
        Self { writer }
    }

    pub fn into_inner(self) -> Result<W, RenderError> {
        self.writer
            .into_inner()
            .map_err(|e| RenderError::Io(std::io::Error::other(e.to_string())))
    }
}

impl CsvLogSurface<std::fs::File> {
    /// Opens `path` for appending; the header row is only written for a new file.
    pub fn append_to(path: &Path) -> Result<Self, RenderError> {
        let file_exists = path.exists();
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self::new(file, !file_exists))
    }
}

impl<W: Write> RenderSurface for CsvLogSurface<W> {
    fn append_log_entry(&mut self, entry: &LogEntry) -> Result<(), RenderError> {
        self.writer.serialize(LogFeedRecord::from(entry))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Forwards every call to each inner surface. One failing surface does not stop the
/// others; the first error is returned.
#[derive(Default)]
pub struct FanoutSurface {
    surfaces: Vec<Box<dyn RenderSurface + Send>>,
}

impl FanoutSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, surface: impl RenderSurface + Send + 'static) -> Self {
        self.surfaces.push(Box::new(surface));
        self
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    fn each<F>(&mut self, mut call: F) -> Result<(), RenderError>
    where
        F: FnMut(&mut (dyn RenderSurface + Send)) -> Result<(), RenderError>,
    {
        let mut first_error = None;
        for surface in self.surfaces.iter_mut() {
            if let Err(e) = call(surface.as_mut()) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl RenderSurface for FanoutSurface {
    fn render_lights(&mut self, lights: &LightMap) -> Result<(), RenderError> {
        self.each(|s| s.render_lights(lights))
    }

    fn render_vehicles(&mut self, vehicles: &[Vehicle]) -> Result<(), RenderError> {
        self.each(|s| s.render_vehicles(vehicles))
    }

    fn render_emergency_list(&mut self, active: &[EmergencyVehicle]) -> Result<(), RenderError> {
        self.each(|s| s.render_emergency_list(active))
    }

    fn render_metrics(&mut self, metrics: &MetricsReport) -> Result<(), RenderError> {
        self.each(|s| s.render_metrics(metrics))
    }

    fn append_log_entry(&mut self, entry: &LogEntry) -> Result<(), RenderError> {
        self.each(|s| s.append_log_entry(entry))
    }

    fn render_log_history(&mut self, history: &LogBuffer) -> Result<(), RenderError> {
        self.each(|s| s.render_log_history(history))
    }

    fn push_chart_sample(&mut self, series: ChartSeries, value: f64) -> Result<(), RenderError> {
        self.each(|s| s.push_chart_sample(series, value))
    }

    fn export_charts(&mut self) -> Result<Vec<PathBuf>, RenderError> {
        let mut paths = Vec::new();
        self.each(|s| {
            paths.extend(s.export_charts()?);
            Ok(())
        })?;
        Ok(paths)
    }
}

/// An owned copy of one render call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Lights(LightMap),
    Vehicles(Vec<Vehicle>),
    EmergencyList(Vec<EmergencyVehicle>),
    Metrics(MetricsReport),
    LogEntry(LogEntry),
    LogHistory(Vec<LogEntry>),
    ChartSample(ChartSeries, f64),
}

/// Keeps every call in memory. A detached recorder reports its target as missing
/// instead.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<RenderCall>,
    detached: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detached() -> Self {
        Self {
            calls: Vec::new(),
            detached: true,
        }
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn last_lights(&self) -> Option<LightMap> {
        self.calls.iter().rev().find_map(|call| match call {
            RenderCall::Lights(lights) => Some(*lights),
            _ => None,
        })
    }

    pub fn log_entries(&self) -> Vec<&LogEntry> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::LogEntry(entry) => Some(entry),
                _ => None,
            })
            .collect()
    }

    /// Log entries appended at or after `since`.
    pub fn log_entries_since(&self, since: SimTime) -> Vec<&LogEntry> {
        self.log_entries()
            .into_iter()
            .filter(|entry| entry.time >= since)
            .collect()
    }

    fn record(&mut self, call: RenderCall) -> Result<(), RenderError> {
        if self.detached {
            return Err(RenderError::TargetMissing("recording"));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl RenderSurface for RecordingSurface {
    fn render_lights(&mut self, lights: &LightMap) -> Result<(), RenderError> {
        self.record(RenderCall::Lights(*lights))
    }

    fn render_vehicles(&mut self, vehicles: &[Vehicle]) -> Result<(), RenderError> {
        self.record(RenderCall::Vehicles(vehicles.to_vec()))
    }

    fn render_emergency_list(&mut self, active: &[EmergencyVehicle]) -> Result<(), RenderError> {
        self.record(RenderCall::EmergencyList(active.to_vec()))
    }

    fn render_metrics(&mut self, metrics: &MetricsReport) -> Result<(), RenderError> {
        self.record(RenderCall::Metrics(metrics.clone()))
    }

    fn append_log_entry(&mut self, entry: &LogEntry) -> Result<(), RenderError> {
        self.record(RenderCall::LogEntry(entry.clone()))
    }

    fn render_log_history(&mut self, history: &LogBuffer) -> Result<(), RenderError> {
        self.record(RenderCall::LogHistory(history.to_vec()))
    }

    fn push_chart_sample(&mut self, series: ChartSeries, value: f64) -> Result<(), RenderError> {
        self.record(RenderCall::ChartSample(series, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_data::Severity;

    fn sample_entry() -> LogEntry {
        LogEntry::new(SimTime(65_000), Severity::Warning, "High queue detected on East approach")
    }

    #[test]
    fn json_surface_writes_one_tagged_line_per_call() {
        let mut surface = JsonEventSurface::new(Vec::new());
        surface.append_log_entry(&sample_entry()).unwrap();
        surface
            .push_chart_sample(ChartSeries::QueueLength(Direction::North), 12.0)
            .unwrap();

        let output = String::from_utf8(surface.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "log_entry");
        assert_eq!(first["entry"]["severity"], "WARNING");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "chart_sample");
        assert_eq!(second["value"], 12.0);
    }

    #[test]
    fn csv_surface_formats_clock_time() {
        let mut surface = CsvLogSurface::new(Vec::new(), true);
        surface.append_log_entry(&sample_entry()).unwrap();
        let output = String::from_utf8(surface.into_inner().unwrap()).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("time,severity,message"));
        assert_eq!(
            lines.next(),
            Some("00:01:05,WARNING,High queue detected on East approach")
        );
    }

    #[test]
    fn fanout_keeps_going_past_a_missing_target() {
        let mut fanout = FanoutSurface::new()
            .with(RecordingSurface::detached())
            .with(ConsoleSurface);
        let err = fanout.append_log_entry(&sample_entry()).unwrap_err();
        assert!(matches!(err, RenderError::TargetMissing("recording")));
        assert_eq!(fanout.len(), 2);
    }

    #[test]
    fn recorder_keeps_owned_copies() {
        let mut recorder = RecordingSurface::new();
        let lights = LightMap {
            north: LightPhase::Green,
            south: LightPhase::Green,
            east: LightPhase::Red,
            west: LightPhase::Red,
        };
        recorder.render_lights(&lights).unwrap();
        recorder.append_log_entry(&sample_entry()).unwrap();
        assert_eq!(recorder.last_lights(), Some(lights));
        assert_eq!(recorder.log_entries().len(), 1);
    }
}
