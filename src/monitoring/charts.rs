use crate::error::RenderError;
use crate::monitoring::render_surface::{ChartSeries, RenderSurface};
use crate::shared_data::Direction;
use log::info;
use plotters::prelude::*;
use std::collections::{BTreeMap, VecDeque};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Sliding window of chart samples; pushing into a full window drops the oldest.
#[derive(Debug, Clone)]
pub struct ChartWindow {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl ChartWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(value);
        evicted
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn direction_color(direction: Direction) -> RGBColor {
    match direction {
        Direction::North => RGBColor(31, 184, 205),
        Direction::South => RGBColor(255, 193, 133),
        Direction::East => RGBColor(180, 65, 60),
        Direction::West => RGBColor(93, 135, 143),
    }
}

/// Keeps the queue-length and delay chart data and draws it to a PNG on export.
#[derive(Debug, Clone)]
pub struct ChartSurface {
    window: usize,
    queue_lengths: BTreeMap<Direction, ChartWindow>,
    delays: BTreeMap<Direction, f64>,
    output: Option<PathBuf>,
}

impl ChartSurface {
    pub fn new(window: usize, output: Option<PathBuf>) -> Self {
        let queue_lengths = Direction::ALL
            .iter()
            .map(|&d| (d, ChartWindow::new(window)))
            .collect();
        Self {
            window,
            queue_lengths,
            delays: BTreeMap::new(),
            output,
        }
    }

    pub fn queue_window(&self, direction: Direction) -> Option<&ChartWindow> {
        self.queue_lengths.get(&direction)
    }

    pub fn delay(&self, direction: Direction) -> Option<f64> {
        self.delays.get(&direction).copied()
    }

    fn draw(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (900, 700)).into_drawing_area();
        root.fill(&WHITE)?;
        let (upper, lower) = root.split_vertically(380);

        let max_queue = self
            .queue_lengths
            .values()
            .flat_map(|w| w.iter())
            .fold(1.0_f64, f64::max)
            * 1.2;
        let mut queue_chart = ChartBuilder::on(&upper)
            .caption("Queue Length", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0..self.window as i32, 0.0..max_queue)?;
        queue_chart.configure_mesh().y_desc("Vehicles").draw()?;

        for (&direction, window) in &self.queue_lengths {
            let color = direction_color(direction);
            queue_chart
                .draw_series(LineSeries::new(
                    window.iter().enumerate().map(|(i, v)| (i as i32, v)),
                    &color,
                ))?
                .label(direction.to_string())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
        queue_chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        let max_delay = self.delays.values().fold(1.0_f64, |a, &b| a.max(b)) * 1.2;
        let mut delay_chart = ChartBuilder::on(&lower)
            .caption("Average Delay (seconds)", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..Direction::ALL.len() as f64, 0.0..max_delay)?;
        delay_chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("North / South / East / West")
            .y_desc("Delay (s)")
            .draw()?;
        delay_chart.draw_series(Direction::ALL.iter().enumerate().map(|(i, &d)| {
            let value = self.delays.get(&d).copied().unwrap_or(0.0);
            let x = i as f64;
            Rectangle::new([(x + 0.15, 0.0), (x + 0.85, value)], direction_color(d).filled())
        }))?;

        root.present()?;
        Ok(())
    }
}

impl RenderSurface for ChartSurface {
    fn push_chart_sample(&mut self, series: ChartSeries, value: f64) -> Result<(), RenderError> {
        match series {
            ChartSeries::QueueLength(direction) => {
                let window = self.window;
                self.queue_lengths
                    .entry(direction)
                    .or_insert_with(|| ChartWindow::new(window))
                    .push(value);
            }
            ChartSeries::Delay(direction) => {
                self.delays.insert(direction, value);
            }
        }
        Ok(())
    }

    fn export_charts(&mut self) -> Result<Vec<PathBuf>, RenderError> {
        let path = self
            .output
            .clone()
            .ok_or(RenderError::TargetMissing("chart_output"))?;
        self.draw(&path)
            .map_err(|e| RenderError::Chart(e.to_string()))?;
        info!("Charts saved to {}", path.display());
        Ok(vec![path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_evicts_oldest_when_full() {
        let mut window = ChartWindow::new(3);
        assert_eq!(window.push(1.0), None);
        assert_eq!(window.push(2.0), None);
        assert_eq!(window.push(3.0), None);
        assert_eq!(window.push(4.0), Some(1.0));
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn queue_samples_fill_per_direction_windows() {
        let mut surface = ChartSurface::new(7, None);
        for v in 0..10 {
            surface
                .push_chart_sample(ChartSeries::QueueLength(Direction::East), v as f64)
                .unwrap();
        }
        let window = surface.queue_window(Direction::East).unwrap();
        assert_eq!(window.len(), 7);
        assert_eq!(window.iter().next(), Some(3.0));
        assert!(surface.queue_window(Direction::North).unwrap().is_empty());
    }

    #[test]
    fn delay_samples_replace_previous_values() {
        let mut surface = ChartSurface::new(7, None);
        surface
            .push_chart_sample(ChartSeries::Delay(Direction::South), 40.0)
            .unwrap();
        surface
            .push_chart_sample(ChartSeries::Delay(Direction::South), 51.0)
            .unwrap();
        assert_eq!(surface.delay(Direction::South), Some(51.0));
    }

    #[test]
    fn export_without_target_is_reported_missing() {
        let mut surface = ChartSurface::new(7, None);
        assert!(matches!(
            surface.export_charts(),
            Err(RenderError::TargetMissing("chart_output"))
        ));
    }
}
