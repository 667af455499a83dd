use super::Exporter;
use crate::error::SinkWriteError;
use crate::scheduler::{TrainingSchedule, WeekLoad};
use crate::session::Category;
use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

const FONT_FAMILY: &str = "sans-serif";
const TITLE: &str = "Weekly Training Load (by category, hours)";

const SYSTEM_FONTS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// One stacked bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub week_number: u32,
    pub label: String,
    pub total_hours: f64,
    pub segments: Vec<(Category, f64)>,
}

/// Bar heights taken straight from the week loads.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub bars: Vec<ChartBar>,
}

impl ChartData {
    pub fn from_loads(week_loads: &[WeekLoad]) -> Self {
        let bars = week_loads
            .iter()
            .map(|load| ChartBar {
                week_number: load.week_number,
                label: format!("W{}", load.week_number),
                total_hours: load.total_hours(),
                segments: Category::ALL
                    .iter()
                    .map(|&category| (category, load.category_hours(category)))
                    .collect(),
            })
            .collect();
        Self { bars }
    }

    pub fn max_hours(&self) -> f64 {
        self.bars
            .iter()
            .map(|bar| bar.total_hours)
            .fold(0.0, f64::max)
    }

    pub fn bar(&self, week: u32) -> Option<&ChartBar> {
        self.bars.iter().find(|bar| bar.week_number == week)
    }
}

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// TrueType font for captions and labels.
    pub font_path: Option<PathBuf>,
    /// Fall back to well-known system font locations when `font_path` is unset.
    pub search_system_fonts: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            font_path: None,
            search_system_fonts: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChartSink {
    options: ChartOptions,
}

impl ChartSink {
    pub fn new(options: ChartOptions) -> Self {
        Self { options }
    }

    /// PNG unless `destination` ends in `.svg`.
    pub fn write(&self, week_loads: &[WeekLoad], destination: &Path) -> Result<(), SinkWriteError> {
        let data = ChartData::from_loads(week_loads);
        let labelled = self.fonts_available();
        if !labelled {
            warn!("no usable font found, chart is drawn without labels");
        }
        let size = (self.options.width, self.options.height);
        let is_svg = destination
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

        let drawn = if is_svg {
            draw_chart(SVGBackend::new(destination, size).into_drawing_area(), &data, labelled)
        } else {
            draw_chart(BitMapBackend::new(destination, size).into_drawing_area(), &data, labelled)
        };
        drawn.map_err(|message| SinkWriteError::Chart {
            path: destination.to_path_buf(),
            message,
        })?;

        info!(
            "training load chart with {} bars saved: {}",
            data.bars.len(),
            destination.display()
        );
        Ok(())
    }

    fn fonts_available(&self) -> bool {
        let candidates: Vec<PathBuf> = match &self.options.font_path {
            Some(path) => vec![path.clone()],
            None if self.options.search_system_fonts => {
                SYSTEM_FONTS.iter().map(PathBuf::from).collect()
            }
            None => Vec::new(),
        };
        if candidates.is_empty() {
            return false;
        }
        register_first_font(&candidates)
    }
}

impl Exporter for ChartSink {
    fn name(&self) -> &'static str {
        "chart"
    }

    fn export(&self, schedule: &TrainingSchedule, destination: &Path) -> Result<(), SinkWriteError> {
        self.write(&schedule.week_loads, destination)
    }
}

/// Font files read so far, by path. A `None` entry could not be read.
static FONT_CACHE: OnceLock<Mutex<HashMap<PathBuf, Option<&'static [u8]>>>> = OnceLock::new();

fn load_font(path: &Path) -> Option<&'static [u8]> {
    let cache = FONT_CACHE.get_or_init(Default::default);
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
    *cache.entry(path.to_path_buf()).or_insert_with(|| {
        fs::read(path)
            .ok()
            .map(|bytes| &*Box::leak(bytes.into_boxed_slice()))
    })
}

/// Registers the first usable candidate under the chart font family.
///
/// Registration is process-wide, so sinks drawing concurrently with different
/// fonts may label with either one.
fn register_first_font(candidates: &[PathBuf]) -> bool {
    for path in candidates {
        let Some(bytes) = load_font(path) else {
            continue;
        };
        match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => return true,
            Err(_) => warn!("ignoring unreadable font {}", path.display()),
        }
    }
    false
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, data: &ChartData, labelled: bool) -> Result<(), String>
where
    DB: DrawingBackend,
{
    render(root, data, labelled).map_err(|err| err.to_string())
}

fn render<DB>(
    root: DrawingArea<DB, Shift>,
    data: &ChartData,
    labelled: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE)?;

    let bar_count = data.bars.len() as u32;
    let y_max = (data.max_hours() * 1.1).max(1.0);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if labelled {
        builder
            .caption(TITLE, (FONT_FAMILY, 22))
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 40);
    }
    let mut chart = builder.build_cartesian_2d((0u32..bar_count).into_segmented(), 0f64..y_max)?;

    if labelled {
        let labels: Vec<String> = data.bars.iter().map(|bar| bar.label.clone()).collect();
        let x_formatter = move |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(idx) => labels.get(*idx as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Total Hours")
            .x_labels(data.bars.len().max(1))
            .x_label_formatter(&x_formatter)
            .label_style((FONT_FAMILY, 14))
            .axis_desc_style((FONT_FAMILY, 16))
            .draw()?;
    }

    let mut bottoms = vec![0f64; data.bars.len()];
    for category in Category::ALL {
        let color = category_color(category);
        let rects: Vec<Rectangle<(SegmentValue<u32>, f64)>> = data
            .bars
            .iter()
            .enumerate()
            .filter_map(|(idx, bar)| {
                let hours = bar
                    .segments
                    .iter()
                    .find(|(c, _)| *c == category)
                    .map(|(_, h)| *h)
                    .unwrap_or(0.0);
                if hours <= 0.0 {
                    return None;
                }
                let bottom = bottoms[idx];
                bottoms[idx] += hours;
                let x = idx as u32;
                let mut rect = Rectangle::new(
                    [
                        (SegmentValue::Exact(x), bottom),
                        (SegmentValue::Exact(x + 1), bottom + hours),
                    ],
                    color.filled(),
                );
                rect.set_margin(0, 0, 6, 6);
                Some(rect)
            })
            .collect();

        let series = chart.draw_series(rects)?;
        if labelled {
            series
                .label(category.label())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
        }
    }

    if labelled {
        chart
            .configure_series_labels()
            .label_font((FONT_FAMILY, 14))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn category_color(category: Category) -> RGBColor {
    let rgb = category.color();
    RGBColor((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}
