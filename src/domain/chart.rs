// Chart domain models

use super::reading::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Flow,
    Temperature,
}

/// Layout of one chart: which target channels feed which lines.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub unit: UnitKind,
    pub series: Vec<SeriesSpec>,
}

/// A line fed by one target channel, or by the mean of several.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub targets: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub values: Series,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, values: Series) -> Self {
        Self {
            id,
            name,
            color,
            values,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: UnitKind,
    pub series: Vec<SeriesData>,
}

/// All charts over one time window.
///
/// `labels`, `dates` and every series share indices. Indices up to and
/// including `boundary_index` are historical, later ones are forecast.
#[derive(Debug, Clone)]
pub struct ChartPanel {
    pub labels: Vec<String>,
    pub dates: Vec<String>,
    pub boundary_index: usize,
    pub charts: Vec<ChartData>,
}

#[derive(Debug, Clone)]
pub struct HouseCharts {
    pub house_id: u64,
    pub forecast_available: bool,
    pub preview: ChartPanel,
    pub extended: ChartPanel,
}

pub fn default_layout() -> Vec<ChartSpec> {
    fn line(id: &str, name: &str, color: &str, targets: &[u32]) -> SeriesSpec {
        SeriesSpec {
            id: id.to_string(),
            name: name.to_string(),
            color: Some(color.to_string()),
            targets: targets.to_vec(),
        }
    }

    vec![
        ChartSpec {
            id: "chart1".to_string(),
            title: "Общее потребление ХВС, м³".to_string(),
            unit: UnitKind::Flow,
            series: vec![line("xvs", "Общее потребление ХВС, м³", "#3b82f6", &[1])],
        },
        ChartSpec {
            id: "chart2".to_string(),
            title: "Общее потребление ГВС, м³".to_string(),
            unit: UnitKind::Flow,
            series: vec![line("gvs", "Общее потребление ГВС, м³", "#a855f7", &[2])],
        },
        ChartSpec {
            id: "chart3".to_string(),
            title: "Подача / Обратка".to_string(),
            unit: UnitKind::Temperature,
            series: vec![
                line("supply", "Подача", "#1e40af", &[3]),
                line("return", "Обратка", "#a855f7", &[4]),
            ],
        },
        ChartSpec {
            id: "chart4".to_string(),
            title: "Температуры".to_string(),
            unit: UnitKind::Temperature,
            series: vec![
                line("t1", "T1 (подача)", "#a855f7", &[3]),
                line("t2", "T2 (обратка)", "#3b82f6", &[4]),
                line("avg", "Средняя температура", "#10b981", &[3, 4]),
            ],
        },
    ]
}
