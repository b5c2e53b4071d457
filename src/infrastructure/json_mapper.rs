// Mapper to convert domain models to JSON response types
use crate::domain::chart::{ChartData, ChartPanel, HouseCharts, SeriesData, UnitKind};
use crate::domain::house::House;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HouseDto {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub area_m2: u32,
}

#[derive(Debug, Serialize)]
pub struct ChartsDto {
    pub house_id: u64,
    pub forecast_available: bool,
    pub preview: PanelDto,
    pub extended: PanelDto,
}

#[derive(Debug, Serialize)]
pub struct PanelDto {
    pub labels: Vec<String>,
    pub dates: Vec<String>,
    pub boundary_index: usize,
    pub charts: Vec<ChartDto>,
}

#[derive(Debug, Serialize)]
pub struct ChartDto {
    pub id: String,
    pub title: String,
    pub unit: &'static str,
    pub series: Vec<SeriesDto>,
}

#[derive(Debug, Serialize)]
pub struct SeriesDto {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub data: Vec<Option<f64>>,
}

pub fn house_to_json(house: House) -> HouseDto {
    HouseDto {
        id: house.id,
        name: house.name,
        address: house.address,
        area_m2: house.area_m2,
    }
}

pub fn charts_to_json(charts: HouseCharts) -> ChartsDto {
    ChartsDto {
        house_id: charts.house_id,
        forecast_available: charts.forecast_available,
        preview: panel_to_json(charts.preview),
        extended: panel_to_json(charts.extended),
    }
}

fn panel_to_json(panel: ChartPanel) -> PanelDto {
    PanelDto {
        labels: panel.labels,
        dates: panel.dates,
        boundary_index: panel.boundary_index,
        charts: panel.charts.into_iter().map(chart_to_json).collect(),
    }
}

fn chart_to_json(chart: ChartData) -> ChartDto {
    let unit = match chart.unit {
        UnitKind::Flow => "flow",
        UnitKind::Temperature => "temp",
    };

    ChartDto {
        id: chart.id,
        title: chart.title,
        unit,
        series: chart.series.into_iter().map(series_to_json).collect(),
    }
}

fn series_to_json(series: SeriesData) -> SeriesDto {
    SeriesDto {
        id: series.id,
        name: series.name,
        color: series.color,
        data: series.values,
    }
}
