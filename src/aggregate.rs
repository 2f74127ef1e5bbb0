//! Reduce per-longitude jet positions to a zonal series, or pass them through.

use chrono::NaiveDateTime;
use metfor::{Kelvin, MetersPSec, Quantity};
use optional::{none, some, Optioned};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::extrema::Hemisphere;
use crate::metric::JetPosition;

/// How per-longitude jet positions are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// Reduce each time step to the zonal median over defined longitudes.
    #[strum(serialize = "median", serialize = "zonal-median", serialize = "mean")]
    #[serde(alias = "median", alias = "mean")]
    ZonalMedian,
    /// Keep one optional position per longitude.
    #[strum(serialize = "per-longitude")]
    PerLongitude,
}

/// Median of the defined entries; missing when none are defined.
///
/// Even counts average the middle pair. Undefined entries never participate,
/// so `[30.0, missing, 32.0, 31.0]` has the median 31.0.
pub fn median_defined<I>(values: I) -> Optioned<f64>
where
    I: IntoIterator<Item = Optioned<f64>>,
{
    let mut defined: Vec<f64> = values
        .into_iter()
        .filter(|v| v.is_some())
        .map(|v| v.unpack())
        .collect();

    if defined.is_empty() {
        return none();
    }

    defined.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = defined.len();
    if n % 2 == 1 {
        some(defined[n / 2])
    } else {
        some((defined[n / 2 - 1] + defined[n / 2]) / 2.0)
    }
}

/// One zonally reduced time step.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ZonalJet {
    /// Zonal median jet latitude, degrees north.
    pub latitude: Optioned<f64>,
    /// Zonal median theta of the PV surface at the jet.
    pub theta: Optioned<Kelvin>,
    /// Zonal median zonal wind at the jet.
    pub intensity: Optioned<MetersPSec>,
}

// Reduce one time step's per-longitude positions, ignoring undefined ones.
pub(crate) fn reduce_time_step(row: &[Option<JetPosition>]) -> ZonalJet {
    let defined = || row.iter().flatten();

    let latitude = median_defined(defined().map(|p| some(p.latitude)));
    let theta = median_defined(
        defined().map(|p| Optioned::from(p.theta.into_option().map(Quantity::unpack))),
    );
    let intensity = median_defined(
        defined().map(|p| Optioned::from(p.intensity.into_option().map(Quantity::unpack))),
    );

    ZonalJet {
        latitude,
        theta: Optioned::from(theta.into_option().map(Kelvin)),
        intensity: Optioned::from(intensity.into_option().map(MetersPSec)),
    }
}

/// Per-time storage for either aggregation mode.
#[derive(Clone, Debug, PartialEq)]
pub enum SeriesData {
    /// One reduced sample per time step.
    Zonal(Vec<ZonalJet>),
    /// One optional position per (time, longitude), longitudes in grid order.
    PerLongitude(Vec<Vec<Option<JetPosition>>>),
}

/// Jet positions for one hemisphere across every time step.
///
/// This is the final product of the metric; persistence is the caller's
/// concern.
#[derive(Clone, Debug, PartialEq)]
pub struct JetSeries {
    hemisphere: Hemisphere,
    times: Vec<NaiveDateTime>,
    longitudes: Vec<f64>,
    data: SeriesData,
}

impl JetSeries {
    pub(crate) fn new(
        hemisphere: Hemisphere,
        times: Vec<NaiveDateTime>,
        longitudes: Vec<f64>,
        data: SeriesData,
    ) -> Self {
        JetSeries {
            hemisphere,
            times,
            longitudes,
            data,
        }
    }

    /// The hemisphere this series describes.
    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Valid times, one per entry of the series.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Longitude coordinate of the per-longitude mode, degrees east.
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// The series payload.
    pub fn data(&self) -> &SeriesData {
        &self.data
    }

    /// Jet latitude per time step; in per-longitude mode, the zonal median of
    /// the defined longitudes.
    pub fn zonal_latitudes(&self) -> Vec<Optioned<f64>> {
        match &self.data {
            SeriesData::Zonal(samples) => samples.iter().map(|s| s.latitude).collect(),
            SeriesData::PerLongitude(rows) => rows
                .iter()
                .map(|row| median_defined(row.iter().map(|p| match p {
                    Some(pos) => some(pos.latitude),
                    None => none(),
                })))
                .collect(),
        }
    }
}
