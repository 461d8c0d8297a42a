//! Weather sources and their translation into model modifiers.
//!
//! Models never see raw weather. The driver asks a [`WeatherSource`] for the
//! record nearest the current wall-clock time, converts it with
//! [`WeatherModifiers::from_record`] and writes the four dimensionless
//! `weather_*_modifier` parameters before the step runs.

use chrono::NaiveDateTime;
use sc_core::numeric::non_negative;
use sc_core::units::Velocity;
use sc_core::{ParamStore, Quantity, Unit};
use sc_models::common::{
    WEATHER_CLOUD_MODIFIER, WEATHER_ROAD_MODIFIER, WEATHER_TEMP_MODIFIER, WEATHER_WIND_MODIFIER,
};
use sc_project::WeatherRecordDef;
use sc_sim::VehicleModel;
use uom::si::velocity::meter_per_second;

use crate::error::{AppError, AppResult};

/// Parameter holding the direction of travel, clockwise from north.
pub const VEHICLE_HEADING: &str = "vehicle_heading";

/// One weather observation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    /// Percent, 0..=100.
    pub cloud_cover_pct: f64,
    pub wind_speed_mps: f64,
    /// Direction the wind blows from, degrees clockwise from north.
    pub wind_direction_deg: f64,
    /// Precipitation over the preceding hour.
    pub precipitation_mm: f64,
}

impl WeatherRecord {
    /// 25 °C, no cloud, no wind, dry.
    pub fn clear_sky(time: NaiveDateTime) -> Self {
        Self {
            time,
            temperature_c: 25.0,
            cloud_cover_pct: 0.0,
            wind_speed_mps: 0.0,
            wind_direction_deg: 0.0,
            precipitation_mm: 0.0,
        }
    }
}

impl From<&WeatherRecordDef> for WeatherRecord {
    fn from(def: &WeatherRecordDef) -> Self {
        Self {
            time: def.time,
            temperature_c: def.temperature_c,
            cloud_cover_pct: def.cloud_cover_pct,
            wind_speed_mps: def.wind_speed_mps,
            wind_direction_deg: def.wind_direction_deg,
            precipitation_mm: def.precipitation_mm,
        }
    }
}

/// Anything that can report the weather at a point in time.
pub trait WeatherSource {
    /// Fails with [`AppError::ExternalDataUnavailable`] when no data covers `at`.
    fn record_at(&self, at: NaiveDateTime) -> AppResult<WeatherRecord>;
}

/// Always reports [`WeatherRecord::clear_sky`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearSky;

impl WeatherSource for ClearSky {
    fn record_at(&self, at: NaiveDateTime) -> AppResult<WeatherRecord> {
        Ok(WeatherRecord::clear_sky(at))
    }
}

/// Tabulated observations, answered with the nearest record in time.
#[derive(Debug, Clone, Default)]
pub struct TableWeather {
    records: Vec<WeatherRecord>,
}

impl TableWeather {
    pub fn new(mut records: Vec<WeatherRecord>) -> Self {
        records.sort_by_key(|r| r.time);
        Self { records }
    }

    pub fn from_defs(defs: &[WeatherRecordDef]) -> Self {
        Self::new(defs.iter().map(WeatherRecord::from).collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl WeatherSource for TableWeather {
    fn record_at(&self, at: NaiveDateTime) -> AppResult<WeatherRecord> {
        self.records
            .iter()
            .min_by_key(|r| (r.time - at).num_milliseconds().unsigned_abs())
            .cloned()
            .ok_or_else(|| AppError::ExternalDataUnavailable("weather table is empty".to_string()))
    }
}

/// Dimensionless factors consumed by the models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherModifiers {
    /// Scales battery pack resistance.
    pub temperature: f64,
    /// Scales array power.
    pub cloud: f64,
    /// Scales drag power.
    pub wind: f64,
    /// Scales the rolling resistance coefficient.
    pub road: f64,
}

impl WeatherModifiers {
    pub const REFERENCE_TEMPERATURE_C: f64 = 25.0;
    pub const TEMPERATURE_COEFF_PER_C: f64 = -0.005;
    pub const FULL_CLOUD_LOSS: f64 = 0.8;
    pub const WET_ROAD_SATURATION_MM: f64 = 5.0;
    pub const WET_ROAD_INCREASE: f64 = 0.2;

    pub const NEUTRAL: WeatherModifiers = WeatherModifiers {
        temperature: 1.0,
        cloud: 1.0,
        wind: 1.0,
        road: 1.0,
    };

    /// Translate a record for a vehicle moving at `speed` on `heading_deg`.
    pub fn from_record(record: &WeatherRecord, speed: Velocity, heading_deg: f64) -> Self {
        Self {
            temperature: Self::temperature_factor(record.temperature_c),
            cloud: Self::cloud_factor(record.cloud_cover_pct),
            wind: Self::wind_factor(
                record.wind_speed_mps,
                record.wind_direction_deg,
                heading_deg,
                speed.get::<meter_per_second>(),
            ),
            road: Self::road_factor(record.precipitation_mm),
        }
    }

    pub fn temperature_factor(temperature_c: f64) -> f64 {
        1.0 + (temperature_c - Self::REFERENCE_TEMPERATURE_C) * Self::TEMPERATURE_COEFF_PER_C
    }

    pub fn cloud_factor(cover_pct: f64) -> f64 {
        1.0 - cover_pct / 100.0 * Self::FULL_CLOUD_LOSS
    }

    /// `((v + w cos(dir - heading))+ / v)^2`, or 1 when the car is stopped.
    pub fn wind_factor(wind_mps: f64, wind_from_deg: f64, heading_deg: f64, speed_mps: f64) -> f64 {
        if speed_mps <= 0.0 {
            return 1.0;
        }
        let headwind = wind_mps * (wind_from_deg - heading_deg).to_radians().cos();
        let relative = non_negative(speed_mps + headwind);
        (relative / speed_mps).powi(2)
    }

    pub fn road_factor(precipitation_mm: f64) -> f64 {
        1.0 + precipitation_mm.min(Self::WET_ROAD_SATURATION_MM) / Self::WET_ROAD_SATURATION_MM
            * Self::WET_ROAD_INCREASE
    }

    /// Look up the weather at `at` and derive modifiers from the live store.
    pub fn for_step(
        source: &dyn WeatherSource,
        params: &ParamStore,
        at: NaiveDateTime,
    ) -> AppResult<Self> {
        let record = source.record_at(at)?;
        let speed: Velocity = params
            .get_as_opt("velocity")?
            .unwrap_or_else(|| Velocity::new::<meter_per_second>(0.0));
        let heading = if params.contains(VEHICLE_HEADING) {
            params.magnitude_in(VEHICLE_HEADING, &Unit::degree())?
        } else {
            0.0
        };
        Ok(Self::from_record(&record, speed, heading))
    }

    pub fn inject(&self, vehicle: &mut VehicleModel) {
        for (key, value) in [
            (WEATHER_TEMP_MODIFIER, self.temperature),
            (WEATHER_CLOUD_MODIFIER, self.cloud),
            (WEATHER_WIND_MODIFIER, self.wind),
            (WEATHER_ROAD_MODIFIER, self.road),
        ] {
            vehicle.set_param(key, Quantity::dimensionless(value));
        }
    }
}
