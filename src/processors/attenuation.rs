use std::f64::consts::PI;

use crate::models::WeatherConditions;

/// Rain attenuation, piecewise linear with breakpoints at 1 and 5 mm/hr
pub fn rain_attenuation(rain_rate: f64) -> f64 {
    if rain_rate < 1.0 {
        rain_rate * 0.2
    } else if rain_rate < 5.0 {
        0.2 + (rain_rate - 1.0) * 0.5
    } else {
        2.2 + (rain_rate - 5.0) * 1.2
    }
}

/// Water vapour absorption, quadratic above 30% relative humidity
pub fn humidity_attenuation(humidity: f64) -> f64 {
    let normalized = ((humidity - 30.0) / 70.0).max(0.0);
    normalized.powi(2) * 3.0
}

/// Cloud scattering with breakpoints at 20% and 50% cover
pub fn cloud_attenuation(cloudcover: f64) -> f64 {
    if cloudcover < 20.0 {
        0.0
    } else if cloudcover < 50.0 {
        (cloudcover - 20.0) * 0.02
    } else {
        0.6 + (cloudcover - 50.0) * 0.04
    }
}

/// Light wind clears the path (negative), strong wind destabilizes it
pub fn wind_effect(wind_speed: f64) -> f64 {
    if wind_speed < 5.0 {
        -wind_speed * 0.1
    } else {
        (wind_speed - 5.0) * 0.15
    }
}

pub fn pressure_attenuation(pressure: f64) -> f64 {
    (pressure - 1013.25).abs() * 0.01
}

pub fn temperature_effect(temperature: f64) -> f64 {
    (temperature - 20.0).abs() * 0.05
}

pub fn rain_wind_interaction(rain_rate: f64, wind_speed: f64) -> f64 {
    rain_rate * wind_speed * 0.02
}

pub fn humidity_temperature_interaction(humidity: f64, temperature: f64) -> f64 {
    (humidity / 100.0) * (temperature - 20.0).abs() * 0.1
}

/// Daily atmospheric cycle for an hour of day (0-23)
pub fn diurnal_effect(hour: u32) -> f64 {
    (2.0 * PI * f64::from(hour) / 24.0).sin() * 1.5
}

/// Seasonal cycle for a calendar month (1-12)
pub fn seasonal_effect(month: u32) -> f64 {
    (2.0 * PI * f64::from(month) / 12.0).sin() * 0.8
}

/// Individual attenuation contributions for one set of conditions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttenuationBreakdown {
    pub rain: f64,
    pub humidity: f64,
    pub cloud: f64,
    pub wind: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub rain_wind: f64,
    pub humidity_temperature: f64,
}

impl AttenuationBreakdown {
    pub fn from_conditions(c: &WeatherConditions) -> Self {
        Self {
            rain: rain_attenuation(c.rain_rate),
            humidity: humidity_attenuation(c.humidity),
            cloud: cloud_attenuation(c.cloudcover),
            wind: wind_effect(c.wind_speed),
            pressure: pressure_attenuation(c.pressure),
            temperature: temperature_effect(c.temperature),
            rain_wind: rain_wind_interaction(c.rain_rate, c.wind_speed),
            humidity_temperature: humidity_temperature_interaction(c.humidity, c.temperature),
        }
    }

    pub fn total(&self) -> f64 {
        self.rain
            + self.humidity
            + self.cloud
            + self.wind
            + self.pressure
            + self.temperature
            + self.rain_wind
            + self.humidity_temperature
    }
}

/// Total weather attenuation in dB
pub fn attenuation(conditions: &WeatherConditions) -> f64 {
    AttenuationBreakdown::from_conditions(conditions).total()
}

/// Diurnal plus seasonal attenuation in dB
pub fn temporal_attenuation(hour: u32, month: u32) -> f64 {
    diurnal_effect(hour) + seasonal_effect(month)
}
