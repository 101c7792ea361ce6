// 🌙 Celestial Approximations
// Low-precision closed-form Sun/Moon longitudes, moon phase and a rough
// ascendant. Days since J2000 is the only astronomical input: no timezone,
// nutation or leap-second handling.

use crate::birth::BirthRecord;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Julian day of 2000-01-01 12:00 TT
pub const J2000: f64 = 2_451_545.0;

// ============================================================================
// ZODIAC
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Water => "water",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign occupying a 30° sector of the ecliptic
    pub fn from_longitude(longitude: f64) -> Self {
        let index = (normalize_degrees(longitude) / 30.0) as usize;
        ZodiacSign::ALL[index.min(11)]
    }

    pub fn element(&self) -> Element {
        match self {
            ZodiacSign::Aries | ZodiacSign::Leo | ZodiacSign::Sagittarius => Element::Fire,
            ZodiacSign::Taurus | ZodiacSign::Virgo | ZodiacSign::Capricorn => Element::Earth,
            ZodiacSign::Gemini | ZodiacSign::Libra | ZodiacSign::Aquarius => Element::Air,
            ZodiacSign::Cancer | ZodiacSign::Scorpio | ZodiacSign::Pisces => Element::Water,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }
}

impl std::fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// MOON PHASE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    /// Phase from Sun-Moon elongation: 45° sectors centred on 0°, 45°, ... 315°
    pub fn from_elongation(elongation: f64) -> Self {
        let shifted = normalize_degrees(elongation + 22.5);
        let index = (shifted / 45.0) as usize;
        MoonPhase::ALL[index.min(7)]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

impl std::fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// CELESTIAL SNAPSHOT
// ============================================================================

/// Everything the matcher needs from the sky at birth
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelestialApprox {
    pub julian_day: f64,
    /// Degrees, [0, 360)
    pub sun_longitude: f64,
    /// Degrees, [0, 360)
    pub moon_longitude: f64,
    /// Lit fraction of the disc, [0, 1]
    pub moon_illumination: f64,
    pub moon_phase: MoonPhase,
    pub waxing: bool,
    /// Degrees, [0, 360)
    pub ascendant: f64,
    pub sun_sign: ZodiacSign,
    pub moon_sign: ZodiacSign,
    pub ascendant_sign: ZodiacSign,
    /// 1..=12
    pub sun_house: u8,
    /// 1..=12
    pub moon_house: u8,
}

impl CelestialApprox {
    pub fn from_record(record: &BirthRecord) -> Self {
        let jd = julian_day(record.birth_datetime());
        let sun = sun_longitude(jd);
        let moon = moon_longitude(jd);
        let elongation = normalize_degrees(moon - sun);
        let asc = ascendant(jd, record.latitude(), record.longitude());

        CelestialApprox {
            julian_day: jd,
            sun_longitude: sun,
            moon_longitude: moon,
            moon_illumination: illumination_from_elongation(elongation),
            moon_phase: MoonPhase::from_elongation(elongation),
            waxing: elongation > 0.0 && elongation < 180.0,
            ascendant: asc,
            sun_sign: ZodiacSign::from_longitude(sun),
            moon_sign: ZodiacSign::from_longitude(moon),
            ascendant_sign: ZodiacSign::from_longitude(asc),
            sun_house: house_from_longitude(sun, asc),
            moon_house: house_from_longitude(moon, asc),
        }
    }

    /// Illumination as a whole-ish percentage, one decimal
    pub fn illumination_percent(&self) -> f64 {
        (self.moon_illumination * 1000.0).round() / 10.0
    }
}

// ============================================================================
// FORMULAS
// ============================================================================

/// Wrap an angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Julian day of a civil date/time (Meeus, Gregorian calendar)
pub fn julian_day(dt: NaiveDateTime) -> f64 {
    let mut year = dt.year() as f64;
    let mut month = dt.month() as f64;
    let day = dt.day() as f64
        + (dt.hour() as f64 + (dt.minute() as f64 + dt.second() as f64 / 60.0) / 60.0) / 24.0;

    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }

    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + day + b - 1524.5
}

pub fn sun_longitude(jd: f64) -> f64 {
    let d = jd - J2000;
    let mean_longitude = normalize_degrees(280.460 + 0.985_647_4 * d);
    let mean_anomaly = normalize_degrees(357.528 + 0.985_600_3 * d).to_radians();

    normalize_degrees(
        mean_longitude + 1.915 * mean_anomaly.sin() + 0.020 * (2.0 * mean_anomaly).sin(),
    )
}

pub fn moon_longitude(jd: f64) -> f64 {
    let d = jd - J2000;
    let mean_longitude = normalize_degrees(218.316 + 13.176_396 * d);
    let mean_anomaly = normalize_degrees(134.963 + 13.064_993 * d).to_radians();
    let elongation = normalize_degrees(297.850 + 12.190_749 * d).to_radians();

    let longitude = mean_longitude
        + 6.289 * mean_anomaly.sin()
        + 1.274 * (2.0 * elongation - mean_anomaly).sin()
        + 0.658 * (2.0 * elongation).sin()
        + 0.213 * (2.0 * mean_anomaly).sin();

    normalize_degrees(longitude)
}

/// Lit fraction for a Sun-Moon elongation in degrees
pub fn illumination_from_elongation(elongation: f64) -> f64 {
    ((1.0 - elongation.to_radians().cos()) / 2.0).clamp(0.0, 1.0)
}

pub fn greenwich_sidereal_degrees(jd: f64) -> f64 {
    normalize_degrees(280.460_618_37 + 360.985_647_366_29 * (jd - J2000))
}

pub fn obliquity_of_ecliptic(jd: f64) -> f64 {
    let t = (jd - J2000) / 36_525.0;
    23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.000_59 - t * 0.001_813))) / 60.0) / 60.0
}

/// Ecliptic longitude rising on the eastern horizon
pub fn ascendant(jd: f64, latitude: f64, longitude: f64) -> f64 {
    let ramc = normalize_degrees(greenwich_sidereal_degrees(jd) + longitude).to_radians();
    let eps = obliquity_of_ecliptic(jd).to_radians();
    // Keep tan() finite at the poles
    let lat = latitude.clamp(-89.999, 89.999).to_radians();

    let y = ramc.cos();
    let x = -(ramc.sin() * eps.cos() + lat.tan() * eps.sin());
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Whole 30° houses counted from the ascendant, 1..=12
pub fn house_from_longitude(planet_longitude: f64, ascendant: f64) -> u8 {
    let diff = normalize_degrees(planet_longitude - ascendant);
    ((diff / 30.0) as u8).min(11) + 1
}

// ============================================================================
// TESTS
// ============================================================================
