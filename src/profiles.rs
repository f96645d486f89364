//! Plant type profiles
//!
//! Immutable reference tables mapping a plant type to the environmental
//! ranges it thrives in (used by the health scorer) and to its coarse
//! watering needs (used by the schedule optimizer). Built once at startup
//! and shared read-only.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Known plant type taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    Herb,
    Flower,
    Vegetable,
    Fruit,
    Tree,
    Succulent,
    Fern,
    Vine,
    Aquatic,
    /// Fallback for unrecognized types
    Default,
}

impl PlantType {
    pub const ALL: [PlantType; 10] = [
        PlantType::Herb,
        PlantType::Flower,
        PlantType::Vegetable,
        PlantType::Fruit,
        PlantType::Tree,
        PlantType::Succulent,
        PlantType::Fern,
        PlantType::Vine,
        PlantType::Aquatic,
        PlantType::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlantType::Herb => "herb",
            PlantType::Flower => "flower",
            PlantType::Vegetable => "vegetable",
            PlantType::Fruit => "fruit",
            PlantType::Tree => "tree",
            PlantType::Succulent => "succulent",
            PlantType::Fern => "fern",
            PlantType::Vine => "vine",
            PlantType::Aquatic => "aquatic",
            PlantType::Default => "default",
        }
    }

    /// Resolve a free-form type name, falling back to [`PlantType::Default`]
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or(PlantType::Default)
    }
}

impl FromStr for PlantType {
    type Err = UnknownPlantType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        PlantType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownPlantType(s.to_string()))
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plant type: {0:?}")]
pub struct UnknownPlantType(pub String);

/// Environmental parameter scored against a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    SoilMoisture,
    Temperature,
    Humidity,
    Light,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::SoilMoisture,
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Light,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::SoilMoisture => "soil_moisture",
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
            Parameter::Light => "light",
        }
    }
}

/// Ideal range and relative importance of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold {
    pub min: f64,
    pub max: f64,
    pub weight: f64,
}

impl Threshold {
    pub const fn new(min: f64, max: f64, weight: f64) -> Self {
        Self { min, max, weight }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Per-type thresholds for the health scorer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantProfile {
    pub plant_type: PlantType,
    pub soil_moisture: Threshold,
    pub temperature: Threshold,
    pub humidity: Threshold,
    pub light: Threshold,
}

impl PlantProfile {
    pub fn threshold(&self, parameter: Parameter) -> &Threshold {
        match parameter {
            Parameter::SoilMoisture => &self.soil_moisture,
            Parameter::Temperature => &self.temperature,
            Parameter::Humidity => &self.humidity,
            Parameter::Light => &self.light,
        }
    }

    pub fn total_weight(&self) -> f64 {
        Parameter::ALL.iter().map(|p| self.threshold(*p).weight).sum()
    }
}

/// Coarse watering needs category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterNeeds {
    Low,
    Medium,
    High,
}

impl WaterNeeds {
    /// Days between waterings before environmental adjustment
    pub fn base_frequency_days(&self) -> u32 {
        match self {
            WaterNeeds::Low => 7,
            WaterNeeds::Medium => 3,
            WaterNeeds::High => 2,
        }
    }

    /// Minutes per watering before moisture adjustment
    pub fn base_duration_minutes(&self) -> u32 {
        match self {
            WaterNeeds::Low => 5,
            WaterNeeds::Medium => 10,
            WaterNeeds::High => 15,
        }
    }
}

/// Simplified profile shape used by the schedule optimizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CareProfile {
    pub plant_type: PlantType,
    pub water_needs: WaterNeeds,
    pub ideal_moisture: f64,
    pub ideal_temperature: f64,
    pub ideal_light: f64,
}

/// Read-only lookup from plant type to profiles
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: HashMap<PlantType, PlantProfile>,
}

impl ProfileCatalog {
    /// The built-in catalog covering every [`PlantType`]
    pub fn builtin() -> Self {
        let profiles = PlantType::ALL
            .iter()
            .map(|t| (*t, builtin_profile(*t)))
            .collect();
        Self { profiles }
    }

    /// Threshold profile for a type name; unknown names use the default profile
    pub fn profile(&self, type_name: &str) -> &PlantProfile {
        self.profile_for(PlantType::resolve(type_name))
    }

    pub fn profile_for(&self, plant_type: PlantType) -> &PlantProfile {
        self.profiles
            .get(&plant_type)
            .or_else(|| self.profiles.get(&PlantType::Default))
            .unwrap_or(&DEFAULT_PROFILE)
    }

    /// Care profile for a type name; ideal references are the range midpoints
    pub fn care_profile(&self, type_name: &str) -> CareProfile {
        let profile = self.profile(type_name);
        CareProfile {
            plant_type: profile.plant_type,
            water_needs: water_needs(profile.plant_type),
            ideal_moisture: profile.soil_moisture.midpoint(),
            ideal_temperature: profile.temperature.midpoint(),
            ideal_light: profile.light.midpoint(),
        }
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const DEFAULT_PROFILE: PlantProfile = PlantProfile {
    plant_type: PlantType::Default,
    soil_moisture: Threshold::new(40.0, 70.0, 0.3),
    temperature: Threshold::new(18.0, 28.0, 0.2),
    humidity: Threshold::new(40.0, 70.0, 0.2),
    light: Threshold::new(400.0, 800.0, 0.3),
};

fn builtin_profile(plant_type: PlantType) -> PlantProfile {
    // (soil_moisture, temperature, humidity, light)
    let (soil_moisture, temperature, humidity, light) = match plant_type {
        PlantType::Herb => (
            Threshold::new(40.0, 70.0, 0.3),
            Threshold::new(18.0, 26.0, 0.2),
            Threshold::new(40.0, 70.0, 0.2),
            Threshold::new(300.0, 800.0, 0.3),
        ),
        PlantType::Flower => (
            Threshold::new(50.0, 70.0, 0.3),
            Threshold::new(18.0, 28.0, 0.2),
            Threshold::new(50.0, 80.0, 0.2),
            Threshold::new(400.0, 900.0, 0.3),
        ),
        PlantType::Vegetable => (
            Threshold::new(60.0, 80.0, 0.4),
            Threshold::new(20.0, 30.0, 0.2),
            Threshold::new(50.0, 80.0, 0.1),
            Threshold::new(500.0, 1000.0, 0.3),
        ),
        PlantType::Fruit => (
            Threshold::new(50.0, 75.0, 0.3),
            Threshold::new(20.0, 32.0, 0.3),
            Threshold::new(40.0, 70.0, 0.1),
            Threshold::new(600.0, 1000.0, 0.3),
        ),
        PlantType::Tree => (
            Threshold::new(40.0, 70.0, 0.3),
            Threshold::new(15.0, 30.0, 0.2),
            Threshold::new(30.0, 70.0, 0.1),
            Threshold::new(400.0, 900.0, 0.4),
        ),
        PlantType::Succulent => (
            Threshold::new(20.0, 40.0, 0.4),
            Threshold::new(18.0, 35.0, 0.2),
            Threshold::new(20.0, 50.0, 0.1),
            Threshold::new(500.0, 1000.0, 0.3),
        ),
        PlantType::Fern => (
            Threshold::new(60.0, 80.0, 0.4),
            Threshold::new(18.0, 24.0, 0.2),
            Threshold::new(60.0, 90.0, 0.3),
            Threshold::new(200.0, 500.0, 0.1),
        ),
        PlantType::Vine => (
            Threshold::new(50.0, 70.0, 0.3),
            Threshold::new(18.0, 28.0, 0.2),
            Threshold::new(40.0, 70.0, 0.2),
            Threshold::new(300.0, 800.0, 0.3),
        ),
        PlantType::Aquatic => (
            Threshold::new(90.0, 100.0, 0.5),
            Threshold::new(20.0, 28.0, 0.3),
            Threshold::new(60.0, 90.0, 0.1),
            Threshold::new(300.0, 700.0, 0.1),
        ),
        PlantType::Default => return DEFAULT_PROFILE,
    };

    PlantProfile {
        plant_type,
        soil_moisture,
        temperature,
        humidity,
        light,
    }
}

fn water_needs(plant_type: PlantType) -> WaterNeeds {
    match plant_type {
        PlantType::Succulent | PlantType::Tree => WaterNeeds::Low,
        PlantType::Vegetable | PlantType::Fern | PlantType::Aquatic => WaterNeeds::High,
        PlantType::Herb
        | PlantType::Flower
        | PlantType::Fruit
        | PlantType::Vine
        | PlantType::Default => WaterNeeds::Medium,
    }
}
