//! VIN-attribute and region mapping onto lifespan factor enums.

use crate::domain::{
    ClimateRegion, Drivetrain, EngineType, LifespanFactors, TransmissionType,
};
use crate::sources::VehicleAttributes;

/// Map decoded VIN attributes onto the VIN-derived factor categories.
///
/// Unrecognized strings stay `Unknown`, which the lifespan engine treats as a
/// neutral multiplier.
pub fn factors_from_attributes(attrs: &VehicleAttributes) -> LifespanFactors {
    LifespanFactors {
        transmission: transmission_from(attrs.transmission_style.as_deref()),
        drivetrain: drivetrain_from(attrs.drive_type.as_deref()),
        engine_type: engine_from(attrs.fuel_type.as_deref()),
        climate_region: attrs
            .plant_state
            .as_deref()
            .map(climate_region_from_state)
            .unwrap_or_default(),
        ..LifespanFactors::default()
    }
}

fn transmission_from(style: Option<&str>) -> TransmissionType {
    let Some(style) = style else {
        return TransmissionType::Unknown;
    };
    let style = style.to_ascii_lowercase();
    if style.contains("cvt") || style.contains("continuously variable") {
        TransmissionType::Cvt
    } else if style.contains("manual") {
        TransmissionType::Manual
    } else if style.contains("auto") {
        TransmissionType::Automatic
    } else {
        TransmissionType::Unknown
    }
}

fn drivetrain_from(drive: Option<&str>) -> Drivetrain {
    let Some(drive) = drive else {
        return Drivetrain::Unknown;
    };
    let drive = drive.to_ascii_uppercase();
    if drive.contains("4WD") || drive.contains("4X4") {
        Drivetrain::FourWd
    } else if drive.contains("AWD") || drive.contains("ALL") {
        Drivetrain::Awd
    } else if drive.contains("RWD") || drive.contains("REAR") {
        Drivetrain::Rwd
    } else if drive.contains("FWD") || drive.contains("FRONT") {
        Drivetrain::Fwd
    } else {
        Drivetrain::Unknown
    }
}

fn engine_from(fuel: Option<&str>) -> EngineType {
    let Some(fuel) = fuel else {
        return EngineType::Unknown;
    };
    let fuel = fuel.to_ascii_lowercase();
    if fuel.contains("hybrid") {
        EngineType::Hybrid
    } else if fuel.contains("electric") {
        EngineType::Electric
    } else if fuel.contains("diesel") {
        EngineType::Diesel
    } else if fuel.contains("gas") || fuel.contains("flex") || fuel.contains("e85") {
        EngineType::Gasoline
    } else {
        EngineType::Unknown
    }
}

/// Climate region for a two-letter US state code.
pub fn climate_region_from_state(state: &str) -> ClimateRegion {
    match state.trim().to_ascii_uppercase().as_str() {
        // Road-salt winters.
        "CT" | "DE" | "IA" | "IL" | "IN" | "MA" | "MD" | "ME" | "MI" | "MN" | "MO" | "ND"
        | "NE" | "NH" | "NJ" | "NY" | "OH" | "PA" | "RI" | "SD" | "VT" | "WI" | "WV" => {
            ClimateRegion::SnowSalt
        }
        // Salt-air coastlines.
        "FL" | "HI" | "LA" => ClimateRegion::CoastalSalt,
        // Humid southeast.
        "AL" | "AR" | "GA" | "KY" | "MS" | "NC" | "SC" | "TN" | "VA" => ClimateRegion::Humid,
        // Dry southwest and mountain west.
        "AZ" | "CO" | "ID" | "MT" | "NM" | "NV" | "UT" | "WY" => ClimateRegion::Arid,
        "CA" | "OK" | "OR" | "TX" | "WA" => ClimateRegion::Moderate,
        _ => ClimateRegion::Unknown,
    }
}
