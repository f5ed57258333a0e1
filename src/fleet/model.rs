use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    #[serde(default)]
    pub total_vehicles: u32,
    #[serde(default)]
    pub total_trailers: u32,
    #[serde(default)]
    pub active_vehicles: u32,
    #[serde(default)]
    pub maintenance_vehicles: u32,
    #[serde(default)]
    pub available_trailers: u32,
    #[serde(default)]
    pub hitched_trailers: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(rename = "fleet_status")]
    pub fleet_status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trailer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub trailer_type: Option<String>,
    #[serde(rename = "fleet_status")]
    pub fleet_status: String,
    #[serde(default)]
    pub hitched_to_vehicle_id: Option<String>,
}

impl Trailer {
    pub fn is_hitched(&self) -> bool {
        self.hitched_to_vehicle_id.is_some()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VehicleStatusUpdate<'a> {
    pub fleet_status: &'a str,
}
