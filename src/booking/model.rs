use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub spot_type: Option<String>,
    #[serde(default)]
    pub nightly_rate: Option<f64>,
    #[serde(default)]
    pub available: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub service_type: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub property_id: String,
    pub spot_id: String,
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: String,
}

impl Booking {
    pub fn is_cancellable(&self) -> bool {
        matches!(self.status.as_str(), "pending" | "confirmed")
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct PropertyBody {
    pub property: Property,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SpotsBody {
    #[serde(default)]
    pub spots: Vec<Spot>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ProvidersBody {
    #[serde(default)]
    pub providers: Vec<Provider>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct BookingBody {
    pub booking: Booking,
}

#[derive(Deserialize, Debug)]
pub(crate) struct BookingsBody {
    #[serde(default)]
    pub bookings: Vec<Booking>,
}
