use crate::status::{BidStatus, BiddingStatus, CoopStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub service_area: Option<String>,
    #[serde(default)]
    pub trade_category: Option<String>,
    pub min_slots: u32,
    pub max_slots: u32,
    pub current_slots: u32,
    pub status: String,
    #[serde(default)]
    pub bidding_opens_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bidding_closes_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_mobilization_cost: Option<f64>,
    #[serde(default)]
    pub total_estimated_revenue: f64,
}

impl Run {
    pub fn bidding_status(&self) -> Option<BiddingStatus> {
        BiddingStatus::from_str(&self.status).ok()
    }

    pub fn bidding_window_open(&self, now: DateTime<Utc>) -> bool {
        let opened = self.bidding_opens_at.is_some_and(|opens| opens <= now);
        let not_closed = self.bidding_closes_at.map_or(true, |closes| now < closes);
        opened && not_closed
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CoopRun {
    pub id: String,
    pub trade_category: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub service_area: Option<String>,
    pub status: String,
    #[serde(default)]
    pub current_member_count: Option<u32>,
    #[serde(default)]
    pub mobilization_fee_total: Option<f64>,
    /// This member's share, already divided by the server.
    #[serde(default)]
    pub mobilization_share: Option<f64>,
    #[serde(default)]
    pub threshold_met: bool,
}

impl CoopRun {
    pub fn coop_status(&self) -> Option<CoopStatus> {
        CoopStatus::from_str(&self.status).ok()
    }

    pub fn member_count(&self) -> u32 {
        self.current_member_count.unwrap_or(0)
    }
}

/// How a crew reaches the property. Codes outside the known set are kept.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum PropertyAccessType {
    Road,
    WaterOnly,
    FourByFour,
    Helicopter,
    Ferry,
    Other(String),
}

impl PropertyAccessType {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyAccessType::Road => "road",
            PropertyAccessType::WaterOnly => "water_only",
            PropertyAccessType::FourByFour => "4x4",
            PropertyAccessType::Helicopter => "helicopter",
            PropertyAccessType::Ferry => "ferry",
            PropertyAccessType::Other(code) => code,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PropertyAccessType::Road => "Road access",
            PropertyAccessType::WaterOnly => "Water access only",
            PropertyAccessType::FourByFour => "4x4 required",
            PropertyAccessType::Helicopter => "Helicopter",
            PropertyAccessType::Ferry => "Ferry",
            PropertyAccessType::Other(code) => code,
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, PropertyAccessType::Road)
    }
}

impl From<String> for PropertyAccessType {
    fn from(code: String) -> Self {
        match code.as_str() {
            "road" => PropertyAccessType::Road,
            "water_only" => PropertyAccessType::WaterOnly,
            "4x4" => PropertyAccessType::FourByFour,
            "helicopter" => PropertyAccessType::Helicopter,
            "ferry" => PropertyAccessType::Ferry,
            _ => PropertyAccessType::Other(code),
        }
    }
}

impl From<PropertyAccessType> for String {
    fn from(access: PropertyAccessType) -> Self {
        access.as_str().to_string()
    }
}

impl fmt::Display for PropertyAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub property_address: Option<String>,
    pub property_access_type: PropertyAccessType,
    /// Display order only.
    #[serde(default)]
    pub services_requested: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub contractor_name: String,
    #[serde(default)]
    pub contractor_email: Option<String>,
    #[serde(default)]
    pub contractor_phone: Option<String>,
    pub mobilization_cost: f64,
    #[serde(default)]
    pub per_slot_cost_low: Option<f64>,
    #[serde(default)]
    pub per_slot_cost_high: Option<f64>,
    pub crew_size: u32,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Bid {
    pub fn bid_status(&self) -> Option<BidStatus> {
        BidStatus::from_str(&self.status).ok()
    }

    /// `(low, high)` when the contractor quoted a per-slot range. A single
    /// bound is shown as a point range.
    pub fn per_slot_range(&self) -> Option<(f64, f64)> {
        match (self.per_slot_cost_low, self.per_slot_cost_high) {
            (Some(low), Some(high)) => Some((low.min(high), low.max(high))),
            (Some(only), None) | (None, Some(only)) => Some((only, only)),
            (None, None) => None,
        }
    }
}

/// `GET /api/service-runs/runs`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunList {
    pub runs: Vec<Run>,
}

/// `GET /api/service-runs/runs/:slug`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunDetail {
    pub run: Run,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

/// `GET /api/coop-runs`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CoopRunList {
    pub coop_runs: Vec<CoopRun>,
}

/// `GET /api/coop-runs/:id`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CoopRunDetail {
    pub coop_run: CoopRun,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_decodes_from_camel_case() {
        let run: Run = serde_json::from_value(json!({
            "id": "r-1",
            "slug": "septic-pumping-gulf-islands",
            "title": "Septic pumping",
            "minSlots": 5,
            "maxSlots": 10,
            "currentSlots": 3,
            "status": "collecting",
            "biddingOpensAt": "2026-05-01T16:00:00Z",
            "biddingClosesAt": null,
            "estimatedMobilizationCost": null,
            "totalEstimatedRevenue": 4200.0
        }))
        .unwrap();
        assert_eq!(run.bidding_status(), Some(BiddingStatus::Collecting));
        assert_eq!(run.estimated_mobilization_cost, None);
        assert!(run.bidding_opens_at.is_some());
    }

    #[test]
    fn unknown_access_type_is_preserved() {
        let slot: Slot = serde_json::from_value(json!({
            "id": "s-1",
            "customerName": "Dana",
            "propertyAccessType": "barge",
            "servicesRequested": ["pump-out", "inspection"],
            "status": "pending"
        }))
        .unwrap();
        assert_eq!(
            slot.property_access_type,
            PropertyAccessType::Other("barge".to_string())
        );
        assert_eq!(serde_json::to_value(&slot).unwrap()["propertyAccessType"], "barge");
        assert_eq!(slot.services_requested, vec!["pump-out", "inspection"]);
    }

    #[test]
    fn four_by_four_round_trips_its_code() {
        let access = PropertyAccessType::from("4x4".to_string());
        assert_eq!(access, PropertyAccessType::FourByFour);
        assert!(access.is_remote());
        assert_eq!(String::from(access), "4x4");
    }

    #[test]
    fn coop_member_count_defaults_to_zero() {
        let coop: CoopRun = serde_json::from_value(json!({
            "id": "c-1",
            "trade_category": "chimney",
            "status": "forming",
            "current_member_count": null,
            "mobilization_share": 112.5,
            "threshold_met": false
        }))
        .unwrap();
        assert_eq!(coop.member_count(), 0);
        assert_eq!(coop.coop_status(), Some(CoopStatus::Forming));
    }

    #[test]
    fn per_slot_range_orders_bounds() {
        let bid = Bid {
            id: "b-1".to_string(),
            contractor_name: "Tidewater Septic".to_string(),
            contractor_email: None,
            contractor_phone: None,
            mobilization_cost: 1800.0,
            per_slot_cost_low: Some(450.0),
            per_slot_cost_high: Some(300.0),
            crew_size: 2,
            status: "submitted".to_string(),
            notes: None,
        };
        assert_eq!(bid.per_slot_range(), Some((300.0, 450.0)));
        assert_eq!(bid.bid_status(), Some(BidStatus::Submitted));
    }

    #[test]
    fn bidding_window_needs_open_time() {
        let mut run: Run = serde_json::from_value(json!({
            "id": "r-2", "slug": "r-2", "title": "Roofing",
            "minSlots": 1, "maxSlots": 4, "currentSlots": 1,
            "status": "bidding"
        }))
        .unwrap();
        let now = "2026-06-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(!run.bidding_window_open(now));
        run.bidding_opens_at = Some("2026-05-01T00:00:00Z".parse().unwrap());
        assert!(run.bidding_window_open(now));
        run.bidding_closes_at = Some("2026-05-15T00:00:00Z".parse().unwrap());
        assert!(!run.bidding_window_open(now));
    }
}
