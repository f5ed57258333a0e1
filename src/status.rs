//! Status vocabularies and their display metadata.
//!
//! Every lookup is total: a code missing from a table is shown as its raw
//! string with the [`Variant::Default`] style.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Visual severity bucket for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Default,
    Info,
    Warning,
    Success,
    Danger,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub variant: Variant,
}

const fn info(code: &'static str, label: &'static str, variant: Variant) -> StatusInfo {
    StatusInfo {
        code,
        label,
        variant,
    }
}

#[derive(Debug)]
pub struct StatusTable {
    entries: &'static [StatusInfo],
}

impl StatusTable {
    pub fn lookup(&self, code: &str) -> Option<&'static StatusInfo> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    pub fn label<'a>(&self, code: &'a str) -> &'a str {
        self.lookup(code).map_or(code, |entry| entry.label)
    }

    pub fn variant(&self, code: &str) -> Variant {
        self.lookup(code).map_or(Variant::Default, |entry| entry.variant)
    }
}

pub static BIDDING_RUN_STATUS: StatusTable = StatusTable {
    entries: &[
        info("draft", "Draft", Variant::Muted),
        info("collecting", "Collecting Signups", Variant::Info),
        info("bidding", "Open for Bids", Variant::Warning),
        info("bid_review", "Reviewing Bids", Variant::Warning),
        info("confirmed", "Confirmed", Variant::Success),
        info("scheduled", "Scheduled", Variant::Success),
        info("in_progress", "In Progress", Variant::Info),
        info("completed", "Completed", Variant::Success),
        info("cancelled", "Cancelled", Variant::Danger),
    ],
};

/// The first four rows keep coop cards readable for runs that still carry
/// bidding-track codes.
pub static COOP_RUN_STATUS: StatusTable = StatusTable {
    entries: &[
        info("draft", "Draft", Variant::Muted),
        info("collecting", "Collecting Signups", Variant::Info),
        info("bidding", "Open for Bids", Variant::Warning),
        info("bid_review", "Reviewing Bids", Variant::Warning),
        info("forming", "Forming", Variant::Info),
        info("contractor_invited", "Contractor Invited", Variant::Warning),
        info("contractor_claimed", "Contractor Claimed", Variant::Warning),
        info("confirmed", "Confirmed", Variant::Success),
        info("scheduled", "Scheduled", Variant::Success),
        info("in_progress", "In Progress", Variant::Info),
        info("completed", "Completed", Variant::Success),
        info("cancelled", "Cancelled", Variant::Danger),
    ],
};

pub static BID_STATUS: StatusTable = StatusTable {
    entries: &[
        info("pending", "Pending", Variant::Muted),
        info("submitted", "Submitted", Variant::Info),
        info("shortlisted", "Shortlisted", Variant::Warning),
        info("accepted", "Accepted", Variant::Success),
        info("rejected", "Rejected", Variant::Danger),
    ],
};

pub static SLOT_STATUS: StatusTable = StatusTable {
    entries: &[
        info("pending", "Pending", Variant::Muted),
        info("confirmed", "Confirmed", Variant::Success),
        info("scheduled", "Scheduled", Variant::Info),
        info("completed", "Completed", Variant::Success),
        info("cancelled", "Cancelled", Variant::Danger),
    ],
};

pub static FLEET_STATUS: StatusTable = StatusTable {
    entries: &[
        info("active", "Active", Variant::Success),
        info("available", "Available", Variant::Info),
        info("hitched", "Hitched", Variant::Info),
        info("maintenance", "In Maintenance", Variant::Warning),
        info("retired", "Retired", Variant::Muted),
    ],
};

pub static BOOKING_STATUS: StatusTable = StatusTable {
    entries: &[
        info("pending", "Pending", Variant::Warning),
        info("confirmed", "Confirmed", Variant::Success),
        info("checked_in", "Checked In", Variant::Info),
        info("completed", "Completed", Variant::Muted),
        info("cancelled", "Cancelled", Variant::Danger),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(pub String);

/// Lifecycle of a competitive-bidding run. The server owns transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiddingStatus {
    Draft,
    Collecting,
    Bidding,
    BidReview,
    Confirmed,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl BiddingStatus {
    pub const HAPPY_PATH: [BiddingStatus; 8] = [
        Self::Draft,
        Self::Collecting,
        Self::Bidding,
        Self::BidReview,
        Self::Confirmed,
        Self::Scheduled,
        Self::InProgress,
        Self::Completed,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Collecting => "collecting",
            Self::Bidding => "bidding",
            Self::BidReview => "bid_review",
            Self::Confirmed => "confirmed",
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub const fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    pub fn next_on_happy_path(&self) -> Option<BiddingStatus> {
        let position = Self::HAPPY_PATH.iter().position(|status| status == self)?;
        Self::HAPPY_PATH.get(position + 1).copied()
    }
}

impl FromStr for BiddingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "collecting" => Ok(Self::Collecting),
            "bidding" => Ok(Self::Bidding),
            "bid_review" => Ok(Self::BidReview),
            "confirmed" => Ok(Self::Confirmed),
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoopStatus {
    Forming,
    ContractorInvited,
    ContractorClaimed,
    Confirmed,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl CoopStatus {
    pub const HAPPY_PATH: [CoopStatus; 7] = [
        Self::Forming,
        Self::ContractorInvited,
        Self::ContractorClaimed,
        Self::Confirmed,
        Self::Scheduled,
        Self::InProgress,
        Self::Completed,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forming => "forming",
            Self::ContractorInvited => "contractor_invited",
            Self::ContractorClaimed => "contractor_claimed",
            Self::Confirmed => "confirmed",
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn next_on_happy_path(&self) -> Option<CoopStatus> {
        let position = Self::HAPPY_PATH.iter().position(|status| status == self)?;
        Self::HAPPY_PATH.get(position + 1).copied()
    }
}

impl FromStr for CoopStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forming" => Ok(Self::Forming),
            "contractor_invited" => Ok(Self::ContractorInvited),
            "contractor_claimed" => Ok(Self::ContractorClaimed),
            "confirmed" => Ok(Self::Confirmed),
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Submitted,
    Shortlisted,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Shortlisted => "shortlisted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl FromStr for BidStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            "shortlisted" => Ok(Self::Shortlisted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Action button offered for a bidding run. Offering an action never
/// changes the status locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAction {
    OpenSignups,
    OpenBidding,
    CloseBidding,
    ConfirmContractor,
    Schedule,
    Start,
    Complete,
}

impl RunAction {
    pub fn for_status(status: &str) -> Option<RunAction> {
        match BiddingStatus::from_str(status).ok()? {
            BiddingStatus::Draft => Some(RunAction::OpenSignups),
            BiddingStatus::Collecting => Some(RunAction::OpenBidding),
            BiddingStatus::Bidding => Some(RunAction::CloseBidding),
            BiddingStatus::BidReview => Some(RunAction::ConfirmContractor),
            BiddingStatus::Confirmed => Some(RunAction::Schedule),
            BiddingStatus::Scheduled => Some(RunAction::Start),
            BiddingStatus::InProgress => Some(RunAction::Complete),
            BiddingStatus::Completed | BiddingStatus::Cancelled => None,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            RunAction::OpenSignups => "Open Signups",
            RunAction::OpenBidding => "Open Bidding",
            RunAction::CloseBidding => "Close Bidding",
            RunAction::ConfirmContractor => "Confirm Contractor",
            RunAction::Schedule => "Schedule Run",
            RunAction::Start => "Start Run",
            RunAction::Complete => "Mark Complete",
        }
    }

    /// Status the server is asked to move the run into.
    pub const fn target(&self) -> BiddingStatus {
        match self {
            RunAction::OpenSignups => BiddingStatus::Collecting,
            RunAction::OpenBidding => BiddingStatus::Bidding,
            RunAction::CloseBidding => BiddingStatus::BidReview,
            RunAction::ConfirmContractor => BiddingStatus::Confirmed,
            RunAction::Schedule => BiddingStatus::Scheduled,
            RunAction::Start => BiddingStatus::InProgress,
            RunAction::Complete => BiddingStatus::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_labels_and_variants() {
        assert_eq!(BIDDING_RUN_STATUS.label("bid_review"), "Reviewing Bids");
        assert_eq!(BIDDING_RUN_STATUS.variant("cancelled"), Variant::Danger);
        assert_eq!(COOP_RUN_STATUS.label("contractor_claimed"), "Contractor Claimed");
        assert_eq!(BID_STATUS.variant("accepted"), Variant::Success);
    }

    #[test]
    fn unknown_codes_fall_back_to_raw_string_and_default() {
        for table in [
            &BIDDING_RUN_STATUS,
            &COOP_RUN_STATUS,
            &BID_STATUS,
            &SLOT_STATUS,
            &FLEET_STATUS,
            &BOOKING_STATUS,
        ] {
            assert_eq!(table.label("on_hold"), "on_hold");
            assert_eq!(table.variant("on_hold"), Variant::Default);
            assert_eq!(table.label(""), "");
        }
    }

    #[test]
    fn unknown_code_is_a_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(BidStatus::from_str("withdrawn").unwrap_err());
        assert_eq!(err.to_string(), "unknown status `withdrawn`");
        assert_eq!(
            CoopStatus::from_str("forming_soon"),
            Err(UnknownStatus("forming_soon".to_string()))
        );
    }

    #[test]
    fn coop_table_keeps_bidding_codes() {
        for code in ["draft", "collecting", "bidding", "bid_review"] {
            assert!(COOP_RUN_STATUS.lookup(code).is_some(), "{code}");
        }
        assert!(CoopStatus::from_str("bidding").is_err());
    }

    #[test]
    fn every_enum_code_is_in_its_table() {
        for status in BiddingStatus::HAPPY_PATH
            .iter()
            .chain([BiddingStatus::Cancelled].iter())
        {
            assert!(BIDDING_RUN_STATUS.lookup(status.as_str()).is_some());
            assert_eq!(BiddingStatus::from_str(status.as_str()), Ok(*status));
        }
        for status in CoopStatus::HAPPY_PATH
            .iter()
            .chain([CoopStatus::Cancelled].iter())
        {
            assert!(COOP_RUN_STATUS.lookup(status.as_str()).is_some());
        }
    }

    #[test]
    fn happy_path_walks_in_order() {
        let mut walked = vec![BiddingStatus::Draft];
        while let Some(next) = walked.last().and_then(BiddingStatus::next_on_happy_path) {
            walked.push(next);
        }
        assert_eq!(walked, BiddingStatus::HAPPY_PATH.to_vec());
        assert_eq!(BiddingStatus::Cancelled.next_on_happy_path(), None);
    }

    #[test]
    fn only_non_terminal_runs_can_be_cancelled() {
        assert!(BiddingStatus::BidReview.can_cancel());
        assert!(!BiddingStatus::Completed.can_cancel());
        assert!(!BiddingStatus::Cancelled.can_cancel());
        assert!(BidStatus::Rejected.is_terminal());
        assert!(!BidStatus::Shortlisted.is_terminal());
    }

    #[test]
    fn offered_action_matches_next_status() {
        for status in BiddingStatus::HAPPY_PATH {
            let action = RunAction::for_status(status.as_str());
            assert_eq!(action.map(|a| a.target()), status.next_on_happy_path());
        }
        assert_eq!(RunAction::for_status("cancelled"), None);
        assert_eq!(RunAction::for_status("archived"), None);
    }
}
