//! Plain-text rendering of board data for the terminal.

use crate::booking::model::Booking;
use crate::fleet::model::{Trailer, Vehicle};
use crate::run::aggregate::{run_progress, RunStats, SlotProgress};
use crate::run::model::{Bid, CoopRun, Run, Slot};
use crate::status::{
    RunAction, BIDDING_RUN_STATUS, BID_STATUS, BOOKING_STATUS, COOP_RUN_STATUS, FLEET_STATUS,
    SLOT_STATUS,
};
use std::fmt::Write;

const FILLED: char = '#';
const EMPTY: char = '-';
const MIN_TICK: char = '|';

/// `[####|-----]`, with the tick placed at the minimum-slot marker.
pub fn progress_bar(progress: &SlotProgress, width: usize) -> String {
    if width == 0 {
        return "[]".to_string();
    }
    let cells = |percent: f64| ((percent / 100.0) * width as f64).round() as usize;
    let filled = cells(progress.percent).min(width);
    let tick = (progress.minimum_marker > 0.0)
        .then(|| cells(progress.minimum_marker).min(width - 1));

    let bar: String = (0..width)
        .map(|i| match tick {
            Some(t) if t == i => MIN_TICK,
            _ if i < filled => FILLED,
            _ => EMPTY,
        })
        .collect();
    format!("[{}]", bar)
}

pub fn run_card(run: &Run) -> String {
    let progress = run_progress(run);
    let mut card = format!("{} [{}]\n", run.title, BIDDING_RUN_STATUS.label(&run.status));
    let _ = writeln!(
        card,
        "  {} {}/{} slots, min {}{}",
        progress_bar(&progress, 20),
        run.current_slots,
        run.max_slots,
        run.min_slots,
        if progress.at_minimum { " (minimum met)" } else { "" }
    );
    if let Some(area) = &run.service_area {
        let _ = writeln!(card, "  Area: {}", area);
    }
    if run.total_estimated_revenue > 0.0 {
        let _ = writeln!(card, "  Est. revenue: ${:.2}", run.total_estimated_revenue);
    }
    if let Some(action) = RunAction::for_status(&run.status) {
        let _ = writeln!(card, "  Next: {}", action.label());
    }
    card
}

pub fn coop_card(coop: &CoopRun) -> String {
    let title = coop.title.as_deref().unwrap_or(&coop.trade_category);
    let mut card = format!("{} [{}]\n", title, COOP_RUN_STATUS.label(&coop.status));
    let _ = write!(card, "  Members: {}", coop.member_count());
    if coop.threshold_met {
        card.push_str(" (threshold met)");
    }
    card.push('\n');
    if let Some(share) = coop.mobilization_share {
        let _ = writeln!(card, "  Mobilization share: ${:.2}", share);
    }
    card
}

pub fn stats_line(stats: &RunStats) -> String {
    format!(
        "{} runs | {} collecting | {} bidding | {} active | {} slots | ${:.2} est. revenue | {} coops forming ({} at threshold)",
        stats.total,
        stats.collecting,
        stats.bidding,
        stats.active,
        stats.total_slots,
        stats.total_revenue,
        stats.coop_forming,
        stats.coop_threshold_met
    )
}

pub fn slot_line(slot: &Slot) -> String {
    format!(
        "{} [{}] {}",
        slot.customer_name,
        SLOT_STATUS.label(&slot.status),
        slot.property_access_type.label()
    )
}

/// `Name [Status] $mobilization + $low-$high/slot, crew of N`
pub fn bid_line(bid: &Bid) -> String {
    let mut line = format!(
        "{} [{}] ${:.2}",
        bid.contractor_name,
        BID_STATUS.label(&bid.status),
        bid.mobilization_cost
    );
    match bid.per_slot_range() {
        Some((low, high)) if low == high => {
            let _ = write!(line, " + ${:.2}/slot", low);
        }
        Some((low, high)) => {
            let _ = write!(line, " + ${:.2}-${:.2}/slot", low, high);
        }
        None => {}
    }
    let _ = write!(line, ", crew of {}", bid.crew_size);
    line
}

pub fn vehicle_line(vehicle: &Vehicle) -> String {
    format!("{} [{}]", vehicle.name, FLEET_STATUS.label(&vehicle.fleet_status))
}

pub fn trailer_line(trailer: &Trailer) -> String {
    let mut line = format!("{} [{}]", trailer.name, FLEET_STATUS.label(&trailer.fleet_status));
    if let Some(vehicle_id) = &trailer.hitched_to_vehicle_id {
        let _ = write!(line, " on {}", vehicle_id);
    }
    line
}

pub fn booking_line(booking: &Booking) -> String {
    format!(
        "{} {} to {} [{}]",
        booking.guest_name,
        booking.check_in,
        booking.check_out,
        BOOKING_STATUS.label(&booking.status)
    )
}
