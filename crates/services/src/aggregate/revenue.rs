use bson::DateTime;
use chrono::Datelike;
use retreats_db::models::BookingStatus;
use serde::Serialize;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month_name: &'static str,
    pub total_revenue: f64,
}

/// Sums amounts by the UTC calendar month of their timestamp. Index 0 is January.
pub fn monthly_totals(items: impl IntoIterator<Item = (DateTime, f64)>) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for (when, amount) in items {
        let month = when.to_chrono().month0() as usize;
        totals[month] += amount;
    }
    totals
}

pub fn revenue_by_month(totals: [f64; 12]) -> Vec<MonthlyRevenue> {
    MONTH_NAMES
        .into_iter()
        .zip(totals)
        .map(|(name, total)| MonthlyRevenue {
            month_name: name,
            total_revenue: total,
        })
        .collect()
}

/// Booking counts and revenue for a set of bookings.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub total: u64,
    pub new_bookings: u64,
    pub cancelled: u64,
    pub completed: u64,
    pub revenue: f64,
}

impl BookingSummary {
    pub fn record(&mut self, status: Option<&BookingStatus>, amount: f64) {
        self.total += 1;
        match status {
            Some(BookingStatus::Confirmed) => self.new_bookings += 1,
            Some(BookingStatus::Cancelled) => self.cancelled += 1,
            Some(BookingStatus::Completed) => self.completed += 1,
            _ => {}
        }
        self.revenue += amount;
    }
}
