use bson::DateTime;
use retreats_db::models::{Booking, BookingStatus};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Upcoming,
    Confirmed,
    Completed,
    Canceled,
    Unconfirmed,
    Unknown,
}

/// Picks the lifecycle bucket for a booking. Rules are checked in order and
/// the first match wins, so a cancelled booking never counts as upcoming.
pub fn classify(status: Option<&BookingStatus>, start: DateTime, now: DateTime) -> Bucket {
    match status {
        Some(BookingStatus::Cancelled) => Bucket::Canceled,
        Some(BookingStatus::Confirmed) if start >= now => Bucket::Upcoming,
        Some(BookingStatus::Completed) => Bucket::Completed,
        Some(BookingStatus::Confirmed) => Bucket::Confirmed,
        None => Bucket::Unconfirmed,
        Some(s) if s.is_empty() => Bucket::Unconfirmed,
        Some(_) => Bucket::Unknown,
    }
}

/// Anything carrying a booking status and a start date.
pub trait Categorize {
    fn status(&self) -> Option<&BookingStatus>;
    fn start(&self) -> DateTime;
}

impl Categorize for Booking {
    fn status(&self) -> Option<&BookingStatus> {
        self.status.as_ref()
    }

    fn start(&self) -> DateTime {
        self.dates.start
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingBuckets<T> {
    pub upcoming: Vec<T>,
    pub confirmed: Vec<T>,
    pub completed: Vec<T>,
    pub canceled: Vec<T>,
    pub unconfirmed: Vec<T>,
    pub unknown: Vec<T>,
}

impl<T> Default for BookingBuckets<T> {
    fn default() -> Self {
        Self {
            upcoming: Vec::new(),
            confirmed: Vec::new(),
            completed: Vec::new(),
            canceled: Vec::new(),
            unconfirmed: Vec::new(),
            unknown: Vec::new(),
        }
    }
}

impl<T> BookingBuckets<T> {
    pub fn push(&mut self, bucket: Bucket, item: T) {
        let target = match bucket {
            Bucket::Upcoming => &mut self.upcoming,
            Bucket::Confirmed => &mut self.confirmed,
            Bucket::Completed => &mut self.completed,
            Bucket::Canceled => &mut self.canceled,
            Bucket::Unconfirmed => &mut self.unconfirmed,
            Bucket::Unknown => &mut self.unknown,
        };
        target.push(item);
    }

    pub fn len(&self) -> usize {
        self.upcoming.len()
            + self.confirmed.len()
            + self.completed.len()
            + self.canceled.len()
            + self.unconfirmed.len()
            + self.unknown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> BookingBuckets<U> {
        let mut convert = |items: Vec<T>| items.into_iter().map(&mut f).collect::<Vec<U>>();
        BookingBuckets {
            upcoming: convert(self.upcoming),
            confirmed: convert(self.confirmed),
            completed: convert(self.completed),
            canceled: convert(self.canceled),
            unconfirmed: convert(self.unconfirmed),
            unknown: convert(self.unknown),
        }
    }
}

/// Partitions rows into buckets, keeping the input order inside each bucket.
pub fn categorize<T: Categorize>(rows: impl IntoIterator<Item = T>, now: DateTime) -> BookingBuckets<T> {
    let mut buckets = BookingBuckets::default();
    for row in rows {
        let bucket = classify(row.status(), row.start(), now);
        buckets.push(bucket, row);
    }
    buckets
}
