//! Daily aggregation of 3-hourly forecast samples.

use chrono::{Datelike, NaiveDate};

use crate::model::{DailySummary, ForecastSample};

/// Number of days kept when the caller has no preference.
pub const DEFAULT_HORIZON_DAYS: usize = 5;

/// Icon used when the representative sample carries no condition.
/// Arbitrary; it does not claim the sky is clear.
pub const DEFAULT_ICON: &str = "01d";

/// Samples sharing one calendar date, in input order. Never empty.
#[derive(Debug)]
struct Bucket<'a> {
    date: NaiveDate,
    samples: Vec<&'a ForecastSample>,
}

impl<'a> Bucket<'a> {
    /// The 12:00 sample, or the first sample of the day when there is none.
    fn representative(&self) -> &'a ForecastSample {
        self.samples
            .iter()
            .copied()
            .find(|s| s.is_midday())
            .unwrap_or(self.samples[0])
    }

    fn summarize(&self) -> DailySummary {
        let temp_min = self
            .samples
            .iter()
            .map(|s| s.temp_min)
            .fold(f64::INFINITY, f64::min);
        let temp_max = self
            .samples
            .iter()
            .map(|s| s.temp_max)
            .fold(f64::NEG_INFINITY, f64::max);

        let rep = self.representative();
        let (description, icon) = match rep.primary_condition() {
            Some(c) => (c.description.clone(), c.icon.clone()),
            None => (String::new(), DEFAULT_ICON.to_string()),
        };

        DailySummary {
            date: self.date,
            weekday: self.date.weekday(),
            temp_min,
            temp_max,
            description,
            icon,
            humidity_pct: rep.humidity_pct,
            wind_speed: rep.wind_speed,
        }
    }
}

/// Partition samples by local calendar date. Buckets come out in the order
/// their date is first seen; samples keep input order inside a bucket.
fn group_by_date<'a>(samples: &'a [ForecastSample]) -> Vec<Bucket<'a>> {
    samples.iter().fold(Vec::<Bucket<'a>>::new(), |mut buckets, sample| {
        let date = sample.date();
        match buckets.iter_mut().find(|b| b.date == date) {
            Some(bucket) => bucket.samples.push(sample),
            None => buckets.push(Bucket {
                date,
                samples: vec![sample],
            }),
        }
        buckets
    })
}

/// Summarize `samples` into at most `horizon_days` days.
///
/// Days are emitted in first-seen order and never padded. Min/max span every
/// sample of a day; description, icon, humidity and wind come from the
/// representative sample (12:00 local, else the day's first sample).
pub fn aggregate(samples: &[ForecastSample], horizon_days: usize) -> Vec<DailySummary> {
    group_by_date(samples)
        .iter()
        .take(horizon_days)
        .map(Bucket::summarize)
        .collect()
}
