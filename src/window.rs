//! Time-bucketed aggregation
//!
//! Records are assigned to buckets by a `BucketScheme` (hour of day, day of
//! week, calendar day) and averaged per bucket. Every bucket in the scheme's
//! domain is reported, with the zero vector when no record fell into it.

use crate::error::ComputeError;
use crate::types::{Bucket, DailyStat, Emotion, EmotionRecord, EmotionVector, Summary, EMOTION_COUNT};
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Maximum number of hours reported by `peak_activity_hours`
pub const PEAK_ACTIVITY_HOURS: usize = 3;

/// A fixed partition of time into buckets
pub trait BucketScheme {
    type Key: Copy + Ord;

    /// Every bucket the scheme declares, in reporting order
    fn domain(&self) -> Vec<Self::Key>;

    /// Bucket a timestamp falls into
    fn key_for(&self, timestamp: &DateTime<Utc>) -> Self::Key;
}

/// Hour of day, 0-23
pub struct HourOfDay;

impl BucketScheme for HourOfDay {
    type Key = u32;

    fn domain(&self) -> Vec<u32> {
        (0..24).collect()
    }

    fn key_for(&self, timestamp: &DateTime<Utc>) -> u32 {
        timestamp.hour()
    }
}

/// Day of week, Monday = 0 through Sunday = 6
pub struct DayOfWeek;

impl BucketScheme for DayOfWeek {
    type Key = u32;

    fn domain(&self) -> Vec<u32> {
        (0..7).collect()
    }

    fn key_for(&self, timestamp: &DateTime<Utc>) -> u32 {
        timestamp.weekday().num_days_from_monday()
    }
}

/// Calendar days of an inclusive date range.
///
/// Records outside the range belong to no bucket and are skipped.
pub struct CalendarDay {
    start: NaiveDate,
    end: NaiveDate,
}

impl CalendarDay {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ComputeError> {
        if end < start {
            return Err(ComputeError::InvalidDateRange(format!(
                "end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl BucketScheme for CalendarDay {
    type Key = NaiveDate;

    fn domain(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take_while(|d| *d <= self.end).collect()
    }

    fn key_for(&self, timestamp: &DateTime<Utc>) -> NaiveDate {
        timestamp.date_naive()
    }
}

#[derive(Default)]
struct Accumulator {
    sums: [f64; EMOTION_COUNT],
    count: usize,
}

impl Accumulator {
    fn add(&mut self, vector: &EmotionVector) {
        for (sum, value) in self.sums.iter_mut().zip(vector.values()) {
            *sum += value;
        }
        self.count += 1;
    }

    fn average(&self) -> EmotionVector {
        if self.count == 0 {
            EmotionVector::zero()
        } else {
            EmotionVector::from_sums(self.sums, self.count)
        }
    }
}

/// Aggregator for bucketed averages, summaries and daily statistics
pub struct WindowAggregator;

impl WindowAggregator {
    /// Average records per bucket of `scheme`; all domain buckets are returned
    pub fn aggregate<S: BucketScheme>(scheme: &S, records: &[EmotionRecord]) -> Vec<Bucket<S::Key>> {
        let domain = scheme.domain();
        let mut buckets: BTreeMap<S::Key, Accumulator> =
            domain.iter().map(|k| (*k, Accumulator::default())).collect();

        for record in records {
            if let Some(acc) = buckets.get_mut(&scheme.key_for(&record.timestamp)) {
                acc.add(&record.emotions);
            }
        }

        domain
            .into_iter()
            .map(|key| {
                let (count, emotions) = buckets
                    .get(&key)
                    .map(|acc| (acc.count, acc.average()))
                    .unwrap_or_else(|| (0, EmotionVector::zero()));
                Bucket {
                    key,
                    count,
                    emotions,
                }
            })
            .collect()
    }

    /// Averages per hour of day (24 buckets)
    pub fn by_hour(records: &[EmotionRecord]) -> Vec<Bucket<u32>> {
        Self::aggregate(&HourOfDay, records)
    }

    /// Averages per weekday (7 buckets, Monday = 0)
    pub fn by_weekday(records: &[EmotionRecord]) -> Vec<Bucket<u32>> {
        Self::aggregate(&DayOfWeek, records)
    }

    /// Averages per calendar day of the inclusive range
    pub fn by_date(
        records: &[EmotionRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bucket<NaiveDate>>, ComputeError> {
        let scheme = CalendarDay::new(start, end)?;
        Ok(Self::aggregate(&scheme, records))
    }

    /// Totals, overall average and dominant emotion of a record set
    pub fn summarize(records: &[EmotionRecord]) -> Summary {
        let mut acc = Accumulator::default();
        let mut sessions = HashSet::new();
        for record in records {
            acc.add(&record.emotions);
            sessions.insert(record.session_id.as_str());
        }

        let average_emotions = acc.average();
        let dominant_emotion = if average_emotions.values().iter().any(|v| *v > 0.0) {
            average_emotions.dominant().0
        } else {
            Emotion::Neutral
        };

        Summary {
            total_detections: records.len(),
            average_emotions,
            dominant_emotion,
            session_count: sessions.len(),
            first_timestamp: records.iter().map(|r| r.timestamp).min(),
            last_timestamp: records.iter().map(|r| r.timestamp).max(),
        }
    }

    /// Detection counts, sessions, dominant emotion and mean confidence per day
    pub fn daily_stats(
        records: &[EmotionRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStat>, ComputeError> {
        let scheme = CalendarDay::new(start, end)?;

        let mut by_day: HashMap<NaiveDate, Vec<&EmotionRecord>> = HashMap::new();
        for record in records {
            by_day
                .entry(scheme.key_for(&record.timestamp))
                .or_default()
                .push(record);
        }

        let stats = scheme
            .domain()
            .into_iter()
            .map(|date| {
                let day = by_day.get(&date).map(Vec::as_slice).unwrap_or(&[]);
                if day.is_empty() {
                    return DailyStat {
                        date,
                        detections: 0,
                        sessions: 0,
                        dominant_emotion: Emotion::Neutral,
                        average_confidence: 0.0,
                    };
                }

                let mut counts = [0usize; EMOTION_COUNT];
                let mut confidence_sum = 0.0;
                let mut sessions = HashSet::new();
                for record in day {
                    counts[record.emotions.dominant().0 as usize] += 1;
                    confidence_sum += record.max_confidence();
                    sessions.insert(record.session_id.as_str());
                }

                DailyStat {
                    date,
                    detections: day.len(),
                    sessions: sessions.len(),
                    dominant_emotion: most_frequent(&counts),
                    average_confidence: confidence_sum / day.len() as f64,
                }
            })
            .collect();

        Ok(stats)
    }

    /// Hours of day with the most records, count descending, ties by first appearance
    pub fn peak_activity_hours(records: &[EmotionRecord]) -> Vec<u32> {
        let mut order: Vec<u32> = Vec::new();
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for record in records {
            let hour = record.timestamp.hour();
            let count = counts.entry(hour).or_insert(0);
            if *count == 0 {
                order.push(hour);
            }
            *count += 1;
        }

        // stable sort keeps first-appearance order among equal counts
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.truncate(PEAK_ACTIVITY_HOURS);
        order
    }
}

fn most_frequent(counts: &[usize; EMOTION_COUNT]) -> Emotion {
    let mut best = Emotion::ALL[0];
    for emotion in Emotion::ALL.into_iter().skip(1) {
        if counts[emotion as usize] > counts[best as usize] {
            best = emotion;
        }
    }
    best
}
