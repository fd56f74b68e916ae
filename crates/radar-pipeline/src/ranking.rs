//! Daily ranking aggregation: group, rank, trend, notes, replace.
//!
//! The grouping, trend, and note logic are pure functions; only
//! [`generate_daily_ranking`] touches the database.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sqlx::PgPool;

use radar_db::{DemandInRangeRow, NewDemandRanking};

use crate::daywindow::DayWindow;
use crate::error::PipelineError;

const STRONG_DEMAND_THRESHOLD: i32 = 30;
const NOTABLE_DEMAND_THRESHOLD: i32 = 21;
const MULTI_SOURCE_THRESHOLD: i32 = 5;

/// One group of demands sharing a normalized text, with its aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandGroup {
    /// Representative demand: the first row seen for this normalized text.
    pub demand_id: i64,
    pub normalized_text: String,
    pub category: Option<String>,
    /// Number of demand rows in the group.
    pub frequency: i32,
    /// Number of distinct parent sources in the group.
    pub source_count: i32,
}

/// Day-over-day frequency trend of a ranked demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    New,
    Up,
    Down,
    Stable,
}

impl Trend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::New => "new",
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// Group demand rows by normalized text and rank by frequency.
///
/// Grouping preserves first-seen order; the sort is stable, so equal
/// frequencies keep that order. The result is truncated to `top_n`.
#[must_use]
pub fn rank_demand_groups(rows: &[DemandInRangeRow], top_n: usize) -> Vec<DemandGroup> {
    let mut groups: Vec<DemandGroup> = Vec::new();
    let mut index_by_text: HashMap<&str, usize> = HashMap::new();
    let mut sources_by_group: Vec<HashSet<i64>> = Vec::new();

    for row in rows {
        match index_by_text.get(row.normalized_text.as_str()) {
            Some(&i) => {
                groups[i].frequency += 1;
                if groups[i].category.is_none() {
                    groups[i].category.clone_from(&row.category);
                }
                sources_by_group[i].insert(row.source_id);
            }
            None => {
                index_by_text.insert(row.normalized_text.as_str(), groups.len());
                groups.push(DemandGroup {
                    demand_id: row.id,
                    normalized_text: row.normalized_text.clone(),
                    category: row.category.clone(),
                    frequency: 1,
                    source_count: 0,
                });
                sources_by_group.push(HashSet::from([row.source_id]));
            }
        }
    }

    for (group, sources) in groups.iter_mut().zip(&sources_by_group) {
        group.source_count = i32::try_from(sources.len()).unwrap_or(i32::MAX);
    }

    groups.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    groups.truncate(top_n);
    groups
}

/// Classify today's frequency against yesterday's ranking entry for the
/// same demand identity.
#[must_use]
pub fn classify_trend(today_frequency: i32, yesterday_frequency: Option<i32>) -> Trend {
    match yesterday_frequency {
        None => Trend::New,
        Some(y) if today_frequency > y => Trend::Up,
        Some(y) if today_frequency < y => Trend::Down,
        Some(_) => Trend::Stable,
    }
}

/// Synthesize the free-text notes for one ranked group.
#[must_use]
pub fn build_notes(frequency: i32, source_count: i32, category: Option<&str>) -> Option<String> {
    let mut notes: Vec<String> = Vec::new();

    if frequency > STRONG_DEMAND_THRESHOLD {
        notes.push("strong demand".to_string());
    } else if frequency >= NOTABLE_DEMAND_THRESHOLD {
        notes.push("notable demand".to_string());
    }

    if let Some(category) = category {
        notes.push(format!("category: {category}"));
    }

    if source_count > MULTI_SOURCE_THRESHOLD {
        notes.push("seen across multiple sources".to_string());
    }

    if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    }
}

/// Build the insert rows for ranked groups: rank positions assigned
/// contiguously from 1 in group order, trend classified against
/// yesterday's frequency for the same normalized text, notes synthesized
/// from the group's aggregates.
#[must_use]
pub fn build_ranking_rows(
    groups: &[DemandGroup],
    yesterday_frequency: &HashMap<String, i32>,
) -> Vec<NewDemandRanking> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let previous = yesterday_frequency.get(group.normalized_text.as_str()).copied();
            let trend = classify_trend(group.frequency, previous);
            let notes = build_notes(group.frequency, group.source_count, group.category.as_deref());

            NewDemandRanking {
                demand_id: group.demand_id,
                normalized_text: group.normalized_text.clone(),
                rank: i32::try_from(i + 1).unwrap_or(i32::MAX),
                frequency: group.frequency,
                source_count: group.source_count,
                trend: trend.as_str().to_string(),
                notes,
            }
        })
        .collect()
}

/// Generate and publish the ranking for `day`.
///
/// Loads the day's extracted demands, groups and ranks them, classifies
/// each group's trend against the previous day's entry for the same
/// normalized text, and replaces the day's ranking set wholesale. The
/// replace runs even when the day has no demands, so stale rows from an
/// earlier run never outlive their source data. Returns the number of
/// ranking rows published.
///
/// Single-writer per day: the replace transaction holds a per-day advisory
/// lock (see `radar_db::rankings`).
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if any persistence call fails.
pub async fn generate_daily_ranking(
    pool: &PgPool,
    day: NaiveDate,
    window: DayWindow,
    top_n: usize,
) -> Result<usize, PipelineError> {
    let (start, end) = window.day_range(day);
    let rows = radar_db::find_demands_in_range(pool, start, end).await?;

    if rows.is_empty() {
        tracing::info!(%day, "no extracted demands for day, clearing any stale ranking");
        radar_db::replace_rankings_for_day(pool, day, &[]).await?;
        return Ok(0);
    }

    let groups = rank_demand_groups(&rows, top_n);

    let mut yesterday_frequency: HashMap<String, i32> = HashMap::new();
    if let Some(yesterday) = day.pred_opt() {
        for group in &groups {
            if let Some(previous) =
                radar_db::find_ranking_for_day(pool, yesterday, &group.normalized_text).await?
            {
                yesterday_frequency.insert(group.normalized_text.clone(), previous.frequency);
            }
        }
    }

    let rankings = build_ranking_rows(&groups, &yesterday_frequency);
    let count = radar_db::replace_rankings_for_day(pool, day, &rankings).await?;

    tracing::info!(%day, rankings = count, demands = rows.len(), "published daily ranking");

    Ok(count)
}
