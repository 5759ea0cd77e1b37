//! Registry health policy and the consolidation alert.
//!
//! # Responsibility
//! - Grade registry size and merge opportunities against thresholds.
//! - Record at most one consolidation alert item per day.
//!
//! # Invariants
//! - `evaluate` is pure.
//! - The alert id is derived from the date, so re-running on the same day
//!   finds the existing alert instead of adding another.

use crate::config::HealthConfig;
use crate::error::ListsResult;
use crate::model::item::{ItemId, Priority};
use crate::repo::item_repo::ItemRepository;
use crate::repo::registry_repo::RegistryRepository;
use crate::service::item_service::{ItemService, NewItem};
use crate::service::registry_service::{NewList, RegistryService};
use crate::service::WriteMode;
use crate::similarity::MergeCandidate;
use chrono::NaiveDate;
use log::info;
use uuid::Uuid;

const MAX_LISTED_PAIRS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Ok,
    Warning,
    Critical,
    Urgent,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Urgent => "urgent",
        }
    }

    /// Process exit code: 0 healthy, 1 warning, 2 action recommended.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical | Self::Urgent => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub list_count: usize,
    pub merge_opportunities: Vec<MergeCandidate>,
    pub recommendations: Vec<String>,
}

impl HealthReport {
    /// Critical and urgent reports call for a recorded alert.
    pub fn needs_alert(&self) -> bool {
        self.status >= HealthStatus::Critical
    }
}

/// Grades `list_count` and the scored pairs against `thresholds`.
///
/// Pairs below `similar_list_threshold` are ignored. Any remaining pair
/// raises an `Ok` grade to `Warning`.
pub fn evaluate(
    list_count: usize,
    pairs: &[MergeCandidate],
    thresholds: &HealthConfig,
) -> HealthReport {
    let mut recommendations = Vec::new();
    let mut status = if list_count >= thresholds.list_count_urgent {
        recommendations.push(format!(
            "URGENT: {list_count} lists registered (threshold {}). Consolidate lists now.",
            thresholds.list_count_urgent
        ));
        HealthStatus::Urgent
    } else if list_count >= thresholds.list_count_critical {
        recommendations.push(format!(
            "CRITICAL: {list_count} lists registered (threshold {}). Review merge candidates with `scan`.",
            thresholds.list_count_critical
        ));
        HealthStatus::Critical
    } else if list_count >= thresholds.list_count_warning {
        recommendations.push(format!(
            "WARNING: {list_count} lists registered (threshold {}). Monitor list growth.",
            thresholds.list_count_warning
        ));
        HealthStatus::Warning
    } else {
        recommendations.push(format!(
            "List count healthy: {list_count} lists (critical at {}).",
            thresholds.list_count_critical
        ));
        HealthStatus::Ok
    };

    let mut merge_opportunities: Vec<MergeCandidate> = pairs
        .iter()
        .filter(|pair| pair.score >= thresholds.similar_list_threshold)
        .cloned()
        .collect();
    merge_opportunities.sort_by(|a, b| b.score.total_cmp(&a.score));

    if !merge_opportunities.is_empty() {
        if status == HealthStatus::Ok {
            status = HealthStatus::Warning;
        }
        recommendations.push(format!(
            "MERGE OPPORTUNITY: {} similar list pairs detected. Consider merging them.",
            merge_opportunities.len()
        ));
        for pair in merge_opportunities.iter().take(MAX_LISTED_PAIRS) {
            recommendations.push(format!(
                "  - '{}' <-> '{}' ({}% similar)",
                pair.first,
                pair.second,
                (pair.score * 100.0).floor() as u32
            ));
        }
    }

    HealthReport {
        status,
        list_count,
        merge_opportunities,
        recommendations,
    }
}

/// Deterministic alert id for `date`.
pub fn alert_id(date: NaiveDate) -> ItemId {
    let name = format!("lazylist.health-alert.{}", date.format("%Y-%m-%d"));
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

fn alert_request(report: &HealthReport, date: NaiveDate) -> NewItem {
    let mut body = format!(
        "Health check on {} graded the registry {} with {} lists.",
        date.format("%Y-%m-%d"),
        report.status.as_str(),
        report.list_count
    );
    for line in &report.recommendations {
        body.push('\n');
        body.push_str(line.trim());
    }
    NewItem {
        id: Some(alert_id(date)),
        title: "List consolidation recommended".to_string(),
        body: Some(body),
        tags: vec![
            "lists".to_string(),
            "consolidation".to_string(),
            "maintenance".to_string(),
        ],
        priority: Some(Priority::Medium),
        ..NewItem::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    Created(ItemId),
    AlreadyRecorded(ItemId),
    NotNeeded,
}

/// Records today's alert into `alert_list` when `report` needs one,
/// creating the list first if it is not registered.
pub fn record_alert<R, I>(
    report: &HealthReport,
    registry_service: &RegistryService<R, I>,
    items: I,
    alert_list: &str,
    date: NaiveDate,
    mode: WriteMode,
) -> ListsResult<AlertOutcome>
where
    R: RegistryRepository,
    I: ItemRepository + Clone,
{
    if !report.needs_alert() {
        return Ok(AlertOutcome::NotNeeded);
    }
    let id = alert_id(date);

    let mut registry = registry_service.load()?;
    if !registry.contains(alert_list) {
        registry_service.create(
            &NewList {
                slug: alert_list.to_string(),
                title: "System Upgrades".to_string(),
                tags: Vec::new(),
            },
            mode,
        )?;
        if !mode.is_live() {
            info!(
                "event=health_alert module=health status=dry_run alert_list={alert_list} list_created=false"
            );
            return Ok(AlertOutcome::Created(id));
        }
        registry = registry_service.load()?;
    }

    let service = ItemService::new(registry, items, 1);
    if service
        .list_items(alert_list)?
        .iter()
        .any(|item| item.id == id)
    {
        info!("event=health_alert module=health status=skip reason=exists alert_id={id}");
        return Ok(AlertOutcome::AlreadyRecorded(id));
    }
    service.add(Some(alert_list), alert_request(report, date), mode)?;
    info!(
        "event=health_alert module=health status=ok alert_id={id} alert_list={alert_list} mode={}",
        mode.as_str()
    );
    Ok(AlertOutcome::Created(id))
}
