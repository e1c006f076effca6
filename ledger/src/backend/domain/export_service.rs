//! CSV exports for admin dashboards: the challan register and the
//! collection overview.

use anyhow::{anyhow, Context, Result};
use csv::Writer;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::backend::domain::commands::collections::CollectionOverview;
use crate::backend::domain::models::{Challan, ClassCollectionSummary};

#[derive(Serialize)]
struct ChallanExportRow<'a> {
    challan_no: &'a str,
    student_id: &'a str,
    class: &'a str,
    period: String,
    issue_date: String,
    due_date: String,
    total_amount: String,
    discount_amount: String,
    net_amount: String,
    status: &'static str,
    paid_date: String,
    payment_method: &'static str,
    discounts: String,
}

#[derive(Serialize)]
struct CollectionExportRow<'a> {
    class: &'a str,
    total_students: usize,
    total_collectable: String,
    total_collected: String,
    total_pending: String,
    defaulters_count: usize,
    collection_percentage: u32,
}

impl<'a> CollectionExportRow<'a> {
    fn from_class(summary: &'a ClassCollectionSummary) -> Self {
        Self {
            class: &summary.class_name,
            total_students: summary.total_students,
            total_collectable: summary.total_collectable.round_dp(2).to_string(),
            total_collected: summary.total_collected.round_dp(2).to_string(),
            total_pending: summary.total_pending.round_dp(2).to_string(),
            defaulters_count: summary.defaulters_count,
            collection_percentage: summary.collection_percentage(),
        }
    }
}

/// Export service that renders ledger data as CSV
#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// One row per challan, in the order given
    pub fn challans_csv(&self, challans: &[Challan]) -> Result<String> {
        let mut writer = Writer::from_writer(Vec::new());
        for challan in challans {
            let discounts = challan
                .applied_discounts
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            writer.serialize(ChallanExportRow {
                challan_no: &challan.challan_no,
                student_id: &challan.student_id,
                class: &challan.class_name,
                period: challan.period.to_string(),
                issue_date: challan.issue_date.format("%Y-%m-%d").to_string(),
                due_date: challan.due_date.format("%Y-%m-%d").to_string(),
                total_amount: challan.total_amount.to_string(),
                discount_amount: challan.discount_amount.to_string(),
                net_amount: challan.net_amount.to_string(),
                status: challan.status.as_str(),
                paid_date: challan
                    .paid_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                payment_method: challan.payment_method.map(|m| m.as_str()).unwrap_or(""),
                discounts,
            })?;
        }
        into_string(writer)
    }

    /// One row per class followed by a school total row
    pub fn collections_csv(&self, overview: &CollectionOverview) -> Result<String> {
        let mut writer = Writer::from_writer(Vec::new());
        for class in &overview.classes {
            writer.serialize(CollectionExportRow::from_class(class))?;
        }
        let school = &overview.school;
        writer.serialize(CollectionExportRow {
            class: "School",
            total_students: school.total_students,
            total_collectable: school.total_collectable.round_dp(2).to_string(),
            total_collected: school.total_collected.round_dp(2).to_string(),
            total_pending: school.total_pending.round_dp(2).to_string(),
            defaulters_count: school.defaulters_count,
            collection_percentage: school.collection_percentage(),
        })?;
        into_string(writer)
    }

    pub fn write_to_path(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("Failed to write export to {}", path.display()))?;
        info!("Exported {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV export: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}
