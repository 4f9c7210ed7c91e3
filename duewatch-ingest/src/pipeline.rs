//! Sequential fetch → decode → extract → aggregate.
//!
//! Per-message problems (fetch failure, undecodable body, missing fields) are
//! logged and skipped. Only listing failures and authentication errors end a
//! run early.

use duewatch_core::{
    BillAggregator, BillRecord, BillSummary, DateWindow, ExclusionKeywords, IssuerRules,
    SpendAggregator, SpendCandidate, SpendStats, SpendSummary, TransactionRecord,
};
use tracing::{debug, info, warn};

use crate::decode::MessageBodyDecoder;
use crate::error::Result;
use crate::mail::MailClient;
use crate::parsers::{extract_bill_fields, extract_transaction_fields};
use crate::types::RawMessage;

#[derive(Debug, Clone)]
pub struct BillPlan {
    pub query: String,
    pub max_results: usize,
    pub rules: IssuerRules,
}

#[derive(Debug, Clone)]
pub struct SpendPlan {
    pub query: String,
    pub max_results: usize,
    pub exclusions: ExclusionKeywords,
    pub window: Option<DateWindow>,
}

#[derive(Debug, Clone, Default)]
pub struct BillReport {
    pub summary: BillSummary,
    pub listed: usize,
    pub unclassified: usize,
    pub incomplete: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SpendReport {
    pub summary: SpendSummary,
    pub listed: usize,
    pub stats: SpendStats,
    pub failed: usize,
}

pub struct Pipeline<'c, C: MailClient> {
    client: &'c C,
    decoder: MessageBodyDecoder,
}

impl<'c, C: MailClient> Pipeline<'c, C> {
    pub fn new(client: &'c C, decoder: MessageBodyDecoder) -> Self {
        Self { client, decoder }
    }

    pub async fn bills(&self, plan: &BillPlan) -> Result<BillReport> {
        let ids = self.client.list_messages(&plan.query, plan.max_results).await?;
        info!(count = ids.len(), query = %plan.query, "listed statement mails");

        let mut report = BillReport {
            listed: ids.len(),
            ..Default::default()
        };

        let mut records: Vec<BillRecord> = Vec::new();
        for id in &ids {
            let Some(message) = self.fetch(id, &mut report.failed).await? else {
                continue;
            };

            let subject = message.subject();
            let Some(issuer) = plan.rules.classify(subject) else {
                debug!(%id, subject, "subject matches no issuer");
                report.unclassified += 1;
                continue;
            };

            let text = self.decoder.decode(&message);
            match extract_bill_fields(&text).into_record(issuer) {
                Some(record) => {
                    debug!(%id, %issuer, due = %record.due_date, "bill extracted");
                    records.push(record);
                }
                None => {
                    debug!(%id, %issuer, "statement missing amount or due date");
                    report.incomplete += 1;
                }
            }
        }

        report.summary = BillAggregator::aggregate(records);
        info!(
            issuers = report.summary.len(),
            latest_due = ?report.summary.latest_due_date(),
            "aggregated statements"
        );
        Ok(report)
    }

    pub async fn spend(&self, plan: &SpendPlan) -> Result<SpendReport> {
        if plan.window.is_some_and(|w| w.is_empty()) {
            info!("billing window is empty, nothing to fetch");
            return Ok(SpendReport::default());
        }

        let ids = self.client.list_messages(&plan.query, plan.max_results).await?;
        info!(count = ids.len(), query = %plan.query, "listed UPI alerts");

        let mut failed = 0;
        let mut observed: Vec<(String, Option<TransactionRecord>)> = Vec::with_capacity(ids.len());

        for id in &ids {
            let Some(message) = self.fetch(id, &mut failed).await? else {
                continue;
            };
            let text = self.decoder.decode(&message);
            if text.is_empty() {
                debug!(%id, "alert has no body text");
                continue;
            }
            let record = extract_transaction_fields(&text).into_record();
            observed.push((text, record));
        }

        let mut aggregator = SpendAggregator::new(plan.exclusions.clone());
        if let Some(window) = plan.window {
            aggregator = aggregator.with_window(window);
        }
        let (summary, stats) = aggregator.aggregate(observed.iter().map(|(text, record)| {
            SpendCandidate {
                source_text: text,
                record: *record,
            }
        }));
        info!(?stats, "aggregated UPI spend");

        Ok(SpendReport {
            summary,
            listed: ids.len(),
            stats,
            failed,
        })
    }

    /// `Ok(None)` for a per-message failure that should be skipped.
    async fn fetch(&self, id: &str, failed: &mut usize) -> Result<Option<RawMessage>> {
        match self.client.get_message(id).await {
            Ok(message) => Ok(Some(message)),
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!(%id, error = %e, "skipping message");
                *failed += 1;
                Ok(None)
            }
        }
    }
}
