use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use shared::domain::{Appointment, ContactUs, Lead, LeadId, LeadKind, NewLead, Subscription};

use crate::Storage;

/// What `mark_lead_processed` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Processed(LeadKind),
    AlreadyProcessed(LeadKind),
    NotFound,
}

fn kind_tag(kind: LeadKind) -> &'static str {
    match kind {
        LeadKind::Appointment => "appointment",
        LeadKind::ContactUs => "contact_us",
        LeadKind::Subscription => "subscription",
    }
}

fn parse_kind_tag(tag: &str) -> Result<LeadKind> {
    Ok(match tag {
        "appointment" => LeadKind::Appointment,
        "contact_us" => LeadKind::ContactUs,
        "subscription" => LeadKind::Subscription,
        other => bail!("unknown lead kind '{other}'"),
    })
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl Storage {
    /// Stores a validated submission as an unprocessed lead dated today.
    pub async fn insert_lead(&self, lead: &NewLead) -> Result<LeadId> {
        let kind = lead.kind();
        let today = today();
        let mut tx = self.pool.begin().await?;

        let rec = sqlx::query("INSERT INTO lead_ids (kind) VALUES (?) RETURNING id")
            .bind(kind_tag(kind))
            .fetch_one(&mut *tx)
            .await?;
        let id = rec.get::<i64, _>(0);

        let inserted = match lead {
            NewLead::Appointment(a) => {
                sqlx::query(
                    "INSERT INTO appointments (id, name, email, child_name, child_age, message, date, date_processing, is_processed)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)",
                )
                .bind(id)
                .bind(&a.name)
                .bind(&a.email)
                .bind(&a.child_name)
                .bind(a.child_age)
                .bind(&a.message)
                .bind(today)
                .bind(today)
                .execute(&mut *tx)
                .await
            }
            NewLead::ContactUs(c) => {
                sqlx::query(
                    "INSERT INTO contact_us (id, name, email, subject, message, date, date_processing, is_processed)
                     VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
                )
                .bind(id)
                .bind(&c.name)
                .bind(&c.email)
                .bind(&c.subject)
                .bind(&c.message)
                .bind(today)
                .bind(today)
                .execute(&mut *tx)
                .await
            }
            NewLead::Subscription(s) => {
                sqlx::query(
                    "INSERT INTO subscriptions (id, email, date, date_processing, is_processed)
                     VALUES (?, ?, ?, ?, 0)",
                )
                .bind(id)
                .bind(&s.email)
                .bind(today)
                .bind(today)
                .execute(&mut *tx)
                .await
            }
        };
        inserted.with_context(|| format!("failed to store {} lead", kind_tag(kind)))?;

        tx.commit().await?;
        Ok(LeadId(id))
    }

    /// Which table owns `id`, if any.
    pub async fn lead_kind(&self, id: LeadId) -> Result<Option<LeadKind>> {
        let row = sqlx::query("SELECT kind FROM lead_ids WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| parse_kind_tag(&r.get::<String, _>(0)))
            .transpose()
    }

    /// Flips the processed flag of the lead `id` and stamps
    /// `date_processing`. The lookup and the update share one transaction;
    /// unknown ids and already processed leads are left untouched.
    pub async fn mark_lead_processed(&self, id: LeadId) -> Result<MarkOutcome> {
        let mut tx = self.pool.begin().await?;

        // No-op write: the transaction takes the write lock up front.
        let Some(row) =
            sqlx::query("UPDATE lead_ids SET kind = kind WHERE id = ? RETURNING kind")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("failed to look up lead {}", id.0))?
        else {
            tx.commit().await?;
            return Ok(MarkOutcome::NotFound);
        };
        let kind = parse_kind_tag(&row.get::<String, _>(0))?;

        let result = sqlx::query(&format!(
            "UPDATE {} SET is_processed = 1, date_processing = ? WHERE id = ? AND is_processed = 0",
            kind.table()
        ))
        .bind(today())
        .bind(id.0)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to mark lead {} as processed", id.0))?;

        tx.commit().await?;

        Ok(if result.rows_affected() == 0 {
            MarkOutcome::AlreadyProcessed(kind)
        } else {
            MarkOutcome::Processed(kind)
        })
    }

    pub async fn list_unprocessed_appointments(&self) -> Result<Vec<Lead<Appointment>>> {
        let rows = sqlx::query(
            "SELECT id, name, email, child_name, child_age, message, date, date_processing, is_processed
             FROM appointments
             WHERE is_processed = 0
             ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| {
                lead_from_row(
                    r,
                    Appointment {
                        name: r.get("name"),
                        email: r.get("email"),
                        child_name: r.get("child_name"),
                        child_age: r.get("child_age"),
                        message: r.get("message"),
                    },
                )
            })
            .collect())
    }

    pub async fn list_unprocessed_contact_requests(&self) -> Result<Vec<Lead<ContactUs>>> {
        let rows = sqlx::query(
            "SELECT id, name, email, subject, message, date, date_processing, is_processed
             FROM contact_us
             WHERE is_processed = 0
             ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| {
                lead_from_row(
                    r,
                    ContactUs {
                        name: r.get("name"),
                        email: r.get("email"),
                        subject: r.get("subject"),
                        message: r.get("message"),
                    },
                )
            })
            .collect())
    }

    pub async fn list_unprocessed_subscriptions(&self) -> Result<Vec<Lead<Subscription>>> {
        let rows = sqlx::query(
            "SELECT id, email, date, date_processing, is_processed
             FROM subscriptions
             WHERE is_processed = 0
             ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| {
                lead_from_row(
                    r,
                    Subscription {
                        email: r.get("email"),
                    },
                )
            })
            .collect())
    }

    /// Number of stored leads of `kind`, processed or not.
    pub async fn count_leads(&self, kind: LeadKind) -> Result<i64> {
        let count = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", kind.table()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn lead_from_row<T>(r: &SqliteRow, details: T) -> Lead<T> {
    Lead {
        id: LeadId(r.get("id")),
        details,
        date: r.get("date"),
        date_processing: r.get("date_processing"),
        is_processed: r.get("is_processed"),
    }
}
