//! Recurring definition lifecycle management.
//!
//! CRUD and status transitions for recurring definitions, keeping the cached
//! `next_occurrence` column consistent: it is computed at creation and
//! recomputed on any update that changes the frequency, anchor date, or end
//! date. Pausing and resuming never touch it. All operations are scoped to
//! an owner and take an explicit `as_of` reference date wherever projection
//! is involved, so the logic stays deterministic under test.

use crate::{
    core::schedule::{self, Frequency},
    entities::{RecurringDefinition, recurring_definition},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ModelTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Whether a definition produces income or an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

impl Kind {
    /// The canonical string form, matching the stored column values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(Error::Validation {
                fields: vec!["kind".to_string()],
            }),
        }
    }
}

/// Input for creating a recurring definition.
#[derive(Debug, Clone)]
pub struct DefinitionInput {
    /// Human-readable label; must be non-empty
    pub description: String,
    /// Amount per occurrence; must be strictly positive
    pub amount: Decimal,
    /// "income" or "expense"
    pub kind: String,
    /// "daily", "weekly", "monthly" or "yearly"
    pub frequency: String,
    /// Anchor date the schedule is computed from
    pub start_date: NaiveDate,
    /// Optional last date the schedule may fire on
    pub end_date: Option<NaiveDate>,
    /// Optional category; must resolve for the same user
    pub category_id: Option<i64>,
    /// Opaque payment method metadata
    pub payment_method: Option<String>,
    /// Opaque free-text notes
    pub notes: Option<String>,
    /// Whether the definition starts active
    pub active: bool,
}

/// Partial update for an existing definition. `None` leaves a field
/// untouched; the nested `Option` on nullable columns distinguishes
/// "set to null" from "leave alone".
#[derive(Debug, Clone, Default)]
pub struct DefinitionPatch {
    /// New label
    pub description: Option<String>,
    /// New amount
    pub amount: Option<Decimal>,
    /// New kind
    pub kind: Option<String>,
    /// New frequency
    pub frequency: Option<String>,
    /// New anchor date
    pub start_date: Option<NaiveDate>,
    /// New end date (`Some(None)` clears it)
    pub end_date: Option<Option<NaiveDate>>,
    /// New category (`Some(None)` makes the definition uncategorized)
    pub category_id: Option<Option<i64>>,
    /// New payment method
    pub payment_method: Option<Option<String>>,
    /// New notes
    pub notes: Option<Option<String>>,
    /// New active flag
    pub active: Option<bool>,
}

/// An active definition paired with its projected next occurrence,
/// as returned by [`list_upcoming`].
#[derive(Debug, Clone)]
pub struct UpcomingOccurrence {
    /// The definition that fires
    pub definition: recurring_definition::Model,
    /// The projected occurrence date
    pub next_occurrence: NaiveDate,
}

/// Monthly-equivalent income and expense totals over active definitions.
///
/// Each amount is normalized to its monthly equivalent before summation
/// (see [`Frequency::monthly_equivalent`]), so daily and yearly definitions
/// contribute comparable units instead of being summed raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotals {
    /// Sum of monthly-equivalent income amounts
    pub income: Decimal,
    /// Sum of monthly-equivalent expense amounts
    pub expenses: Decimal,
    /// income - expenses
    pub net: Decimal,
}

fn validate_input(input: &DefinitionInput) -> Result<(Kind, Frequency)> {
    let mut fields = Vec::new();

    if input.description.trim().is_empty() {
        fields.push("description".to_string());
    }
    if input.amount <= Decimal::ZERO {
        fields.push("amount".to_string());
    }
    let kind = match input.kind.parse::<Kind>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            fields.push("kind".to_string());
            None
        }
    };
    let frequency = match input.frequency.parse::<Frequency>() {
        Ok(frequency) => Some(frequency),
        Err(_) => {
            fields.push("frequency".to_string());
            None
        }
    };

    match (kind, frequency) {
        (Some(kind), Some(frequency)) if fields.is_empty() => Ok((kind, frequency)),
        _ => Err(Error::Validation { fields }),
    }
}

async fn resolve_category(db: &DatabaseConnection, user_id: i64, category_id: i64) -> Result<()> {
    crate::core::category::get_category(db, user_id, category_id)
        .await?
        .map(|_| ())
        .ok_or(Error::InvalidCategory { category_id })
}

/// Creates a recurring definition, computing its initial `next_occurrence`
/// relative to `as_of`.
///
/// Fails with [`Error::Validation`] listing every missing or malformed
/// field, or [`Error::InvalidCategory`] when the category does not resolve
/// for this user.
pub async fn create_definition(
    db: &DatabaseConnection,
    user_id: i64,
    input: DefinitionInput,
    as_of: NaiveDate,
) -> Result<recurring_definition::Model> {
    let (kind, frequency) = validate_input(&input)?;

    if let Some(category_id) = input.category_id {
        resolve_category(db, user_id, category_id).await?;
    }

    let next_occurrence =
        schedule::next_occurrence(input.start_date, frequency, as_of, input.end_date);
    let now = Utc::now().naive_utc();

    let definition = recurring_definition::ActiveModel {
        user_id: Set(user_id),
        category_id: Set(input.category_id),
        amount: Set(input.amount),
        kind: Set(kind.as_str().to_string()),
        description: Set(input.description.trim().to_string()),
        frequency: Set(frequency.as_str().to_string()),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        next_occurrence: Set(next_occurrence),
        active: Set(input.active),
        payment_method: Set(input.payment_method),
        notes: Set(input.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let stored = definition.insert(db).await?;
    debug!(
        id = stored.id,
        next_occurrence = ?stored.next_occurrence,
        "created recurring definition"
    );
    Ok(stored)
}

/// Finds a definition by id, scoped to its owner. Returns `Ok(None)` when
/// the id does not exist or belongs to another user.
pub async fn get_definition(
    db: &DatabaseConnection,
    user_id: i64,
    id: i64,
) -> Result<Option<recurring_definition::Model>> {
    RecurringDefinition::find()
        .filter(recurring_definition::Column::Id.eq(id))
        .filter(recurring_definition::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns all of a user's definitions, active and paused, ordered by the
/// cached next occurrence and then by id.
pub async fn list_definitions(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<recurring_definition::Model>> {
    RecurringDefinition::find()
        .filter(recurring_definition::Column::UserId.eq(user_id))
        .order_by_asc(recurring_definition::Column::NextOccurrence)
        .order_by_asc(recurring_definition::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Projects the next occurrence of a stored definition as of a reference
/// date, without touching the cached column.
pub fn project(
    definition: &recurring_definition::Model,
    as_of: NaiveDate,
) -> Result<Option<NaiveDate>> {
    let frequency: Frequency = definition.frequency.parse()?;
    Ok(schedule::next_occurrence(
        definition.start_date,
        frequency,
        as_of,
        definition.end_date,
    ))
}

/// Applies a partial update to an owned definition.
///
/// Recomputes `next_occurrence` only when the frequency, anchor date, or end
/// date changed; an amount or label edit leaves the schedule untouched.
/// Fails with [`Error::NotFound`] when the id does not resolve for this
/// user, [`Error::Validation`] for malformed fields, or
/// [`Error::InvalidCategory`] when a provided category does not resolve.
pub async fn update_definition(
    db: &DatabaseConnection,
    user_id: i64,
    id: i64,
    patch: DefinitionPatch,
    as_of: NaiveDate,
) -> Result<recurring_definition::Model> {
    let existing = get_definition(db, user_id, id)
        .await?
        .ok_or(Error::NotFound { id })?;

    // Validate every provided field before touching the record
    let mut fields = Vec::new();
    if let Some(description) = &patch.description {
        if description.trim().is_empty() {
            fields.push("description".to_string());
        }
    }
    if let Some(amount) = patch.amount {
        if amount <= Decimal::ZERO {
            fields.push("amount".to_string());
        }
    }
    let kind = match &patch.kind {
        Some(raw) => match raw.parse::<Kind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                fields.push("kind".to_string());
                None
            }
        },
        None => None,
    };
    let frequency_patch = match &patch.frequency {
        Some(raw) => match raw.parse::<Frequency>() {
            Ok(frequency) => Some(frequency),
            Err(_) => {
                fields.push("frequency".to_string());
                None
            }
        },
        None => None,
    };
    if !fields.is_empty() {
        return Err(Error::Validation { fields });
    }

    if let Some(Some(category_id)) = patch.category_id {
        resolve_category(db, user_id, category_id).await?;
    }

    let stored_frequency: Frequency = existing.frequency.parse()?;
    let frequency = frequency_patch.unwrap_or(stored_frequency);
    let start_date = patch.start_date.unwrap_or(existing.start_date);
    let end_date = match patch.end_date {
        Some(end_date) => end_date,
        None => existing.end_date,
    };
    let schedule_changed = frequency != stored_frequency
        || start_date != existing.start_date
        || end_date != existing.end_date;

    let mut model: recurring_definition::ActiveModel = existing.into();
    if let Some(description) = patch.description {
        model.description = Set(description.trim().to_string());
    }
    if let Some(amount) = patch.amount {
        model.amount = Set(amount);
    }
    if let Some(kind) = kind {
        model.kind = Set(kind.as_str().to_string());
    }
    if frequency_patch.is_some() {
        model.frequency = Set(frequency.as_str().to_string());
    }
    if patch.start_date.is_some() {
        model.start_date = Set(start_date);
    }
    if patch.end_date.is_some() {
        model.end_date = Set(end_date);
    }
    if let Some(category_id) = patch.category_id {
        model.category_id = Set(category_id);
    }
    if let Some(payment_method) = patch.payment_method {
        model.payment_method = Set(payment_method);
    }
    if let Some(notes) = patch.notes {
        model.notes = Set(notes);
    }
    if let Some(active) = patch.active {
        model.active = Set(active);
    }
    if schedule_changed {
        model.next_occurrence = Set(schedule::next_occurrence(
            start_date, frequency, as_of, end_date,
        ));
    }
    model.updated_at = Set(Utc::now().naive_utc());

    Ok(model.update(db).await?)
}

/// Flips a definition's active flag without recomputing its schedule, so a
/// pause/resume cycle leaves `next_occurrence` byte-for-byte unchanged.
pub async fn toggle_active(
    db: &DatabaseConnection,
    user_id: i64,
    id: i64,
    active: bool,
) -> Result<recurring_definition::Model> {
    let existing = get_definition(db, user_id, id)
        .await?
        .ok_or(Error::NotFound { id })?;

    let mut model: recurring_definition::ActiveModel = existing.into();
    model.active = Set(active);
    model.updated_at = Set(Utc::now().naive_utc());

    Ok(model.update(db).await?)
}

/// Permanently deletes an owned definition. Deleting an id that does not
/// resolve fails with [`Error::NotFound`] rather than silently succeeding,
/// so callers can audit misdirected deletes.
pub async fn delete_definition(db: &DatabaseConnection, user_id: i64, id: i64) -> Result<()> {
    let existing = get_definition(db, user_id, id)
        .await?
        .ok_or(Error::NotFound { id })?;

    existing.delete(db).await?;
    debug!(id, "deleted recurring definition");
    Ok(())
}

/// Returns active definitions with a projected occurrence on or after
/// `as_of`, sorted ascending by (next occurrence, id) and truncated to
/// `limit`. The id tie-break makes equal-date ordering deterministic.
/// Definitions whose schedule has run past their end date are skipped.
pub async fn list_upcoming(
    db: &DatabaseConnection,
    user_id: i64,
    as_of: NaiveDate,
    limit: usize,
) -> Result<Vec<UpcomingOccurrence>> {
    let definitions = RecurringDefinition::find()
        .filter(recurring_definition::Column::UserId.eq(user_id))
        .filter(recurring_definition::Column::Active.eq(true))
        .all(db)
        .await?;

    let mut upcoming = Vec::new();
    for definition in definitions {
        if let Some(next_occurrence) = project(&definition, as_of)? {
            upcoming.push(UpcomingOccurrence {
                next_occurrence,
                definition,
            });
        }
    }
    upcoming.sort_by_key(|entry| (entry.next_occurrence, entry.definition.id));
    upcoming.truncate(limit);
    Ok(upcoming)
}

/// Sums monthly-equivalent amounts over active definitions, grouped by kind.
pub async fn monthly_totals(db: &DatabaseConnection, user_id: i64) -> Result<MonthlyTotals> {
    let definitions = RecurringDefinition::find()
        .filter(recurring_definition::Column::UserId.eq(user_id))
        .filter(recurring_definition::Column::Active.eq(true))
        .all(db)
        .await?;

    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for definition in definitions {
        let frequency: Frequency = definition.frequency.parse()?;
        let kind = definition.kind.parse::<Kind>().map_err(|_| Error::Config {
            message: format!(
                "definition {} has invalid stored kind {:?}",
                definition.id, definition.kind
            ),
        })?;
        let monthly = frequency.monthly_equivalent(definition.amount);
        match kind {
            Kind::Income => income += monthly,
            Kind::Expense => expenses += monthly,
        }
    }

    Ok(MonthlyTotals {
        income,
        expenses,
        net: income - expenses,
    })
}
