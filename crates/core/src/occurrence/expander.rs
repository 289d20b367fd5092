//! Occurrence expansion.
//!
//! Turns a template into the occurrences that fall inside a window:
//! - NONE: the template itself, if its reference date is in the window
//! - RECURRING: one occurrence per calendar month touching the window (the
//!   anchor day projected onto it), or per day-based step; no installment cap
//! - REPEAT: installments `initial..=count`, each carrying `net / count`
//!
//! Installment numbers are assigned twice: `schedule_position` is the
//! absolute step in the template's schedule, `installment` is the 1-based
//! sequence over the occurrences that survived the window filter.

use cadence_shared::EngineConfig;
use chrono::{DateTime, Datelike, Timelike, Utc};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::types::{Occurrence, Window};
use crate::ledger::{
    Balance, BalanceCalculator, Frequency, LedgerError, Transaction, validate_template,
};
use crate::schedule::{
    IntervalStep, IntervalUnit, ScheduleError, add_interval, elapsed_periods, move_to_date,
    project_onto_month,
};

/// Default projection horizon for open-ended recurring templates.
pub const DEFAULT_RECURRING_HORIZON_MONTHS: u32 = 24;

/// Expands templates into occurrences.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceExpander {
    recurring_horizon_months: u32,
}

impl Default for OccurrenceExpander {
    fn default() -> Self {
        Self::new(DEFAULT_RECURRING_HORIZON_MONTHS)
    }
}

impl From<&EngineConfig> for OccurrenceExpander {
    fn from(config: &EngineConfig) -> Self {
        Self::new(config.recurring_horizon_months)
    }
}

impl OccurrenceExpander {
    /// Creates an expander projecting open-ended schedules
    /// `recurring_horizon_months` past their start.
    #[must_use]
    pub const fn new(recurring_horizon_months: u32) -> Self {
        Self {
            recurring_horizon_months,
        }
    }

    /// Returns the occurrences of `template` inside `window`, ordered by due date.
    ///
    /// An empty result means nothing falls inside the window.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MalformedTemplate` if the template breaks its
    /// invariants, or `LedgerError::Schedule` if a date overflows.
    pub fn expand(
        &self,
        template: &Transaction,
        window: Window,
    ) -> Result<Vec<Occurrence>, LedgerError> {
        validate_template(template)?;

        let occurrences = match template.frequency {
            Frequency::None => Self::expand_single(template, window),
            Frequency::Recurring => self.expand_recurring(template, window)?,
            Frequency::Repeat => Self::expand_repeat(template, window)?,
        };

        debug!(
            template_id = %template.id,
            frequency = %template.frequency,
            occurrences = occurrences.len(),
            "expanded template"
        );
        Ok(occurrences)
    }

    /// Expands every template in parallel and concatenates the results.
    ///
    /// # Errors
    ///
    /// Returns the first error any template produced.
    pub fn expand_all(
        &self,
        templates: &[Transaction],
        window: Window,
    ) -> Result<Vec<Occurrence>, LedgerError> {
        let expanded: Vec<Vec<Occurrence>> = templates
            .par_iter()
            .map(|template| self.expand(template, window))
            .collect::<Result<_, _>>()?;
        Ok(expanded.into_iter().flatten().collect())
    }

    /// Returns the occurrence at absolute schedule `position`, ignoring any window.
    ///
    /// `None` when the schedule has no such position: anything but 1 for a
    /// NONE template, or a position outside `initial..=count` for REPEAT.
    ///
    /// # Errors
    ///
    /// Same as [`Self::expand`].
    pub fn occurrence_at(
        template: &Transaction,
        position: u32,
    ) -> Result<Option<Occurrence>, LedgerError> {
        validate_template(template)?;
        if position == 0 {
            return Ok(None);
        }

        let anchor = template.anchor_date();
        let total = BalanceCalculator::settle(&template.balance, template.transaction_type);
        match (template.frequency, template.repeat_settings.as_ref()) {
            (Frequency::None, _) => Ok(Self::expand_single(template, Window::unbounded())
                .into_iter()
                .find(|_| position == 1)),
            (Frequency::Recurring, _) => {
                let unit = template.interval.unwrap_or_default();
                let due = add_interval(anchor, unit, position - 1, None)?;
                Self::materialize(template, due, position, position, total, None).map(Some)
            }
            (Frequency::Repeat, Some(settings)) => {
                if position < settings.initial_installment || position > settings.count {
                    return Ok(None);
                }
                let due = add_interval(
                    anchor,
                    settings.interval,
                    position - 1,
                    settings.custom_day_count,
                )?;
                let installment = position - settings.initial_installment + 1;
                let share = total.prorated(settings.count);
                Self::materialize(template, due, position, installment, share, Some(total))
                    .map(Some)
            }
            (Frequency::Repeat, None) => Err(LedgerError::malformed(
                template.id,
                "REPEAT template has no repeat settings",
            )),
        }
    }

    fn expand_single(template: &Transaction, window: Window) -> Vec<Occurrence> {
        if !window.contains(template.anchor_date()) {
            return Vec::new();
        }
        let balance = BalanceCalculator::settle(&template.balance, template.transaction_type);
        vec![Occurrence {
            id: template.id,
            workspace_id: template.workspace_id,
            name: template.name.clone(),
            description: template.description.clone(),
            balance,
            total_balance: None,
            transaction_type: template.transaction_type,
            frequency: template.frequency,
            repeat_settings: None,
            interval: template.interval,
            schedule_position: 1,
            installment: 1,
            due_date: template.due_date,
            registration_date: template.registration_date,
            is_confirmed: template.is_confirmed,
            confirmation_date: template.confirmation_date,
            account_id: template.account_id,
            category_id: template.category_id,
            subcategory_id: template.subcategory_id,
            tag_ids: template.tag_ids.clone(),
            main_template_id: Some(template.id),
            edit_id: None,
        }]
    }

    fn expand_recurring(
        &self,
        template: &Transaction,
        window: Window,
    ) -> Result<Vec<Occurrence>, LedgerError> {
        let anchor = template.anchor_date();
        let unit = template.interval.unwrap_or_default();
        if unit.falls_back(None) {
            warn!(template_id = %template.id, ?unit, "unsupported recurring interval, using monthly");
        }

        let dues = match unit.step(None) {
            IntervalStep::Months(months) => self.calendar_dues(anchor, months, window)?,
            IntervalStep::Days(_) => self.stepped_dues(anchor, unit, window)?,
        };

        let balance = BalanceCalculator::settle(&template.balance, template.transaction_type);
        let mut occurrences = Vec::with_capacity(dues.len());
        for (position, due) in dues {
            let installment = next_installment(&occurrences);
            occurrences.push(Self::materialize(
                template,
                due,
                position,
                installment,
                balance.clone(),
                None,
            )?);
        }
        Ok(occurrences)
    }

    /// One due date per calendar month overlapping `window`, every `months`
    /// months from the anchor's month, with the anchor's day projected onto it.
    ///
    /// A month counts as soon as any part of it lies in the window, so a
    /// window starting mid-month still yields that month's occurrence.
    fn calendar_dues(
        &self,
        anchor: DateTime<Utc>,
        months: u32,
        window: Window,
    ) -> Result<Vec<(u32, DateTime<Utc>)>, LedgerError> {
        let anchor_month = month_index(anchor);
        let first = window
            .start
            .map_or(anchor_month, |start| month_index(start).max(anchor_month));
        let last = match window.end {
            Some(end) if is_month_start(end) => month_index(end),
            Some(end) => month_index(end) + 1,
            None => first + i64::from(self.recurring_horizon_months),
        };

        let mut dues = Vec::new();
        for index in first..last {
            let offset = index - anchor_month;
            if offset % i64::from(months) != 0 {
                continue;
            }
            let out_of_range = || ScheduleError::DateOutOfRange {
                anchor,
                offset: u32::try_from(offset).unwrap_or(u32::MAX),
            };
            let year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range())?;
            let month = u32::try_from(index.rem_euclid(12) + 1).map_err(|_| out_of_range())?;
            let position = u32::try_from(offset / i64::from(months) + 1)
                .map_err(|_| out_of_range())?;
            dues.push((position, project_onto_month(anchor, year, month)?));
        }
        Ok(dues)
    }

    /// Due dates of a day-based schedule falling inside `window`.
    fn stepped_dues(
        &self,
        anchor: DateTime<Utc>,
        unit: IntervalUnit,
        window: Window,
    ) -> Result<Vec<(u32, DateTime<Utc>)>, LedgerError> {
        let end = match window.end {
            Some(end) => end,
            None => {
                let from = window.start.map_or(anchor, |start| start.max(anchor));
                add_interval(from, IntervalUnit::Monthly, self.recurring_horizon_months, None)?
            }
        };

        let mut step = match window.start {
            Some(start) if start > anchor => elapsed_periods(anchor, start, unit, None)?,
            _ => 0,
        };

        let mut dues = Vec::new();
        loop {
            let due = add_interval(anchor, unit, step, None)?;
            if due >= end {
                break;
            }
            if window.contains(due) {
                dues.push((step.saturating_add(1), due));
            }
            let Some(next) = step.checked_add(1) else {
                break;
            };
            step = next;
        }
        Ok(dues)
    }

    fn expand_repeat(
        template: &Transaction,
        window: Window,
    ) -> Result<Vec<Occurrence>, LedgerError> {
        let settings = template.repeat_settings.as_ref().ok_or_else(|| {
            LedgerError::malformed(template.id, "REPEAT template has no repeat settings")
        })?;
        if settings.interval.falls_back(settings.custom_day_count) {
            warn!(
                template_id = %template.id,
                unit = ?settings.interval,
                "unsupported repeat interval, using monthly"
            );
        }

        let anchor = template.anchor_date();
        let total = BalanceCalculator::settle(&template.balance, template.transaction_type);
        let share = total.prorated(settings.count);

        let mut occurrences = Vec::new();
        for position in settings.initial_installment..=settings.count {
            let due = add_interval(
                anchor,
                settings.interval,
                position - 1,
                settings.custom_day_count,
            )?;
            if window.end.is_some_and(|end| due >= end) {
                break;
            }
            if !window.contains(due) {
                continue;
            }
            let installment = next_installment(&occurrences);
            occurrences.push(Self::materialize(
                template,
                due,
                position,
                installment,
                share.clone(),
                Some(total.clone()),
            )?);
        }
        Ok(occurrences)
    }

    /// Builds one occurrence of `template` falling due at `due`.
    fn materialize(
        template: &Transaction,
        due: DateTime<Utc>,
        schedule_position: u32,
        installment: u32,
        balance: Balance,
        total_balance: Option<Balance>,
    ) -> Result<Occurrence, LedgerError> {
        let registration_date =
            project_onto_month(template.registration_date, due.year(), due.month())?;
        let confirmation_date = template
            .confirmation_date
            .filter(|_| template.is_confirmed)
            .map(|confirmed_at| move_to_date(confirmed_at, due.date_naive()));

        Ok(Occurrence {
            id: template.id,
            workspace_id: template.workspace_id,
            name: template.name.clone(),
            description: template.description.clone(),
            balance,
            total_balance,
            transaction_type: template.transaction_type,
            frequency: template.frequency,
            repeat_settings: template.repeat_settings.clone(),
            interval: template.interval,
            schedule_position,
            installment,
            due_date: due,
            registration_date,
            is_confirmed: template.is_confirmed,
            confirmation_date,
            account_id: template.account_id,
            category_id: template.category_id,
            subcategory_id: template.subcategory_id,
            tag_ids: template.tag_ids.clone(),
            main_template_id: Some(template.id),
            edit_id: None,
        })
    }
}

/// Months since year 0, for walking calendar months.
fn month_index(at: DateTime<Utc>) -> i64 {
    i64::from(at.year()) * 12 + i64::from(at.month0())
}

fn is_month_start(at: DateTime<Utc>) -> bool {
    at.day() == 1 && at.num_seconds_from_midnight() == 0 && at.nanosecond() == 0
}

fn next_installment(occurrences: &[Occurrence]) -> u32 {
    u32::try_from(occurrences.len()).map_or(u32::MAX, |len| len.saturating_add(1))
}

/// Expands `template` over `window` with the default horizon.
///
/// # Errors
///
/// See [`OccurrenceExpander::expand`].
pub fn expand_window(
    template: &Transaction,
    window: Window,
) -> Result<Vec<Occurrence>, LedgerError> {
    OccurrenceExpander::default().expand(template, window)
}
