//! Template invariants.

use super::error::LedgerError;
use super::types::{Frequency, Transaction};

/// Checks the invariants the expander relies on.
///
/// - `repeat_settings` is present iff the frequency is `REPEAT`
/// - REPEAT settings have `1 <= initial_installment <= count`
/// - `confirmation_date` is present iff `is_confirmed`
///
/// # Errors
///
/// Returns `LedgerError::MalformedTemplate` describing the first violation.
pub fn validate_template(template: &Transaction) -> Result<(), LedgerError> {
    match (template.frequency, &template.repeat_settings) {
        (Frequency::Repeat, None) => {
            return Err(LedgerError::malformed(
                template.id,
                "REPEAT template has no repeat settings",
            ));
        }
        (Frequency::Repeat, Some(settings)) => {
            if settings.count == 0 {
                return Err(LedgerError::malformed(
                    template.id,
                    "installment count must be at least 1",
                ));
            }
            if settings.initial_installment == 0 {
                return Err(LedgerError::malformed(
                    template.id,
                    "initial installment must be at least 1",
                ));
            }
            if settings.initial_installment > settings.count {
                return Err(LedgerError::malformed(
                    template.id,
                    format!(
                        "initial installment {} exceeds count {}",
                        settings.initial_installment, settings.count
                    ),
                ));
            }
        }
        (Frequency::None | Frequency::Recurring, Some(_)) => {
            return Err(LedgerError::malformed(
                template.id,
                format!("{} template carries repeat settings", template.frequency),
            ));
        }
        (Frequency::None | Frequency::Recurring, None) => {}
    }

    match (template.is_confirmed, template.confirmation_date) {
        (true, None) => Err(LedgerError::malformed(
            template.id,
            "confirmed template has no confirmation date",
        )),
        (false, Some(_)) => Err(LedgerError::malformed(
            template.id,
            "unconfirmed template has a confirmation date",
        )),
        _ => Ok(()),
    }
}
