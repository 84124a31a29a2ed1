use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

use super::{EntryId, Expense, MonthKey, RecurringExpense};

/// The in-memory bookkeeping state: the remaining budget plus the one-off and
/// recurring expense lists.
///
/// Every operation validates its inputs first and mutates only on success, so
/// a returned [`ValidationError`] guarantees the state is untouched. The
/// current month key is always passed in by the caller; the ledger itself
/// never reads the clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub remaining: f64,
    pub expenses: Vec<Expense>,
    pub recurring_expenses: Vec<RecurringExpense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a one-off expense dated `date_label` and debits the budget.
    /// The new entry is prepended so the most recent spend lists first.
    pub fn add_expense(
        &mut self,
        description: &str,
        amount_text: &str,
        date_label: impl Into<String>,
    ) -> Result<EntryId, ValidationError> {
        let description = validated_description(description)?;
        let amount = parse_positive_amount("amount", amount_text)?;
        let expense = Expense::new(description, amount, date_label);
        let id = expense.id;
        self.expenses.insert(0, expense);
        self.remaining -= amount;
        Ok(id)
    }

    /// Removes the expense and refunds its amount back into the budget.
    pub fn delete_expense(&mut self, id: EntryId) -> Result<Expense, ValidationError> {
        let position = self
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        let removed = self.expenses.remove(position);
        self.remaining += removed.amount;
        Ok(removed)
    }

    /// Replaces description and amount in place; only the amount delta moves
    /// the budget.
    pub fn edit_expense(
        &mut self,
        id: EntryId,
        description: &str,
        amount_text: &str,
    ) -> Result<(), ValidationError> {
        let description = validated_description(description)?;
        let new_amount = parse_positive_amount("amount", amount_text)?;
        let expense = self
            .expenses
            .iter_mut()
            .find(|expense| expense.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        let delta = new_amount - expense.amount;
        expense.description = description;
        expense.amount = new_amount;
        self.remaining -= delta;
        Ok(())
    }

    /// Appends a recurring expense with no paid months. Nothing is debited
    /// until the entry is toggled paid.
    pub fn add_recurring_expense(
        &mut self,
        description: &str,
        amount_text: &str,
    ) -> Result<EntryId, ValidationError> {
        let description = validated_description(description)?;
        let amount = parse_positive_amount("amount", amount_text)?;
        let recurring = RecurringExpense::new(description, amount);
        let id = recurring.id;
        self.recurring_expenses.push(recurring);
        Ok(id)
    }

    /// Removes a recurring expense, refunding its amount when the current
    /// month had already been marked paid.
    pub fn delete_recurring_expense(
        &mut self,
        id: EntryId,
        month: &MonthKey,
    ) -> Result<RecurringExpense, ValidationError> {
        let position = self
            .recurring_expenses
            .iter()
            .position(|recurring| recurring.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        let removed = self.recurring_expenses.remove(position);
        if removed.is_paid(month) {
            self.remaining += removed.amount;
        }
        Ok(removed)
    }

    /// Replaces description and amount in place. When the entry is already
    /// paid for `month`, only the amount delta moves the budget; an unpaid
    /// entry has no budget effect.
    pub fn edit_recurring_expense(
        &mut self,
        id: EntryId,
        description: &str,
        amount_text: &str,
        month: &MonthKey,
    ) -> Result<(), ValidationError> {
        let description = validated_description(description)?;
        let new_amount = parse_positive_amount("amount", amount_text)?;
        let recurring = self
            .recurring_expenses
            .iter_mut()
            .find(|recurring| recurring.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        if recurring.is_paid(month) {
            self.remaining -= new_amount - recurring.amount;
        }
        recurring.description = description;
        recurring.amount = new_amount;
        Ok(())
    }

    /// Flips the paid flag for `month`, debiting when marking paid and
    /// crediting when unmarking. Returns the new paid status.
    pub fn toggle_recurring_paid(
        &mut self,
        id: EntryId,
        month: &MonthKey,
    ) -> Result<bool, ValidationError> {
        let recurring = self
            .recurring_expenses
            .iter_mut()
            .find(|recurring| recurring.id == id)
            .ok_or(ValidationError::UnknownEntry(id))?;
        if recurring.paid_months.remove(month) {
            self.remaining += recurring.amount;
            Ok(false)
        } else {
            recurring.paid_months.insert(month.clone());
            self.remaining -= recurring.amount;
            Ok(true)
        }
    }

    /// Clears the paid flag on every recurring expense without refunding the
    /// amounts debited at toggle time: the budget carries over into the new
    /// cycle.
    pub fn reset_recurring_paid_status(&mut self) {
        for recurring in &mut self.recurring_expenses {
            recurring.paid_months.clear();
        }
    }

    /// Clears all one-off expenses and every recurring paid flag. The budget
    /// is left as-is; cleared one-off expenses are not refunded.
    pub fn full_month_reset(&mut self) {
        self.expenses.clear();
        self.reset_recurring_paid_status();
    }

    /// Applies a manual correction to the remaining budget. The delta may be
    /// negative or zero; only non-numeric input is rejected.
    pub fn adjust_remaining(&mut self, delta_text: &str) -> Result<f64, ValidationError> {
        let delta = parse_finite_amount("delta", delta_text)?;
        self.remaining += delta;
        Ok(self.remaining)
    }

    pub fn expense(&self, id: EntryId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn recurring_expense(&self, id: EntryId) -> Option<&RecurringExpense> {
        self.recurring_expenses
            .iter()
            .find(|recurring| recurring.id == id)
    }

    // Derived totals; recomputed from the lists on every call, never stored.

    pub fn one_off_total(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }

    pub fn recurring_total(&self) -> f64 {
        self.recurring_expenses
            .iter()
            .map(|recurring| recurring.amount)
            .sum()
    }

    pub fn unpaid_recurring_total(&self, month: &MonthKey) -> f64 {
        self.recurring_expenses
            .iter()
            .filter(|recurring| !recurring.is_paid(month))
            .map(|recurring| recurring.amount)
            .sum()
    }
}

fn validated_description(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("description"));
    }
    Ok(trimmed.to_string())
}

fn parse_positive_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value = parse_finite_amount(field, raw)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(value)
}

fn parse_finite_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber(field))?;
    if !value.is_finite() {
        return Err(ValidationError::NotANumber(field));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(key: &str) -> MonthKey {
        key.parse().expect("month key")
    }

    fn ledger_with_budget(remaining: f64) -> Ledger {
        Ledger {
            remaining,
            ..Ledger::default()
        }
    }

    #[test]
    fn add_expense_debits_and_prepends() {
        let mut ledger = ledger_with_budget(1000.0);
        ledger
            .add_expense("Groceries", "42.50", "29/08/2026")
            .unwrap();
        assert_eq!(ledger.remaining, 957.5);
        assert_eq!(ledger.expenses.len(), 1);
        assert_eq!(ledger.expenses[0].description, "Groceries");
        assert_eq!(ledger.expenses[0].amount, 42.5);

        ledger.add_expense("Coffee", "2.50", "29/08/2026").unwrap();
        assert_eq!(ledger.expenses[0].description, "Coffee");
    }

    #[test]
    fn add_expense_trims_the_description() {
        let mut ledger = Ledger::new();
        ledger.add_expense("  Fuel  ", "30", "01/09/2026").unwrap();
        assert_eq!(ledger.expenses[0].description, "Fuel");
    }

    #[test]
    fn delete_expense_is_the_inverse_of_add() {
        let mut ledger = ledger_with_budget(500.0);
        let id = ledger
            .add_expense("Cinema", "12.25", "02/09/2026")
            .unwrap();
        assert_eq!(ledger.remaining, 487.75);

        let removed = ledger.delete_expense(id).unwrap();
        assert_eq!(removed.description, "Cinema");
        assert_eq!(ledger.remaining, 500.0);
        assert!(ledger.expenses.is_empty());
    }

    #[test]
    fn delete_expense_rejects_unknown_id() {
        let mut ledger = ledger_with_budget(500.0);
        let missing = EntryId::from_raw(404);
        let err = ledger.delete_expense(missing).unwrap_err();
        assert_eq!(err, ValidationError::UnknownEntry(missing));
        assert_eq!(ledger.remaining, 500.0);
    }

    #[test]
    fn edit_expense_applies_only_the_amount_delta() {
        let mut ledger = ledger_with_budget(100.0);
        let id = ledger.add_expense("Lunch", "10", "03/09/2026").unwrap();
        assert_eq!(ledger.remaining, 90.0);

        ledger.edit_expense(id, "Lunch", "12.50").unwrap();
        assert_eq!(ledger.remaining, 87.5);
        assert_eq!(ledger.expense(id).unwrap().amount, 12.5);
    }

    #[test]
    fn edit_expense_description_only_leaves_budget_unchanged() {
        let mut ledger = ledger_with_budget(100.0);
        let id = ledger.add_expense("Lnch", "10", "03/09/2026").unwrap();
        let before = ledger.remaining;

        ledger.edit_expense(id, "Lunch", "10").unwrap();
        assert_eq!(ledger.remaining, before);
        assert_eq!(ledger.expense(id).unwrap().description, "Lunch");
    }

    #[test]
    fn edit_expense_validation_failure_leaves_state_untouched() {
        let mut ledger = ledger_with_budget(100.0);
        let id = ledger.add_expense("Lunch", "10", "03/09/2026").unwrap();

        let err = ledger.edit_expense(id, "Lunch", "-3").unwrap_err();
        assert_eq!(err, ValidationError::NotPositive("amount"));
        assert_eq!(ledger.remaining, 90.0);
        assert_eq!(ledger.expense(id).unwrap().amount, 10.0);
    }

    #[test]
    fn add_recurring_expense_has_no_budget_effect() {
        let mut ledger = ledger_with_budget(1000.0);
        let id = ledger.add_recurring_expense("Rent", "800").unwrap();
        assert_eq!(ledger.remaining, 1000.0);
        let recurring = ledger.recurring_expense(id).unwrap();
        assert!(recurring.paid_months.is_empty());
    }

    #[test]
    fn toggle_recurring_paid_is_its_own_inverse() {
        let mut ledger = ledger_with_budget(1000.0);
        let id = ledger.add_recurring_expense("Rent", "800").unwrap();
        let cycle = month("2026-08");

        assert!(ledger.toggle_recurring_paid(id, &cycle).unwrap());
        assert_eq!(ledger.remaining, 200.0);
        assert!(ledger.recurring_expense(id).unwrap().is_paid(&cycle));

        assert!(!ledger.toggle_recurring_paid(id, &cycle).unwrap());
        assert_eq!(ledger.remaining, 1000.0);
        assert!(!ledger.recurring_expense(id).unwrap().is_paid(&cycle));
    }

    #[test]
    fn toggle_tracks_months_independently() {
        let mut ledger = ledger_with_budget(100.0);
        let id = ledger.add_recurring_expense("Gym", "25").unwrap();

        ledger.toggle_recurring_paid(id, &month("2026-07")).unwrap();
        ledger.toggle_recurring_paid(id, &month("2026-08")).unwrap();
        assert_eq!(ledger.remaining, 50.0);
        let recurring = ledger.recurring_expense(id).unwrap();
        assert!(recurring.is_paid(&month("2026-07")));
        assert!(recurring.is_paid(&month("2026-08")));
    }

    #[test]
    fn edit_paid_recurring_applies_only_the_delta() {
        let mut ledger = ledger_with_budget(1000.0);
        let id = ledger.add_recurring_expense("Rent", "800").unwrap();
        let cycle = month("2026-08");
        ledger.toggle_recurring_paid(id, &cycle).unwrap();
        assert_eq!(ledger.remaining, 200.0);

        ledger
            .edit_recurring_expense(id, "Rent", "850", &cycle)
            .unwrap();
        assert_eq!(ledger.remaining, 150.0);
        assert_eq!(ledger.recurring_expense(id).unwrap().amount, 850.0);
    }

    #[test]
    fn edit_unpaid_recurring_has_no_budget_effect() {
        let mut ledger = ledger_with_budget(1000.0);
        let id = ledger.add_recurring_expense("Rent", "800").unwrap();

        ledger
            .edit_recurring_expense(id, "Rent", "850", &month("2026-08"))
            .unwrap();
        assert_eq!(ledger.remaining, 1000.0);
        assert_eq!(ledger.recurring_expense(id).unwrap().amount, 850.0);
    }

    #[test]
    fn delete_paid_recurring_refunds_the_current_month() {
        let mut ledger = ledger_with_budget(1000.0);
        let id = ledger.add_recurring_expense("Insurance", "60").unwrap();
        let cycle = month("2026-08");
        ledger.toggle_recurring_paid(id, &cycle).unwrap();
        assert_eq!(ledger.remaining, 940.0);

        ledger.delete_recurring_expense(id, &cycle).unwrap();
        assert_eq!(ledger.remaining, 1000.0);
        assert!(ledger.recurring_expenses.is_empty());
    }

    #[test]
    fn delete_unpaid_recurring_does_not_refund() {
        let mut ledger = ledger_with_budget(1000.0);
        let id = ledger.add_recurring_expense("Insurance", "60").unwrap();
        ledger
            .delete_recurring_expense(id, &month("2026-08"))
            .unwrap();
        assert_eq!(ledger.remaining, 1000.0);
    }

    #[test]
    fn delete_recurring_paid_in_another_month_does_not_refund() {
        let mut ledger = ledger_with_budget(1000.0);
        let id = ledger.add_recurring_expense("Insurance", "60").unwrap();
        ledger.toggle_recurring_paid(id, &month("2026-07")).unwrap();
        assert_eq!(ledger.remaining, 940.0);

        ledger
            .delete_recurring_expense(id, &month("2026-08"))
            .unwrap();
        assert_eq!(ledger.remaining, 940.0);
    }

    #[test]
    fn reset_recurring_paid_status_clears_flags_without_refunding() {
        let mut ledger = ledger_with_budget(1000.0);
        let rent = ledger.add_recurring_expense("Rent", "800").unwrap();
        let gym = ledger.add_recurring_expense("Gym", "25").unwrap();
        let cycle = month("2026-08");
        ledger.toggle_recurring_paid(rent, &cycle).unwrap();
        assert_eq!(ledger.remaining, 200.0);

        ledger.reset_recurring_paid_status();
        assert_eq!(ledger.remaining, 200.0);
        assert!(ledger.recurring_expense(rent).unwrap().paid_months.is_empty());
        assert!(ledger.recurring_expense(gym).unwrap().paid_months.is_empty());
    }

    #[test]
    fn full_month_reset_clears_expenses_and_flags_only() {
        let mut ledger = ledger_with_budget(1000.0);
        ledger
            .add_expense("Groceries", "42.50", "29/08/2026")
            .unwrap();
        let rent = ledger.add_recurring_expense("Rent", "800").unwrap();
        let cycle = month("2026-08");
        ledger.toggle_recurring_paid(rent, &cycle).unwrap();
        let before = ledger.remaining;

        ledger.full_month_reset();
        assert!(ledger.expenses.is_empty());
        assert_eq!(ledger.recurring_expenses.len(), 1);
        assert!(ledger.recurring_expense(rent).unwrap().paid_months.is_empty());
        assert_eq!(ledger.remaining, before);
    }

    #[test]
    fn adjust_remaining_accepts_negative_and_zero_deltas() {
        let mut ledger = ledger_with_budget(100.0);
        assert_eq!(ledger.adjust_remaining("-150.5").unwrap(), -50.5);
        assert_eq!(ledger.adjust_remaining("0").unwrap(), -50.5);
        assert_eq!(ledger.adjust_remaining("50.5").unwrap(), 0.0);
    }

    #[test]
    fn adjust_remaining_rejects_non_numeric_input() {
        let mut ledger = ledger_with_budget(100.0);
        assert_eq!(
            ledger.adjust_remaining("abc").unwrap_err(),
            ValidationError::NotANumber("delta")
        );
        assert_eq!(
            ledger.adjust_remaining("inf").unwrap_err(),
            ValidationError::NotANumber("delta")
        );
        assert_eq!(ledger.remaining, 100.0);
    }

    #[test]
    fn validation_rejections_leave_state_untouched() {
        let mut ledger = ledger_with_budget(1000.0);

        assert_eq!(
            ledger.add_expense("", "10", "29/08/2026").unwrap_err(),
            ValidationError::Empty("description")
        );
        assert_eq!(
            ledger.add_expense("Food", "0", "29/08/2026").unwrap_err(),
            ValidationError::NotPositive("amount")
        );
        assert_eq!(
            ledger.add_expense("Food", "abc", "29/08/2026").unwrap_err(),
            ValidationError::NotANumber("amount")
        );
        assert_eq!(
            ledger.add_recurring_expense("   ", "10").unwrap_err(),
            ValidationError::Empty("description")
        );

        assert_eq!(ledger.remaining, 1000.0);
        assert!(ledger.expenses.is_empty());
        assert!(ledger.recurring_expenses.is_empty());
    }

    #[test]
    fn totals_recompute_from_the_lists() {
        let mut ledger = ledger_with_budget(1000.0);
        ledger.add_expense("A", "10", "01/08/2026").unwrap();
        ledger.add_expense("B", "2.5", "02/08/2026").unwrap();
        let rent = ledger.add_recurring_expense("Rent", "800").unwrap();
        ledger.add_recurring_expense("Gym", "25").unwrap();
        let cycle = month("2026-08");
        ledger.toggle_recurring_paid(rent, &cycle).unwrap();

        assert_eq!(ledger.one_off_total(), 12.5);
        assert_eq!(ledger.recurring_total(), 825.0);
        assert_eq!(ledger.unpaid_recurring_total(&cycle), 25.0);
        assert_eq!(ledger.unpaid_recurring_total(&month("2026-09")), 825.0);
    }
}
