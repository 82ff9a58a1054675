//! Business Summary Report
//!
//! Invoiced, collected and outstanding amounts alongside expenses for a
//! date range.

use chrono::NaiveDate;
use std::io::Write;

use crate::error::{SleekError, SleekResult};
use crate::models::{InvoiceStatus, Money};
use crate::services::{CategoryTotal, ExpenseService};
use crate::storage::Storage;

/// Business summary for a date range
#[derive(Debug, Clone)]
pub struct BusinessSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Totals of sent (non-draft, non-canceled) invoices issued in the range
    pub invoiced_total: Money,
    pub invoice_count: usize,
    /// Payments dated within the range
    pub collected_total: Money,
    pub payment_count: usize,
    /// Balance still owed on open invoices, regardless of issue date
    pub outstanding: Money,
    /// Open invoices past their due date as of the end of the range
    pub overdue_count: usize,
    pub expenses_total: Money,
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Collected minus expenses
    pub net: Money,
}

impl BusinessSummary {
    /// Generate the summary for `start_date..=end_date`
    pub fn generate(
        storage: &Storage,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> SleekResult<Self> {
        if end_date < start_date {
            return Err(SleekError::Validation(format!(
                "Report end date {} is before start date {}",
                end_date, start_date
            )));
        }

        let in_range = |date: NaiveDate| date >= start_date && date <= end_date;
        let invoices = storage.invoices.get_all()?;

        let mut invoiced_total = Money::zero();
        let mut invoice_count = 0;
        let mut collected_total = Money::zero();
        let mut payment_count = 0;
        let mut outstanding = Money::zero();
        let mut overdue_count = 0;

        for invoice in &invoices {
            if matches!(invoice.status, InvoiceStatus::Draft | InvoiceStatus::Canceled) {
                continue;
            }

            if in_range(invoice.issue_date) {
                invoiced_total += invoice.total();
                invoice_count += 1;
            }

            for payment in invoice.payments.iter().filter(|p| in_range(p.date)) {
                collected_total += payment.amount;
                payment_count += 1;
            }

            if invoice.status.is_open() {
                outstanding += invoice.balance_due();
                if invoice.status == InvoiceStatus::Overdue || invoice.is_past_due(end_date) {
                    overdue_count += 1;
                }
            }
        }

        let expenses_by_category =
            ExpenseService::new(storage).totals_by_category(Some(start_date), Some(end_date))?;
        let expenses_total: Money = expenses_by_category.iter().map(|c| c.total).sum();

        Ok(Self {
            start_date,
            end_date,
            invoiced_total,
            invoice_count,
            collected_total,
            payment_count,
            outstanding,
            overdue_count,
            expenses_total,
            expenses_by_category,
            net: collected_total - expenses_total,
        })
    }

    /// Format for terminal display
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(currency_symbol);
        let mut output = String::new();

        output.push_str(&format!(
            "Business Summary: {} to {}\n",
            self.start_date, self.end_date
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output.push_str(&format!(
            "{:<30} {:>15} {:>8}\n",
            "Invoiced",
            money(self.invoiced_total),
            self.invoice_count
        ));
        output.push_str(&format!(
            "{:<30} {:>15} {:>8}\n",
            "Collected",
            money(self.collected_total),
            self.payment_count
        ));
        output.push_str(&format!(
            "{:<30} {:>15}\n",
            "Outstanding",
            money(self.outstanding)
        ));
        output.push_str(&format!("{:<30} {:>15}\n", "Overdue invoices", self.overdue_count));

        output.push_str(&format!("\n{:<30} {:>15} {:>8}\n", "Expenses", "Amount", "Count"));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        if self.expenses_by_category.is_empty() {
            output.push_str("  (no expenses)\n");
        }
        for category in &self.expenses_by_category {
            output.push_str(&format!(
                "  {:<28} {:>15} {:>8}\n",
                category.name,
                money(category.total),
                category.count
            ));
        }
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<30} {:>15}\n",
            "Total Expenses",
            money(self.expenses_total)
        ));

        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("{:<30} {:>15}\n", "NET", money(self.net)));

        output
    }

    /// Export the summary as two-column CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> SleekResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| SleekError::Export(e.to_string());

        wtr.write_record(["Metric", "Value"]).map_err(export_err)?;

        let rows = [
            ("start_date", self.start_date.to_string()),
            ("end_date", self.end_date.to_string()),
            ("invoiced_total", self.invoiced_total.to_string()),
            ("invoice_count", self.invoice_count.to_string()),
            ("collected_total", self.collected_total.to_string()),
            ("outstanding", self.outstanding.to_string()),
            ("overdue_count", self.overdue_count.to_string()),
            ("expenses_total", self.expenses_total.to_string()),
            ("net", self.net.to_string()),
        ];
        for (metric, value) in rows {
            wtr.write_record([metric, value.as_str()]).map_err(export_err)?;
        }

        for category in &self.expenses_by_category {
            let metric = format!("expenses:{}", category.name);
            wtr.write_record([metric.as_str(), category.total.to_string().as_str()])
                .map_err(export_err)?;
        }

        wtr.flush().map_err(|e| SleekError::Export(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SleekPaths;
    use crate::models::{
        Client, Expense, ExpenseCategory, Invoice, LineItem, Payment, PaymentMethod,
    };
    use tempfile::TempDir;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn invoice(client: &Client, number: &str, issued: NaiveDate, cents: i64) -> Invoice {
        let due = issued + chrono::Duration::days(30);
        let mut invoice = Invoice::new(number, client.id, issued, due, "USD");
        invoice.line_items = vec![LineItem::units("Work", 1, Money::from_cents(cents))];
        invoice.status = InvoiceStatus::Sent;
        invoice
    }

    #[test]
    fn test_generate_summary() {
        let (_temp_dir, storage) = create_test_storage();
        let client = Client::new("Acme");
        storage.clients.upsert(client.clone()).unwrap();

        // Sent and partly paid in range
        let mut partial = invoice(&client, "INV-0001", date(3, 1), 100_00);
        partial
            .record_payment(Payment::new(Money::from_cents(40_00), date(3, 10), PaymentMethod::Card))
            .unwrap();
        storage.invoices.upsert(partial).unwrap();

        // Issued before the range, paid within it
        let mut earlier = invoice(&client, "INV-0002", date(1, 15), 50_00);
        earlier
            .record_payment(Payment::new(Money::from_cents(50_00), date(3, 5), PaymentMethod::Cash))
            .unwrap();
        storage.invoices.upsert(earlier).unwrap();

        // Past due by the end of the range
        storage
            .invoices
            .upsert(invoice(&client, "INV-0003", date(2, 1), 25_00))
            .unwrap();

        // Drafts do not count
        let mut draft = invoice(&client, "INV-0004", date(3, 2), 999_00);
        draft.status = InvoiceStatus::Draft;
        storage.invoices.upsert(draft).unwrap();

        let software = ExpenseCategory::new("Software");
        storage.expense_categories.upsert(software.clone()).unwrap();
        let mut subscription = Expense::new("Figma", Money::from_cents(15_00), date(3, 3));
        subscription.category_id = Some(software.id);
        storage.expenses.upsert(subscription).unwrap();
        storage
            .expenses
            .upsert(Expense::new("Cafe", Money::from_cents(5_00), date(3, 4)))
            .unwrap();
        // Outside the range
        storage
            .expenses
            .upsert(Expense::new("Old", Money::from_cents(80_00), date(1, 4)))
            .unwrap();

        let summary = BusinessSummary::generate(&storage, date(3, 1), date(3, 31)).unwrap();

        assert_eq!(summary.invoiced_total, Money::from_cents(100_00));
        assert_eq!(summary.invoice_count, 1);
        assert_eq!(summary.collected_total, Money::from_cents(90_00));
        assert_eq!(summary.payment_count, 2);
        assert_eq!(summary.outstanding, Money::from_cents(60_00 + 25_00));
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.expenses_total, Money::from_cents(20_00));
        assert_eq!(summary.expenses_by_category.len(), 2);
        assert_eq!(summary.expenses_by_category[0].name, "Software");
        assert_eq!(summary.net, Money::from_cents(70_00));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let result = BusinessSummary::generate(&storage, date(3, 31), date(3, 1));
        assert!(matches!(result, Err(SleekError::Validation(_))));
    }

    #[test]
    fn test_format_and_export() {
        let (_temp_dir, storage) = create_test_storage();
        storage
            .expenses
            .upsert(Expense::new("Cafe", Money::from_cents(12_50), date(3, 4)))
            .unwrap();

        let summary = BusinessSummary::generate(&storage, date(3, 1), date(3, 31)).unwrap();

        let text = summary.format_terminal("$");
        assert!(text.contains("Business Summary: 2024-03-01 to 2024-03-31"));
        assert!(text.contains("Uncategorized"));
        assert!(text.contains("-$12.50"));

        let mut csv_output = Vec::new();
        summary.export_csv(&mut csv_output).unwrap();
        let csv_string = String::from_utf8(csv_output).unwrap();
        assert!(csv_string.starts_with("Metric,Value\n"));
        assert!(csv_string.contains("expenses_total,12.50"));
        assert!(csv_string.contains("net,-12.50"));
    }
}
