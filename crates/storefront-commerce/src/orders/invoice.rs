//! Printable invoices.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::money::Money;
use crate::orders::Order;

/// Width item names are cut to on an invoice line.
const NAME_WIDTH: usize = 15;

/// A rendered invoice document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// MIME type of `body`.
    pub content_type: String,
    /// Suggested download name.
    pub file_name: String,
    pub body: String,
}

/// Turns a persisted order into a document.
pub trait InvoiceRenderer: Send + Sync {
    fn render(&self, order: &Order) -> Result<Invoice, CommerceError>;
}

/// Plain-text invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextInvoice;

impl InvoiceRenderer for PlainTextInvoice {
    fn render(&self, order: &Order) -> Result<Invoice, CommerceError> {
        let date = DateTime::from_timestamp(order.created_at, 0)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default();

        let mut lines = vec![
            format!("Invoice {}", order.order_number),
            format!("Customer: {}", order.shipping.full_name),
            format!("Date: {date}"),
            String::new(),
            item_line("Item", "Qty", "Price"),
        ];

        for item in &order.items {
            let name: String = item.product_name.chars().take(NAME_WIDTH).collect();
            lines.push(item_line(
                &name,
                &item.quantity.to_string(),
                &labelled(&item.product_price),
            ));
        }

        let totals = &order.totals;
        lines.push(String::new());
        lines.push(format!("Subtotal: {}", labelled(&totals.subtotal)));
        lines.push(format!("Shipping: {}", labelled(&totals.shipping_cost)));
        lines.push(format!("Tax: {}", labelled(&totals.tax)));
        if !totals.discount.is_zero() {
            lines.push(format!("Discount: -{}", labelled(&totals.discount)));
        }
        lines.push(format!("Total: {}", labelled(&totals.total)));

        let mut body = lines.join("\n");
        body.push('\n');

        Ok(Invoice {
            content_type: "text/plain; charset=utf-8".to_string(),
            file_name: format!("invoice_{}.txt", order.order_number),
            body,
        })
    }
}

fn item_line(name: &str, quantity: &str, price: &str) -> String {
    format!("{name:<width$} {quantity:>5} {price:>12}", width = NAME_WIDTH)
}

/// `S/ 226.00`
fn labelled(amount: &Money) -> String {
    format!("{} {}", amount.currency.symbol(), amount.display_amount())
}
