//! Invoice record returned by the extraction model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The `{"invoice": {...}}` object the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceEnvelope {
    pub invoice: InvoiceRecord,
}

/// Accounting fields extracted from one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceRecord {
    /// Issue date (`YYYY-MM-DD`).
    pub date: NaiveDate,

    /// Invoice number/identifier as printed.
    pub invoice_number: String,

    /// Issuing party.
    pub vendor: String,

    /// Receiving party.
    pub client: String,

    /// Accounting category.
    pub classification: Classification,

    /// Amount before tax.
    pub subtotal: Decimal,

    /// Tax amount.
    pub tax: Decimal,

    /// Amount after tax.
    pub total: Decimal,
}

/// Accounting categories the model may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Sale of services.
    VentaServicios,
    /// Electricity, water and similar utilities.
    UtilityService,
    /// Internet and telecom.
    Internet,
    /// Stationery and consumables.
    OfficeSupplies,
    /// Goods bought for use.
    PurchaseGoods,
    /// Goods bought for resale.
    InventoryPurchase,
    /// Capitalised equipment.
    FixedAsset,
    /// Anything else.
    #[serde(alias = "other")]
    Others,
}

impl Classification {
    /// Every label, in the order they are offered to the model.
    pub const ALL: [Classification; 8] = [
        Classification::VentaServicios,
        Classification::UtilityService,
        Classification::Internet,
        Classification::OfficeSupplies,
        Classification::PurchaseGoods,
        Classification::InventoryPurchase,
        Classification::FixedAsset,
        Classification::Others,
    ];

    /// Wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::VentaServicios => "venta_servicios",
            Classification::UtilityService => "utility_service",
            Classification::Internet => "internet",
            Classification::OfficeSupplies => "office_supplies",
            Classification::PurchaseGoods => "purchase_goods",
            Classification::InventoryPurchase => "inventory_purchase",
            Classification::FixedAsset => "fixed_asset",
            Classification::Others => "others",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InvoiceRecord {
    /// Check the record for inconsistencies and return any found.
    ///
    /// Nothing here is enforced; model output is accepted as-is and these
    /// are only reported.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.invoice_number.trim().is_empty() {
            issues.push("Missing invoice number".to_string());
        }

        if self.vendor.trim().is_empty() {
            issues.push("Missing vendor".to_string());
        }

        for (name, value) in [("subtotal", self.subtotal), ("tax", self.tax), ("total", self.total)] {
            if value.is_sign_negative() && !value.is_zero() {
                issues.push(format!("Negative {}: {}", name, value));
            }
        }

        let difference = self
            .subtotal
            .checked_add(self.tax)
            .and_then(|sum| sum.checked_sub(self.total));
        match difference {
            Some(difference) if difference.abs() <= Decimal::new(1, 2) => {}
            Some(_) => issues.push(format!(
                "Subtotal ({}) plus tax ({}) differs from total ({})",
                self.subtotal, self.tax, self.total
            )),
            None => issues.push(format!(
                "Subtotal ({}) plus tax ({}) overflows",
                self.subtotal, self.tax
            )),
        }

        issues
    }
}
