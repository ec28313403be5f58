//! Order metadata printed in the invoice header

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifying fields of an order. All free-form and optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderMetadata {
    pub order_id: String,
    pub date: String,
    pub lens_type: String,
    pub client_name: String,
    pub client_address: String,
}

/// Editable metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderField {
    OrderId,
    Date,
    LensType,
    ClientName,
    ClientAddress,
}

impl OrderField {
    /// Parse the camelCase field name used by the web form
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "orderId" => Some(Self::OrderId),
            "date" => Some(Self::Date),
            "lensType" => Some(Self::LensType),
            "clientName" => Some(Self::ClientName),
            "clientAddress" => Some(Self::ClientAddress),
            _ => None,
        }
    }
}

impl OrderMetadata {
    /// Blank order with a generated `#ORD-NNNN` id and today's date
    pub fn fresh(now: OffsetDateTime) -> Self {
        let seed = (now.unix_timestamp_nanos() / 1_000_000).unsigned_abs();
        let date = now.date();
        Self {
            order_id: format!("#ORD-{}", 1000 + seed % 9000),
            date: format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                u8::from(date.month()),
                date.day()
            ),
            ..Self::default()
        }
    }

    pub fn get(&self, field: OrderField) -> &str {
        match field {
            OrderField::OrderId => &self.order_id,
            OrderField::Date => &self.date,
            OrderField::LensType => &self.lens_type,
            OrderField::ClientName => &self.client_name,
            OrderField::ClientAddress => &self.client_address,
        }
    }

    /// Set a field. Returns true if the value changed.
    pub fn set(&mut self, field: OrderField, value: impl Into<String>) -> bool {
        let slot = match field {
            OrderField::OrderId => &mut self.order_id,
            OrderField::Date => &mut self.date,
            OrderField::LensType => &mut self.lens_type,
            OrderField::ClientName => &mut self.client_name,
            OrderField::ClientAddress => &mut self.client_address,
        };
        let value = value.into();
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }
}
