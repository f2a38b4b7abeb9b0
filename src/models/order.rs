//! Order handed to the persistence layer once a buyer checks out.
//! Storage itself lives outside this crate.

use super::{PropertyRecord, PropertySummary};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuyerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrder {
    pub id: Uuid,
    pub property_url: String,
    pub property: PropertySummary,
    pub buyer: BuyerContact,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn from_record(record: &PropertyRecord, buyer: BuyerContact) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_url: record.url.clone(),
            property: record.summary(),
            buyer,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::New,
            created_at: Utc::now(),
        }
    }
}

/// Key-based order store implemented by the persistence collaborator
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<Uuid>;

    async fn get(&self, id: Uuid) -> Result<Option<NewOrder>>;

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<()>;

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<()>;

    async fn mark_report_sent(&self, id: Uuid) -> Result<()>;
}
