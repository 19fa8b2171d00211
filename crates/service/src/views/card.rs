use serde::Serialize;

use super::format::{date_numeric, mask_card};
use super::transactions::{rows, TransactionRow};
use super::PageState;
use crate::cache::{QueryCache, QueryKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub masked_number: String,
    pub active: bool,
    pub status_label: &'static str,
    pub expiry_date: String,
    pub transactions: Vec<TransactionRow>,
}

impl CardView {
    pub fn build(card: &models::Card) -> Self {
        Self {
            masked_number: mask_card(&card.card_num),
            active: card.active,
            status_label: if card.active { "Active" } else { "Inactive" },
            expiry_date: date_numeric(&card.expiry_date),
            transactions: rows(&card.transactions),
        }
    }

    pub async fn load(cache: &QueryCache) -> PageState<Self> {
        let snap = cache.revalidate(QueryKey::Card).await;
        PageState::from_snapshot(&snap, None, |d| d.card().map(Self::build))
    }
}
