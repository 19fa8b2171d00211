use models::AccountSummary;
use serde::Serialize;

use super::PageState;
use crate::cache::{QueryCache, QueryKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Prefills the change-password form.
    pub password_form_email: String,
}

impl AccountView {
    pub fn build(summary: &AccountSummary) -> Self {
        Self {
            full_name: summary.full_name(),
            email: summary.email.clone(),
            phone: summary.phone_num.clone(),
            password_form_email: summary.email.clone(),
        }
    }

    pub async fn load(cache: &QueryCache) -> PageState<Self> {
        let snap = cache.revalidate(QueryKey::AccountSummary).await;
        PageState::from_snapshot(&snap, None, |d| d.account_summary().map(Self::build))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardsView {
    pub points: i64,
}

impl RewardsView {
    pub async fn load(cache: &QueryCache) -> PageState<Self> {
        let snap = cache.revalidate(QueryKey::AccountSummary).await;
        PageState::from_snapshot(&snap, None, |d| d.account_summary().map(|s| Self { points: s.points }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mock_cache, summary};

    #[tokio::test]
    async fn account_and_rewards_share_one_request() {
        let (mock, cache) = mock_cache();
        mock.account_summary.set(Ok(summary("Astrid")));

        let (account, rewards) = tokio::join!(AccountView::load(&cache), RewardsView::load(&cache));

        let account = account.ready().expect("account ready");
        assert_eq!(account.full_name, "Astrid Lind");
        assert_eq!(account.password_form_email, "astrid@example.se");
        assert_eq!(rewards.ready().map(|r| r.points), Some(1200));
        assert_eq!(mock.account_summary.calls(), 1);
    }
}
