//! Year-in-review metrics
//!
//! [`compute_metrics`] is a pure pass over a finalized [`AggregateState`].
//! Field names serialize to the shape the renderer reads.

pub mod calendar;

use crate::aggregate::{AggregateState, OrgSpend};
use crate::bank::Transaction;
use calendar::{busiest_weekday, month_index, MONTH_NAMES};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Keywords must appear more often than this to be ranked.
pub const MIN_KEYWORD_COUNT: usize = 5;
pub const MAX_TOP_KEYWORDS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusiestMonth {
    pub name: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub collaborators: usize,
    pub orgs: usize,
    pub amount_spent: i64,
    pub most_spent_org: Option<String>,
    pub most_spent_org_slug: Option<String>,
    pub all_orgs: Vec<OrgSpend>,
    #[serde(rename = "transactions_cents")]
    pub transactions_cents: i64,
    #[serde(rename = "top_keywords")]
    pub top_keywords: Vec<KeywordCount>,
    pub name: Option<String>,
    pub spending_percentile: f64,
    pub busiest_day: Option<String>,
    pub self_busiest_day: Option<String>,
    pub busiest_month: Option<BusiestMonth>,
    pub active_days: usize,
}

/// Compute the summary for `user_id`.
///
/// `fallback_name` is used when the user was not found in any member list.
pub fn compute_metrics(
    state: &AggregateState,
    user_id: &str,
    fallback_name: Option<&str>,
) -> Metrics {
    let most_spent = most_spent_org(&state.orgs);

    Metrics {
        collaborators: state.collaborator_ids.len(),
        orgs: state.orgs.len(),
        amount_spent: state.orgs.iter().map(|org| org.amount_spent).sum(),
        most_spent_org: most_spent.map(|org| org.name.clone()),
        most_spent_org_slug: most_spent.map(|org| org.slug.clone()),
        all_orgs: state.orgs.clone(),
        transactions_cents: state.global_cents,
        top_keywords: top_keywords(&state.keyword_corpus),
        name: state
            .display_name
            .clone()
            .or_else(|| fallback_name.map(str::to_string)),
        spending_percentile: spending_percentile(
            &state.transactions,
            &state.collaborator_ids,
            user_id,
        ),
        busiest_day: busiest_weekday(card_outflows(&state.transactions).map(|tx| tx.date))
            .map(str::to_string),
        self_busiest_day: busiest_weekday(
            card_outflows(&state.transactions)
                .filter(|tx| tx.charged_user_id() == Some(user_id))
                .map(|tx| tx.date),
        )
        .map(str::to_string),
        busiest_month: busiest_month(&state.transactions),
        active_days: active_days(&state.transactions, user_id),
    }
}

/// Outflows carrying a card charge record.
fn card_outflows(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.is_outflow() && tx.card_charge.is_some())
}

/// Highest spend; the first one wins a tie.
pub fn most_spent_org(orgs: &[OrgSpend]) -> Option<&OrgSpend> {
    orgs.iter().fold(None, |best: Option<&OrgSpend>, org| match best {
        Some(current) if current.amount_spent >= org.amount_spent => Some(current),
        _ => Some(org),
    })
}

/// Rank keywords by count, ties in first-seen order, keeping entries seen
/// more than [`MIN_KEYWORD_COUNT`] times, at most [`MAX_TOP_KEYWORDS`].
pub fn top_keywords(corpus: &[String]) -> Vec<KeywordCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for keyword in corpus {
        match positions.get(keyword.as_str()) {
            Some(&index) => counts[index].count += 1,
            None => {
                positions.insert(keyword, counts.len());
                counts.push(KeywordCount {
                    keyword: keyword.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable, so equal counts keep first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
        .into_iter()
        .filter(|entry| entry.count > MIN_KEYWORD_COUNT)
        .take(MAX_TOP_KEYWORDS)
        .collect()
}

/// Percentage of the other collaborators whose card outflows exceed the
/// user's own. Zero when there are no other collaborators.
pub fn spending_percentile(
    transactions: &[Transaction],
    collaborator_ids: &BTreeSet<String>,
    user_id: &str,
) -> f64 {
    let mut spend: HashMap<&str, i64> = HashMap::new();
    for tx in card_outflows(transactions) {
        if let Some(charged) = tx.charged_user_id() {
            *spend.entry(charged).or_default() += tx.abs_cents();
        }
    }

    let own = spend.get(user_id).copied().unwrap_or(0);
    let others: Vec<&String> = collaborator_ids
        .iter()
        .filter(|id| id.as_str() != user_id)
        .collect();
    if others.is_empty() {
        return 0.0;
    }

    let outspent = others
        .iter()
        .filter(|id| spend.get(id.as_str()).copied().unwrap_or(0) > own)
        .count();

    outspent as f64 / others.len() as f64 * 100.0
}

/// Month with the largest total outflow; ties go to the month seen first.
pub fn busiest_month(transactions: &[Transaction]) -> Option<BusiestMonth> {
    let mut totals: Vec<(usize, i64)> = Vec::new();
    for tx in transactions.iter().filter(|tx| tx.is_outflow()) {
        let month = month_index(tx.date);
        match totals.iter_mut().find(|(m, _)| *m == month) {
            Some((_, total)) => *total += tx.abs_cents(),
            None => totals.push((month, tx.abs_cents())),
        }
    }

    let mut best: Option<(usize, i64)> = None;
    for (month, total) in totals {
        match best {
            Some((_, amount)) if amount >= total => {}
            _ => best = Some((month, total)),
        }
    }

    best.map(|(month, amount)| BusiestMonth {
        name: MONTH_NAMES[month].to_string(),
        amount,
    })
}

/// Distinct dates with a card charge by the user.
pub fn active_days(transactions: &[Transaction], user_id: &str) -> usize {
    transactions
        .iter()
        .filter(|tx| tx.charged_user_id() == Some(user_id))
        .map(|tx| tx.date)
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{card_tx, tx};

    fn spend(name: &str, amount: i64) -> OrgSpend {
        OrgSpend {
            name: name.to_string(),
            slug: name.to_lowercase(),
            logo: None,
            amount_spent: amount,
        }
    }

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_most_spent_org_first_on_tie() {
        let orgs = vec![spend("A", 300), spend("B", 300)];
        assert_eq!(most_spent_org(&orgs).map(|o| o.name.as_str()), Some("A"));

        let orgs = vec![spend("A", 100), spend("B", 300), spend("C", 200)];
        assert_eq!(most_spent_org(&orgs).map(|o| o.name.as_str()), Some("B"));

        assert!(most_spent_org(&[]).is_none());
    }

    #[test]
    fn test_spending_percentile_two_collaborators() {
        let transactions = vec![
            card_tx("t1", "2022-01-01", -500, "usr_me"),
            card_tx("t2", "2022-01-02", -900, "usr_2"),
        ];
        let pct = spending_percentile(&transactions, &ids(&["usr_me", "usr_2"]), "usr_me");
        assert_eq!(pct, 100.0);
    }

    #[test]
    fn test_spending_percentile_counts_silent_collaborators() {
        let transactions = vec![
            card_tx("t1", "2022-01-01", -500, "usr_me"),
            card_tx("t2", "2022-01-02", -900, "usr_2"),
            // Inflows never count.
            card_tx("t3", "2022-01-03", 9_000, "usr_3"),
        ];
        let pct = spending_percentile(
            &transactions,
            &ids(&["usr_me", "usr_2", "usr_3", "usr_4"]),
            "usr_me",
        );
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_spending_percentile_alone_is_zero() {
        let transactions = vec![card_tx("t1", "2022-01-01", -500, "usr_me")];
        assert_eq!(spending_percentile(&transactions, &ids(&["usr_me"]), "usr_me"), 0.0);
        assert_eq!(spending_percentile(&[], &BTreeSet::new(), "usr_me"), 0.0);
    }

    #[test]
    fn test_top_keywords_threshold_and_order() {
        let mut corpus = Vec::new();
        corpus.extend(std::iter::repeat("pizza".to_string()).take(6));
        corpus.extend(std::iter::repeat("stickers".to_string()).take(9));
        corpus.extend(std::iter::repeat("aws".to_string()).take(6));
        corpus.extend(std::iter::repeat("rare".to_string()).take(5));

        let top = top_keywords(&corpus);
        let ranked: Vec<_> = top.iter().map(|k| (k.keyword.as_str(), k.count)).collect();
        assert_eq!(ranked, vec![("stickers", 9), ("pizza", 6), ("aws", 6)]);
    }

    #[test]
    fn test_top_keywords_capped() {
        let corpus: Vec<String> = (0..40)
            .flat_map(|i| std::iter::repeat(format!("word{i}")).take(6))
            .collect();

        let top = top_keywords(&corpus);
        assert_eq!(top.len(), MAX_TOP_KEYWORDS);
        assert_eq!(top[0].keyword, "word0");
        assert!(top.iter().all(|k| k.count > MIN_KEYWORD_COUNT));
    }

    #[test]
    fn test_busiest_month() {
        let transactions = vec![
            tx("t1", "2022-03-01", -100),
            tx("t2", "2022-05-01", -300),
            tx("t3", "2022-03-15", -200),
            tx("t4", "2022-07-01", 10_000),
        ];
        assert_eq!(
            busiest_month(&transactions),
            Some(BusiestMonth {
                name: "March".to_string(),
                amount: 300
            })
        );
        assert_eq!(busiest_month(&[]), None);
    }

    #[test]
    fn test_active_days_distinct_dates() {
        let transactions = vec![
            card_tx("t1", "2022-03-01", -100, "usr_me"),
            card_tx("t2", "2022-03-01", -100, "usr_me"),
            card_tx("t3", "2022-03-02", 50, "usr_me"),
            card_tx("t4", "2022-03-03", -100, "usr_2"),
        ];
        assert_eq!(active_days(&transactions, "usr_me"), 2);
    }

    #[test]
    fn test_compute_metrics_empty_state() {
        let metrics = compute_metrics(&AggregateState::default(), "usr_me", Some("Ada"));
        assert_eq!(metrics.collaborators, 0);
        assert_eq!(metrics.amount_spent, 0);
        assert_eq!(metrics.most_spent_org, None);
        assert_eq!(metrics.busiest_day, None);
        assert_eq!(metrics.self_busiest_day, None);
        assert_eq!(metrics.busiest_month, None);
        assert_eq!(metrics.spending_percentile, 0.0);
        assert_eq!(metrics.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_compute_metrics_days() {
        let mut state = AggregateState::default();
        state.collaborator_ids = ids(&["usr_me", "usr_2"]);
        state.transactions = vec![
            card_tx("t1", "2022-01-03", -100, "usr_2"), // Monday
            card_tx("t2", "2022-01-10", -100, "usr_2"), // Monday
            card_tx("t3", "2022-01-07", -100, "usr_me"), // Friday
        ];

        let metrics = compute_metrics(&state, "usr_me", None);
        assert_eq!(metrics.busiest_day.as_deref(), Some("Monday"));
        assert_eq!(metrics.self_busiest_day.as_deref(), Some("Friday"));
    }

    #[test]
    fn test_metrics_serialize_renderer_field_names() {
        let metrics = compute_metrics(&AggregateState::default(), "usr_me", None);
        let value = serde_json::to_value(&metrics).unwrap();
        for key in [
            "collaborators",
            "amountSpent",
            "mostSpentOrg",
            "transactions_cents",
            "top_keywords",
            "spendingPercentile",
            "busiestDay",
            "selfBusiestDay",
            "busiestMonth",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
