use super::keywords::tokenize;
use crate::bank::{Organization, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-organization spend by the requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSpend {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub amount_spent: i64,
}

/// Running totals for one run, fed one organization at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateState {
    pub collaborator_ids: BTreeSet<String>,
    pub global_cents: i64,
    /// Append-only; duplicates kept.
    pub keyword_corpus: Vec<String>,
    pub orgs: Vec<OrgSpend>,
    pub transactions: Vec<Transaction>,
    /// Requesting user's name as found in an organization's member list.
    pub display_name: Option<String>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, contribution: OrgContribution) {
        self.collaborator_ids.extend(contribution.member_ids);
        if contribution.display_name.is_some() {
            self.display_name = contribution.display_name;
        }
        self.global_cents += contribution.transaction_cents;
        self.keyword_corpus.extend(contribution.keywords);
        self.orgs.push(contribution.spend);
        self.transactions.extend(contribution.transactions);
    }
}

/// What one organization adds to the [`AggregateState`].
///
/// Built inside the organization's task and merged by the coordinator, so
/// parallel tasks never write to shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct OrgContribution {
    pub org_id: String,
    pub member_ids: Vec<String>,
    pub display_name: Option<String>,
    pub transaction_cents: i64,
    pub keywords: Vec<String>,
    pub spend: OrgSpend,
    pub transactions: Vec<Transaction>,
}

impl OrgContribution {
    pub fn index(org: &Organization, transactions: Vec<Transaction>, user_id: &str) -> Self {
        let member_ids = org.users.iter().map(|member| member.id.clone()).collect();
        let display_name = org
            .users
            .iter()
            .find(|member| member.id == user_id)
            .map(|member| member.full_name.clone());

        let transaction_cents = transactions.iter().map(Transaction::abs_cents).sum();

        let keywords = transactions
            .iter()
            .flat_map(|tx| tokenize(tx.memo()))
            .collect();

        let amount_spent = transactions
            .iter()
            .filter(|tx| tx.is_card_charge() && tx.charged_user_id() == Some(user_id))
            .map(Transaction::abs_cents)
            .sum();

        Self {
            org_id: org.id.clone(),
            member_ids,
            display_name,
            transaction_cents,
            keywords,
            spend: OrgSpend {
                name: org.name.clone(),
                slug: org.slug.clone(),
                logo: org.logo.clone(),
                amount_spent,
            },
            transactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::User;
    use crate::testing::{card_tx, tx, with_memo};

    fn org(id: &str, members: &[(&str, &str)]) -> Organization {
        Organization {
            id: id.to_string(),
            slug: id.to_string(),
            name: id.to_uppercase(),
            logo: None,
            users: members
                .iter()
                .map(|(id, name)| User {
                    id: id.to_string(),
                    full_name: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_index_org() {
        let org = org("hq", &[("usr_me", "Ada Lovelace"), ("usr_2", "Grace")]);
        let transactions = vec![
            with_memo(card_tx("t1", "2022-03-01", -500, "usr_me"), "Pizza for the team"),
            with_memo(card_tx("t2", "2022-03-02", -900, "usr_2"), "Pizza"),
            with_memo(tx("t3", "2022-03-03", 2_000), "Donation from Acme"),
        ];

        let contribution = OrgContribution::index(&org, transactions, "usr_me");

        assert_eq!(contribution.member_ids, vec!["usr_me", "usr_2"]);
        assert_eq!(contribution.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(contribution.transaction_cents, 3_400);
        assert_eq!(
            contribution.keywords,
            vec!["pizza", "team", "pizza", "donation", "acme"]
        );
        assert_eq!(contribution.spend.amount_spent, 500);
        assert_eq!(contribution.spend.name, "HQ");
    }

    #[test]
    fn test_card_charge_without_record_is_not_self_spend() {
        let org = org("hq", &[("usr_me", "Ada")]);
        let mut orphan = tx("t1", "2022-01-01", -700);
        orphan.kind = "card_charge".to_string();

        let contribution = OrgContribution::index(&org, vec![orphan], "usr_me");
        assert_eq!(contribution.spend.amount_spent, 0);
        assert_eq!(contribution.transaction_cents, 700);
    }

    #[test]
    fn test_absorb_unions_members_and_appends() {
        let mut state = AggregateState::new();
        let a = OrgContribution::index(
            &org("a", &[("usr_me", "Ada"), ("usr_2", "Grace")]),
            vec![with_memo(card_tx("t1", "2022-01-01", -300, "usr_me"), "stickers")],
            "usr_me",
        );
        let b = OrgContribution::index(
            &org("b", &[("usr_2", "Grace"), ("usr_3", "Linus")]),
            vec![with_memo(tx("t2", "2022-01-02", -100), "stickers again")],
            "usr_me",
        );

        state.absorb(a);
        state.absorb(b);

        assert_eq!(state.collaborator_ids.len(), 3);
        assert_eq!(state.global_cents, 400);
        assert_eq!(state.keyword_corpus, vec!["stickers", "stickers", "again"]);
        assert_eq!(state.orgs.len(), 2);
        assert_eq!(state.transactions.len(), 2);
        assert_eq!(state.display_name.as_deref(), Some("Ada"));
    }
}
