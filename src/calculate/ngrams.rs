//! N-gram aggregation across search terms.
//!
//! Decomposes each search term into sliding token windows and sums
//! performance metrics per distinct n-gram over the whole corpus.

use std::collections::{HashMap, HashSet};

use crate::models::{NgramRecord, NgramWidth, SearchTermRecord};

/// Lower-case a search term and split it on whitespace runs.
///
/// Punctuation is left inside tokens; the upstream export already separates
/// words the way the account's match types see them.
pub fn tokenize(search_term: &str) -> Vec<String> {
    search_term
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Aggregate performance metrics per distinct n-gram of the given width.
///
/// A record whose token count is below the width contributes no windows.
/// Within one record, a repeated window key is counted once: the aggregation
/// key is (n-gram, record), so a high-spend term with a repeated phrase
/// cannot inflate that phrase's totals by the repetition count.
///
/// Output order is unspecified; ordering is the caller's concern.
pub fn aggregate(records: &[SearchTermRecord], width: NgramWidth) -> Vec<NgramRecord> {
    let window = width.as_usize();
    let mut grouped: HashMap<String, NgramRecord> = HashMap::new();

    for record in records {
        let tokens = tokenize(&record.search_term);
        if tokens.len() < window {
            continue;
        }

        let mut seen_in_record: HashSet<String> = HashSet::new();
        for slice in tokens.windows(window) {
            let key = slice.join(" ");
            if !seen_in_record.insert(key.clone()) {
                continue;
            }

            let entry = grouped
                .entry(key)
                .or_insert_with_key(|k| NgramRecord::empty(k.clone()));
            entry.count += 1;
            entry.total_impressions += record.impressions;
            entry.total_clicks += record.clicks;
            entry.total_cost += record.cost;
            entry.total_conversions += record.conversions;
            entry.total_conversion_value += record.conversion_value;
        }
    }

    grouped.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(search_term: &str, cost: f64) -> SearchTermRecord {
        SearchTermRecord {
            search_term: search_term.to_string(),
            campaign: "Brand".to_string(),
            ad_group: "Core".to_string(),
            impressions: 100.0,
            clicks: 5.0,
            cost,
            conversions: 1.0,
            conversion_value: 20.0,
        }
    }

    fn by_key(records: Vec<NgramRecord>) -> HashMap<String, NgramRecord> {
        records.into_iter().map(|r| (r.ngram.clone(), r)).collect()
    }

    #[test]
    fn test_tokenize_normalizes_case_and_whitespace() {
        assert_eq!(
            tokenize("  Buy  RED\tshoes "),
            vec!["buy".to_string(), "red".to_string(), "shoes".to_string()]
        );
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("   \t  "), Vec::<String>::new());
    }

    #[test]
    fn test_bigrams_across_two_records() {
        let records = vec![record("buy red shoes", 10.0), record("buy blue shoes", 6.0)];

        let grams = by_key(aggregate(&records, NgramWidth::Bigram));

        assert_eq!(grams.len(), 4);
        for key in ["buy red", "red shoes", "buy blue", "blue shoes"] {
            assert_eq!(grams[key].count, 1, "count for {key}");
        }
        assert_eq!(grams["buy red"].total_cost, 10.0);
        assert_eq!(grams["red shoes"].total_cost, 10.0);
        assert_eq!(grams["buy blue"].total_cost, 6.0);
        assert_eq!(grams["blue shoes"].total_cost, 6.0);
    }

    #[test]
    fn test_unigrams_share_common_token() {
        let records = vec![record("buy red shoes", 10.0), record("buy blue shoes", 6.0)];

        let grams = by_key(aggregate(&records, NgramWidth::Unigram));

        assert_eq!(grams.len(), 4);
        assert_eq!(grams["buy"].count, 2);
        assert_eq!(grams["buy"].total_cost, 16.0);
        assert_eq!(grams["shoes"].count, 2);
        assert_eq!(grams["red"].count, 1);
    }

    #[test]
    fn test_repeated_phrase_counts_once_per_record() {
        // "red shoes red shoes" yields the "red shoes" window twice; the
        // record must still contribute its metrics exactly once.
        let records = vec![record("red shoes red shoes", 12.0)];

        let grams = by_key(aggregate(&records, NgramWidth::Bigram));

        let repeated = &grams["red shoes"];
        assert_eq!(repeated.count, 1);
        assert_eq!(repeated.total_cost, 12.0);
        assert_eq!(repeated.total_clicks, 5.0);
        // The bridging windows appear as their own keys.
        assert!(grams.contains_key("shoes red"));
    }

    #[test]
    fn test_width_longer_than_term_contributes_nothing() {
        let records = vec![record("shoes", 4.0)];

        assert!(aggregate(&records, NgramWidth::Bigram).is_empty());
        assert!(aggregate(&records, NgramWidth::Trigram).is_empty());
        assert_eq!(aggregate(&records, NgramWidth::Unigram).len(), 1);
    }

    #[test]
    fn test_blank_terms_and_empty_input() {
        assert!(aggregate(&[], NgramWidth::Bigram).is_empty());

        let records = vec![record("", 4.0), record("   ", 2.0)];
        assert!(aggregate(&records, NgramWidth::Unigram).is_empty());
    }

    #[test]
    fn test_case_folding_merges_variants() {
        let records = vec![record("Red Shoes", 3.0), record("red shoes", 7.0)];

        let grams = by_key(aggregate(&records, NgramWidth::Bigram));

        assert_eq!(grams.len(), 1);
        assert_eq!(grams["red shoes"].count, 2);
        assert_eq!(grams["red shoes"].total_cost, 10.0);
    }

    #[test]
    fn test_unique_ngram_totals_equal_record_cost() {
        // Without in-record repetition, every n-gram a record owns alone
        // carries exactly that record's cost.
        let records = vec![record("buy red shoes", 10.0)];

        let grams = aggregate(&records, NgramWidth::Bigram);

        assert_eq!(grams.len(), 2);
        for gram in &grams {
            assert_eq!(gram.total_cost, 10.0);
        }
    }

    #[test]
    fn test_aggregate_is_deterministic_up_to_order() {
        let records = vec![
            record("buy red shoes online", 10.0),
            record("buy red boots", 6.0),
            record("red shoes sale", 3.0),
        ];

        let mut first = aggregate(&records, NgramWidth::Bigram);
        let mut second = aggregate(&records, NgramWidth::Bigram);
        first.sort_by(|a, b| a.ngram.cmp(&b.ngram));
        second.sort_by(|a, b| a.ngram.cmp(&b.ngram));

        assert_eq!(first, second);
        // "buy red" shows up in two records.
        let buy_red = first.iter().find(|g| g.ngram == "buy red").unwrap();
        assert_eq!(buy_red.count, 2);
        assert_eq!(buy_red.total_cost, 16.0);
    }

    #[test]
    fn test_trigram_window() {
        let records = vec![record("buy red shoes online", 10.0)];

        let mut grams = aggregate(&records, NgramWidth::Trigram);
        grams.sort_by(|a, b| a.ngram.cmp(&b.ngram));

        let keys: Vec<&str> = grams.iter().map(|g| g.ngram.as_str()).collect();
        assert_eq!(keys, vec!["buy red shoes", "red shoes online"]);
    }
}
