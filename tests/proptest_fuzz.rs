//! Property-based tests (fuzzing) for query construction and reply parsing.
//!
//! Uses proptest to generate random schemas, option sets, predicate trees
//! and malformed replies, and checks the serialized commands keep their
//! shape while the parser only ever returns clean errors.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;

use search_index_client::channel::{Arg, Reply};
use search_index_client::schema::{Field, PhoneticMatcher, TextFieldOptions};
use search_index_client::search::{
    and, or, Predicate, QueryBuilder, QueryTranslator, SearchOptions, SortOrder,
};
use search_index_client::{IndexDefinition, Query, SearchResults};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Arbitrary reply trees, including shapes no server would send
fn arbitrary_reply_strategy() -> impl Strategy<Value = Reply> {
    let leaf = prop_oneof![
        Just(Reply::Nil),
        any::<i64>().prop_map(Reply::Integer),
        ".{0,16}".prop_map(Reply::Status),
        ".{0,16}".prop_map(Reply::Bulk),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Reply::Blob),
    ];

    leaf.prop_recursive(
        3,  // depth
        48, // max nodes
        8,  // items per collection
        |inner| prop::collection::vec(inner, 0..8).prop_map(Reply::Array),
    )
}

fn phonetic_strategy() -> impl Strategy<Value = PhoneticMatcher> {
    prop_oneof![
        Just(PhoneticMatcher::English),
        Just(PhoneticMatcher::French),
        Just(PhoneticMatcher::Portuguese),
        Just(PhoneticMatcher::Spanish),
    ]
}

fn position(args: &[Arg], token: &str) -> Option<usize> {
    args.iter().position(|a| a == token)
}

/// Nest `depth` fallible AND groups and fail in the innermost one
fn nest_and_fail(b: &mut QueryBuilder, depth: usize) -> Result<(), String> {
    if depth == 0 {
        b.tag("category").eq("doomed");
        return Err("innermost".to_string());
    }
    b.tag("level").eq(depth.to_string());
    b.try_and(|b| nest_and_fail(b, depth - 1)).map(|_| ())
}

// =============================================================================
// Key Prefix Properties
// =============================================================================

proptest! {
    /// Whatever id is written under a prefix comes back unchanged in results
    #[test]
    fn prop_prefix_round_trip(prefix in "[a-z]{1,8}", id in "[a-zA-Z0-9:_-]{1,24}") {
        let definition = IndexDefinition::new("idx").prefix(prefix.clone());
        let key = definition.document_key(&id);
        let expected_start = format!("{}:", prefix);
        prop_assert!(key.starts_with(&expected_start));

        let mut options = SearchOptions::new();
        options.no_content = true;
        let reply = Reply::Array(vec![Reply::Integer(1), Reply::Bulk(key)]);
        let mut results = SearchResults::from_reply(reply, &options).unwrap();
        results.strip_prefix(&prefix);

        prop_assert_eq!(results.ids(), vec![id.as_str()]);
    }

    /// Without a prefix the key is the id itself
    #[test]
    fn prop_unprefixed_key_is_id(id in "[a-zA-Z0-9:_-]{1,24}") {
        prop_assert_eq!(IndexDefinition::new("idx").document_key(&id), id);
    }
}

// =============================================================================
// Option Ordering Properties
// =============================================================================

proptest! {
    /// Options always come out in the fixed FT.SEARCH order regardless of
    /// the order they were set in
    #[test]
    fn prop_option_order_is_fixed(
        with_scores in any::<bool>(),
        filter in proptest::option::of(("[a-z]{1,6}", -1000.0f64..1000.0)),
        sort in proptest::option::of("[a-z]{1,6}"),
        page in proptest::option::of((0usize..100, 1usize..50)),
        scorer in proptest::option::of(Just("BM25".to_string())),
        dialect in proptest::option::of(1u32..4),
        set_tail_first in any::<bool>(),
    ) {
        let mut query = Query::literal("hello");
        if set_tail_first {
            if let Some(d) = dialect {
                query = query.dialect(d);
            }
            if let Some(s) = &scorer {
                query = query.scorer(s.clone());
            }
        }
        if let Some((offset, num)) = page {
            query = query.paging(offset, num);
        }
        if let Some(field) = &sort {
            query = query.sort_by(field.clone(), SortOrder::Desc);
        }
        if let Some((field, min)) = &filter {
            query = query.filter(field.clone(), *min, min + 10.0);
        }
        if with_scores {
            query = query.with_scores();
        }
        if !set_tail_first {
            if let Some(s) = &scorer {
                query = query.scorer(s.clone());
            }
            if let Some(d) = dialect {
                query = query.dialect(d);
            }
        }

        let args = query.to_args();
        prop_assert_eq!(&args[0], &Arg::from("hello"));

        let order: Vec<usize> = ["WITHSCORES", "FILTER", "SORTBY", "LIMIT", "SCORER", "DIALECT"]
            .iter()
            .filter_map(|token| position(&args, token))
            .collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(order, sorted);

        if dialect.is_some() {
            prop_assert_eq!(position(&args, "DIALECT"), Some(args.len() - 2));
        }
    }

    /// Options serialize identically through `Query` and through a bare
    /// `SearchOptions`
    #[test]
    fn prop_query_and_options_agree(offset in 0usize..1000, num in 0usize..100, slop in 0u32..10) {
        let query = Query::literal("*").paging(offset, num).slop(slop).in_order();
        let mut options = SearchOptions::new();
        options.limit = Some(search_index_client::search::Paging { offset, num });
        options.slop = Some(slop);
        options.in_order = true;

        prop_assert_eq!(&query.to_args()[1..], &options.to_args()[..]);
    }
}

// =============================================================================
// Rendering Properties
// =============================================================================

proptest! {
    /// AND joins children with a space, OR with " | ", both parenthesized
    #[test]
    fn prop_group_rendering(values in prop::collection::vec("[a-z0-9]{1,8}", 1..6)) {
        let rendered: Vec<String> = values.iter().map(|v| format!("@t:{{{}}}", v)).collect();

        let conj = and(values.iter().map(|v| Predicate::tag("t", v.clone())));
        let disj = or(values.iter().map(|v| Predicate::tag("t", v.clone())));

        prop_assert_eq!(QueryTranslator::render(&conj), format!("({})", rendered.join(" ")));
        prop_assert_eq!(QueryTranslator::render(&disj), format!("({})", rendered.join(" | ")));
    }

    /// Numeric ranges render both bounds inside brackets
    #[test]
    fn prop_range_rendering(min in -1.0e6f64..1.0e6, span in 0.0f64..1.0e6) {
        let max = min + span;
        let rendered = QueryTranslator::render(&Predicate::between("n", min, max).into());
        prop_assert_eq!(rendered, format!("@n:[{} {}]", min, max));
    }
}

// =============================================================================
// Builder Properties
// =============================================================================

proptest! {
    /// A failing nested block leaves the stack where it was and attaches
    /// nothing from the failed group
    #[test]
    fn prop_builder_balanced_after_error(depth in 1usize..8) {
        let mut b = QueryBuilder::new();
        b.tag("kept").eq("yes");

        let result = b.try_or(|b| nest_and_fail(b, depth));
        prop_assert!(result.is_err());
        prop_assert_eq!(b.depth(), 1);

        let root = b.finish();
        prop_assert_eq!(root.len(), 1);
        prop_assert_eq!(QueryTranslator::render_group(&root), "(@kept:{yes})");
    }

    /// Successful nesting closes every group it opens
    #[test]
    fn prop_builder_balanced_after_success(depth in 1usize..8) {
        fn nest(b: &mut QueryBuilder, depth: usize) {
            b.numeric("n").eq(depth as f64);
            if depth > 1 {
                b.and(|b| nest(b, depth - 1));
            }
        }

        let mut b = QueryBuilder::new();
        nest(&mut b, depth);
        prop_assert_eq!(b.depth(), 1);

        let rendered = QueryTranslator::render_group(&b.finish());
        prop_assert_eq!(rendered.matches('(').count(), depth);
        prop_assert_eq!(rendered.matches(')').count(), depth);
    }
}

// =============================================================================
// Schema Properties
// =============================================================================

proptest! {
    /// PHONETIC is the last clause of a text field whatever else is set
    #[test]
    fn prop_phonetic_serialized_last(
        weight in proptest::option::of(0.1f64..10.0),
        no_stem in any::<bool>(),
        sortable in any::<bool>(),
        no_index in any::<bool>(),
        matcher in phonetic_strategy(),
    ) {
        let mut options = TextFieldOptions::new().phonetic(matcher);
        if let Some(w) = weight {
            options = options.weight(w);
        }
        if no_stem {
            options = options.no_stem();
        }
        if sortable {
            options = options.sortable();
        }
        if no_index {
            options = options.no_index();
        }

        let args = Field::text("name", options).unwrap().serialize();
        let n = args.len();
        prop_assert_eq!(&args[n - 2], &Arg::from("PHONETIC"));
        prop_assert_eq!(&args[n - 1], &Arg::from(matcher.as_str()));
    }
}

// =============================================================================
// Reply Parsing Fuzz Tests
// =============================================================================

proptest! {
    /// Reply parsing never panics on arbitrary trees, whatever the options
    #[test]
    fn fuzz_search_reply_never_panics(
        reply in arbitrary_reply_strategy(),
        with_scores in any::<bool>(),
        with_payloads in any::<bool>(),
        no_content in any::<bool>(),
    ) {
        let options = SearchOptions {
            with_scores,
            with_payloads,
            no_content,
            ..SearchOptions::default()
        };
        let _ = SearchResults::from_reply(reply, &options);
    }

    /// A well-formed count with a truncated body is an error, not a panic
    #[test]
    fn fuzz_truncated_reply_is_error(ids in prop::collection::vec("[a-z0-9]{1,8}", 1..5)) {
        let mut items = vec![Reply::Integer(ids.len() as i64)];
        items.extend(ids.into_iter().map(Reply::Bulk));
        // Each id expects a field array after it
        let result = SearchResults::from_reply(Reply::Array(items), &SearchOptions::new());
        prop_assert!(result.is_err());
    }
}
