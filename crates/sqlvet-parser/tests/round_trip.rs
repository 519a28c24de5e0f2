//! Round-trip tests: parse, print canonically, reparse, print again.
//!
//! Span fields participate in tree equality, so the stability check compares
//! the two printed forms rather than the trees themselves. A second
//! parse-print cycle of canonical output must be a fixed point.

use pretty_assertions::assert_eq;
use sqlvet_core::LanguageOptions;
use sqlvet_parser::{parse_script, parse_statement};

fn canonical(sql: &str) -> String {
    let options = LanguageOptions::default();
    let statement = parse_statement(sql, &options)
        .unwrap_or_else(|err| panic!("failed to parse {sql:?}: {err}"));
    statement.to_string()
}

/// Assert that printing is a fixed point and matches the expected canonical form
fn assert_round_trip(sql: &str, expected: &str) {
    let printed = canonical(sql);
    assert_eq!(printed, expected, "canonical form of {sql:?}");
    assert_eq!(canonical(&printed), expected, "reprint of {printed:?}");
}

#[test]
fn select_literals() {
    assert_round_trip("select 1 as c", "SELECT 1 AS c");
    assert_round_trip("SELECT 1.5 AS f, 'it''s' AS s", "SELECT 1.5 AS f, 'it''s' AS s");
    assert_round_trip("SELECT TRUE AS t, NULL AS n", "SELECT TRUE AS t, NULL AS n");
}

#[test]
fn float_literals_stay_floats() {
    // 2.0 must not print as 2, which would re-lex as an integer
    assert_round_trip("SELECT 2.0 AS f", "SELECT 2.0 AS f");
    assert_round_trip("SELECT 1e3 AS f", "SELECT 1000.0 AS f");
}

#[test]
fn select_from_where() {
    assert_round_trip(
        "select * from dataset.table where column1 = 1",
        "SELECT * FROM dataset.table WHERE column1 = 1",
    );
}

#[test]
fn backtick_identifiers_keep_their_quotes() {
    assert_round_trip(
        "SELECT * FROM `dataset.table`",
        "SELECT * FROM `dataset.table`",
    );
    assert_round_trip("SELECT `weird name` FROM t", "SELECT `weird name` FROM t");
}

#[test]
fn joins_print_canonical_keywords() {
    assert_round_trip(
        "SELECT a FROM t1 JOIN t2 ON t1.id = t2.id",
        "SELECT a FROM t1 INNER JOIN t2 ON t1.id = t2.id",
    );
    assert_round_trip(
        "SELECT a FROM t1 LEFT OUTER JOIN t2 USING (id)",
        "SELECT a FROM t1 LEFT JOIN t2 USING (id)",
    );
    assert_round_trip(
        "SELECT t1.*, t2.b FROM t1 CROSS JOIN t2",
        "SELECT t1.*, t2.b FROM t1 CROSS JOIN t2",
    );
}

#[test]
fn implicit_alias_becomes_explicit() {
    assert_round_trip("SELECT a b FROM t c", "SELECT a AS b FROM t AS c");
}

#[test]
fn full_select_clause_order() {
    assert_round_trip(
        "SELECT a, SUM(b) AS total FROM t WHERE b > 0 GROUP BY a \
         HAVING SUM(b) > 10 ORDER BY total DESC, a LIMIT 5",
        "SELECT a, SUM(b) AS total FROM t WHERE b > 0 GROUP BY a \
         HAVING SUM(b) > 10 ORDER BY total DESC, a LIMIT 5",
    );
}

#[test]
fn redundant_parentheses_vanish() {
    assert_round_trip("SELECT ((1)) + (2) AS x", "SELECT 1 + 2 AS x");
    assert_round_trip("SELECT (a * b) + c AS x", "SELECT a * b + c AS x");
}

#[test]
fn necessary_parentheses_survive() {
    assert_round_trip("SELECT (a + b) * c AS x", "SELECT (a + b) * c AS x");
    assert_round_trip(
        "SELECT a - (b - c) AS x",
        "SELECT a - (b - c) AS x",
    );
    assert_round_trip(
        "SELECT NOT (a AND b) AS x",
        "SELECT NOT (a AND b) AS x",
    );
    assert_round_trip("SELECT -(a + b) AS x", "SELECT -(a + b) AS x");
}

#[test]
fn left_associative_chains_need_no_parens()
{
    assert_round_trip("SELECT a - b - c AS x", "SELECT a - b - c AS x");
    assert_round_trip(
        "SELECT a OR b AND c = d AS x",
        "SELECT a OR b AND c = d AS x",
    );
}

#[test]
fn union_chain() {
    assert_round_trip(
        "SELECT 1 AS c UNION ALL SELECT 2 AS c UNION DISTINCT SELECT 3 AS c",
        "SELECT 1 AS c UNION ALL SELECT 2 AS c UNION DISTINCT SELECT 3 AS c",
    );
}

#[test]
fn insert_statements() {
    assert_round_trip(
        "insert into t (a, b) values (1, 'x'), (2, 'y')",
        "INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y')",
    );
    assert_round_trip(
        "INSERT INTO t SELECT a, b FROM s",
        "INSERT INTO t SELECT a, b FROM s",
    );
}

#[test]
fn create_table_statements() {
    assert_round_trip(
        "create table d.t (a INT64, b STRING)",
        "CREATE TABLE d.t (a INT64, b STRING)",
    );
    // CTAS always prints its query parenthesized
    assert_round_trip(
        "CREATE TEMP TABLE t AS SELECT 1 AS c",
        "CREATE TEMP TABLE t AS (SELECT 1 AS c)",
    );
    assert_round_trip(
        "CREATE TEMPORARY TABLE t AS (SELECT 1 AS c UNION ALL SELECT 2 AS c)",
        "CREATE TEMP TABLE t AS (SELECT 1 AS c UNION ALL SELECT 2 AS c)",
    );
}

#[test]
fn count_star_and_function_calls() {
    assert_round_trip(
        "SELECT COUNT(*) AS n, CONCAT(a, '-', b) AS k FROM t",
        "SELECT COUNT(*) AS n, CONCAT(a, '-', b) AS k FROM t",
    );
}

#[test]
fn comments_are_skipped_not_preserved() {
    assert_round_trip(
        "SELECT 1 AS c -- trailing\n FROM t /* block */ # hash",
        "SELECT 1 AS c FROM t",
    );
}

#[test]
fn script_round_trip() {
    let options = LanguageOptions::default();
    let source = "create table t (a INT64); insert into t values (1); select a from t;";
    let script = parse_script(source, &options).unwrap();
    let printed = script.to_string();
    assert_eq!(
        printed,
        "CREATE TABLE t (a INT64);\nINSERT INTO t VALUES (1);\nSELECT a FROM t;\n"
    );
    let reparsed = parse_script(&printed, &options).unwrap();
    assert_eq!(reparsed.to_string(), printed);
}
