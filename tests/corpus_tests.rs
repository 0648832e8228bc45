mod support;

use sqlnorm::normalize;

/// `(input, expected)` pairs shared with libpg_query's normalizer tests.
const CORPUS: &[(&str, &str)] = &[
    ("SELECT 1", "SELECT $1"),
    ("SELECT $1, 1", "SELECT $1, $2"),
    (
        "CREATE ROLE postgres PASSWORD 'xyz'",
        "CREATE ROLE postgres PASSWORD $1",
    ),
    (
        "CREATE ROLE postgres ENCRYPTED PASSWORD 'xyz'",
        "CREATE ROLE postgres ENCRYPTED PASSWORD $1",
    ),
    (
        "ALTER ROLE foo WITH PASSWORD 'bar' VALID UNTIL 'infinity'",
        "ALTER ROLE foo WITH PASSWORD $1 VALID UNTIL $2",
    ),
    (
        "ALTER ROLE postgres LOGIN SUPERUSER ENCRYPTED PASSWORD 'xyz'",
        "ALTER ROLE postgres LOGIN SUPERUSER ENCRYPTED PASSWORD $1",
    ),
    (
        "SELECT a, SUM(b) FROM tbl WHERE c = 'foo' GROUP BY 1, 'bar' ORDER BY 1, 'cafe'",
        "SELECT a, SUM(b) FROM tbl WHERE c = $1 GROUP BY 1, $2 ORDER BY 1, $3",
    ),
    (
        "select date_trunc($1, created_at at time zone $2), count(*) from users group by date_trunc('day', created_at at time zone 'US/Pacific')",
        "select date_trunc($1, created_at at time zone $2), count(*) from users group by date_trunc($1, created_at at time zone $2)",
    ),
    (
        "select count(1), date_trunc('day', created_at at time zone 'US/Pacific'), 'something', 'somethingelse' from users group by date_trunc('day', created_at at time zone 'US/Pacific'), date_trunc('day', created_at), 'foobar', 'abcdef'",
        "select count($1), date_trunc($2, created_at at time zone $3), $4, $5 from users group by date_trunc($2, created_at at time zone $3), date_trunc($6, created_at), $4, $5",
    ),
    (
        "SELECT CAST('abc' as varchar(50))",
        "SELECT CAST($1 as varchar(50))",
    ),
    (
        "CREATE OR REPLACE FUNCTION pg_temp.testfunc(OUT response \"mytable\", OUT sequelize_caught_exception text) RETURNS RECORD AS $func_12345$ BEGIN INSERT INTO \"mytable\" (\"mycolumn\") VALUES ('myvalue') RETURNING * INTO response; EXCEPTION WHEN unique_violation THEN GET STACKED DIAGNOSTICS sequelize_caught_exception = PG_EXCEPTION_DETAIL; END $func_12345$ LANGUAGE plpgsql; SELECT (testfunc.response).\"mycolumn\", testfunc.sequelize_caught_exception FROM pg_temp.testfunc(); DROP FUNCTION IF EXISTS pg_temp.testfunc();",
        "CREATE OR REPLACE FUNCTION pg_temp.testfunc(OUT response \"mytable\", OUT sequelize_caught_exception text) RETURNS RECORD AS $1 LANGUAGE plpgsql; SELECT (testfunc.response).\"mycolumn\", testfunc.sequelize_caught_exception FROM pg_temp.testfunc(); DROP FUNCTION IF EXISTS pg_temp.testfunc();",
    ),
    (
        "CREATE PROCEDURE insert_data(a integer, b integer) LANGUAGE SQL AS $$ INSERT INTO tbl VALUES (a); INSERT INTO tbl VALUES (b); $$",
        "CREATE PROCEDURE insert_data(a integer, b integer) LANGUAGE SQL AS $1",
    ),
    (
        "DO $$DECLARE r record; BEGIN FOR r IN SELECT table_schema, table_name FROM information_schema.tables WHERE table_type = 'VIEW' AND table_schema = 'public' LOOP EXECUTE 'GRANT ALL ON ' || quote_ident(r.table_schema) || '.' || quote_ident(r.table_name) || ' TO webuser'; END LOOP; END$$",
        "DO $1",
    ),
    (
        "CREATE SUBSCRIPTION mysub CONNECTION 'host=192.168.1.50 port=5432 user=foo dbname=foodb' PUBLICATION mypublication, insert_only",
        "CREATE SUBSCRIPTION mysub CONNECTION $1 PUBLICATION mypublication, insert_only",
    ),
    (
        "ALTER SUBSCRIPTION mysub SET PUBLICATION insert_only",
        "ALTER SUBSCRIPTION mysub SET PUBLICATION insert_only",
    ),
    (
        "ALTER SUBSCRIPTION mysub CONNECTION 'host=192.168.1.50 port=5432 user=foo dbname=foodb'",
        "ALTER SUBSCRIPTION mysub CONNECTION $1",
    ),
    (
        "CREATE USER MAPPING FOR bob SERVER foo OPTIONS (user 'bob', password 'secret')",
        "CREATE USER MAPPING FOR bob SERVER foo OPTIONS (user $1, password $2)",
    ),
    (
        "ALTER USER MAPPING FOR bob SERVER foo OPTIONS (SET password 'public')",
        "ALTER USER MAPPING FOR bob SERVER foo OPTIONS (SET password $1)",
    ),
    (
        "MERGE into measurement m USING new_measurement nm ON (m.city_id = nm.city_id and m.logdate=nm.logdate) WHEN MATCHED AND nm.peaktemp IS NULL THEN DELETE WHEN MATCHED THEN UPDATE SET peaktemp = greatest(m.peaktemp, nm.peaktemp), unitsales = m.unitsales + coalesce(nm.unitsales, 0) WHEN NOT MATCHED THEN INSERT (city_id, logdate, peaktemp, unitsales) VALUES (city_id, logdate, peaktemp, unitsales)",
        "MERGE into measurement m USING new_measurement nm ON (m.city_id = nm.city_id and m.logdate=nm.logdate) WHEN MATCHED AND nm.peaktemp IS NULL THEN DELETE WHEN MATCHED THEN UPDATE SET peaktemp = greatest(m.peaktemp, nm.peaktemp), unitsales = m.unitsales + coalesce(nm.unitsales, $1) WHEN NOT MATCHED THEN INSERT (city_id, logdate, peaktemp, unitsales) VALUES (city_id, logdate, peaktemp, unitsales)",
    ),
    (
        "DECLARE cursor_b CURSOR FOR SELECT * FROM x WHERE id = 123",
        "DECLARE cursor_b CURSOR FOR SELECT * FROM x WHERE id = $1",
    ),
    ("FETCH 1000 FROM cursor_a", "FETCH 1000 FROM cursor_a"),
    ("CLOSE cursor_a", "CLOSE cursor_a"),
];

#[test]
fn corpus_matches_pg_stat_statements_normalization() {
    let normalizer = support::pg_stat_statements_normalizer();
    for (input, expected) in CORPUS {
        let actual = normalizer
            .normalize(input)
            .unwrap_or_else(|e| panic!("failed to normalize {input:?}: {e}"));
        assert_eq!(&actual, expected, "input: {input}");
    }
}

#[test]
fn normalized_corpus_is_a_fixed_point() {
    let normalizer = support::pg_stat_statements_normalizer();
    for (_, expected) in CORPUS {
        let again = normalizer
            .normalize(expected)
            .unwrap_or_else(|e| panic!("failed to normalize {expected:?}: {e}"));
        assert_eq!(&again, expected);
    }
}

#[test]
fn group_by_literals_get_fresh_indices_by_default() {
    let sql = "select date_trunc($1, created_at at time zone $2), count(*) from users group by date_trunc('day', created_at at time zone 'US/Pacific')";
    assert_eq!(
        normalize(sql).unwrap(),
        "select date_trunc($1, created_at at time zone $2), count(*) from users group by date_trunc($3, created_at at time zone $4)"
    );
}

#[test]
fn repeated_values_are_never_coalesced() {
    assert_eq!(
        normalize("SELECT 'a', 'a' FROM t WHERE x IN ('a', 'a')").unwrap(),
        "SELECT $1, $2 FROM t WHERE x IN ($3, $4)"
    );
}

#[test]
fn numeric_role_and_routine_options_are_settings() {
    assert_eq!(
        normalize("CREATE ROLE app LOGIN CONNECTION LIMIT 5 PASSWORD NULL").unwrap(),
        "CREATE ROLE app LOGIN CONNECTION LIMIT 5 PASSWORD NULL"
    );
    assert_eq!(
        normalize("CREATE FUNCTION f(x int DEFAULT 3) RETURNS int LANGUAGE sql COST 100 AS 'SELECT x + 1'")
            .unwrap(),
        "CREATE FUNCTION f(x int DEFAULT 3) RETURNS int LANGUAGE sql COST 100 AS $1"
    );
}

#[test]
fn subscription_parameters_are_preserved() {
    assert_eq!(
        normalize("CREATE SUBSCRIPTION s CONNECTION 'dbname=x' PUBLICATION p WITH (copy_data = false, slot_name = 'slot')")
            .unwrap(),
        "CREATE SUBSCRIPTION s CONNECTION $1 PUBLICATION p WITH (copy_data = false, slot_name = 'slot')"
    );
}

#[test]
fn routine_bodies_can_be_kept() {
    let normalizer = sqlnorm::Normalizer::new(sqlnorm::NormalizeOptions {
        keep_routine_bodies: true,
        ..Default::default()
    });
    let sql = "DO $$BEGIN PERFORM 1; END$$";
    assert_eq!(normalizer.normalize(sql).unwrap(), sql);
    assert_eq!(
        normalizer
            .normalize("CREATE FUNCTION f() RETURNS int AS 'SELECT 1' LANGUAGE sql; SELECT f() + 2")
            .unwrap(),
        "CREATE FUNCTION f() RETURNS int AS 'SELECT 1' LANGUAGE sql; SELECT f() + $1"
    );
}

#[test]
fn type_parameters_are_preserved() {
    assert_eq!(
        normalize("SELECT '1'::numeric(10, 2), ARRAY[1]::int[3], CURRENT_TIMESTAMP(3), 'x'::varchar(8)[]")
            .unwrap(),
        "SELECT $1::numeric(10, 2), ARRAY[$2]::int[3], CURRENT_TIMESTAMP(3), $3::varchar(8)[]"
    );
}

#[test]
fn typed_strings_and_intervals_keep_their_type() {
    assert_eq!(
        normalize("SELECT DATE '2024-01-01', INTERVAL '1 day', now() - interval '2 hours'").unwrap(),
        "SELECT DATE $1, INTERVAL $2, now() - interval $3"
    );
}

#[test]
fn unsupported_statements_pass_through() {
    let sql = "CREATE TABLE t (a int DEFAULT 5, b varchar(10) CHECK (b <> 'x'))";
    assert_eq!(normalize(sql).unwrap(), sql);
    let report = sqlnorm::Normalizer::default().normalize_detailed(sql).unwrap();
    assert_eq!(report.statements[0].kind, "utility");
    assert_eq!(report.statements[0].unsupported[0].construct, "CREATE TABLE");
}

#[test]
fn deeply_nested_expressions_fail_with_a_parse_error() {
    let sql = format!("SELECT {}1{}", "(".repeat(1000), ")".repeat(1000));
    let err = normalize(&sql).unwrap_err();
    let parse = err.as_parse_error().expect("parse error");
    assert_eq!(parse.message, "stack depth limit exceeded");

    let results = sqlnorm::Normalizer::default().normalize_batch(&[sql.as_str(), "SELECT 1"]);
    assert!(results[0].is_err());
    assert_eq!(results[1].as_deref().unwrap(), "SELECT $1");
}

#[test]
fn long_generated_predicates_normalize() {
    let terms: Vec<String> = (0..5000).map(|i| format!("c{i} = {i}")).collect();
    let expected: Vec<String> = (0..5000).map(|i| format!("c{i} = ${}", i + 1)).collect();
    let sql = format!("SELECT * FROM t WHERE {}", terms.join(" AND "));
    assert_eq!(
        normalize(&sql).unwrap(),
        format!("SELECT * FROM t WHERE {}", expected.join(" AND "))
    );

    let sql = format!("SELECT * FROM t WHERE {}", terms.join(" OR "));
    assert!(normalize(&sql).unwrap().ends_with("c4999 = $5000"));
}

#[test]
fn out_of_range_placeholders_are_rejected() {
    let err = normalize("SELECT $4294967295, 1").unwrap_err();
    assert_eq!(
        err.as_parse_error().map(|e| e.message.as_str()),
        Some("parameter number too large")
    );
    assert_eq!(
        normalize("SELECT $2147483647, 1").unwrap(),
        "SELECT $2147483647, $2147483648"
    );
}

#[test]
fn string_continuation_lines_are_one_constant() {
    assert_eq!(normalize("SELECT 'a'\n'b'").unwrap(), "SELECT $1");
    assert_eq!(
        normalize("SELECT 'a' 'b'").unwrap_err().as_parse_error().map(|e| e.column),
        Some(12)
    );
    assert_eq!(
        normalize("SELECT E'a\\n'\n  -- more\n  'b', 'c'").unwrap(),
        "SELECT $1, $2"
    );
}

#[test]
fn like_accepts_quantified_patterns() {
    assert_eq!(
        normalize("SELECT * FROM t WHERE a LIKE ANY (ARRAY['x'])").unwrap(),
        "SELECT * FROM t WHERE a LIKE ANY (ARRAY[$1])"
    );
    assert_eq!(
        normalize("SELECT * FROM t WHERE a NOT ILIKE ALL (ARRAY['%a', '%b'])").unwrap(),
        "SELECT * FROM t WHERE a NOT ILIKE ALL (ARRAY[$1, $2])"
    );
}
