mod support;

use sqlnorm::output::{self, NormalizedInput, OutputFormat};
use sqlnorm::Normalizer;

fn inputs() -> Vec<NormalizedInput> {
    let normalizer = Normalizer::default();
    [
        ("q.sql", "SELECT CAST('abc' AS varchar(50)) FROM t ORDER BY 1"),
        ("ddl.sql", "CREATE TABLE t (a int)"),
        ("bad.sql", "SELECT ("),
    ]
    .into_iter()
    .map(|(label, sql)| NormalizedInput::new(label, normalizer.normalize_detailed(sql)))
    .collect()
}

#[test]
fn markdown_report_summarizes_every_input() {
    let report = output::render(OutputFormat::Markdown, &inputs()).unwrap();
    insta::assert_snapshot!(report, @r#"
    # sqlnorm Normalization Report

    ## Summary

    | Input | Statements | Substitutions | Preserved | Unsupported |
    |-------|------------|---------------|-----------|-------------|
    | q.sql | 1 | 1 | 2 | 0 |
    | ddl.sql | 1 | 0 | 0 | 1 |
    | bad.sql | error | - | - | - |

    ## Normalized SQL

    ### q.sql

    ```sql
    SELECT CAST($1 AS varchar(50)) FROM t ORDER BY 1
    ```

    ### ddl.sql

    ```sql
    CREATE TABLE t (a int)
    ```

    ## Preserved Literals

    - q.sql: `50` (type modifier)
    - q.sql: `1` (order by item)

    ## Unsupported Constructs

    - ddl.sql: CREATE TABLE (bytes 0..22)

    ## Errors

    - **bad.sql**: SQL parse error: syntax error at end of input (line 1, column 9)
    "#);
}

#[test]
fn json_output_carries_the_detailed_report() {
    let inputs = inputs();
    insta::assert_json_snapshot!(&inputs[0], @r#"
    {
      "label": "q.sql",
      "normalized": "SELECT CAST($1 AS varchar(50)) FROM t ORDER BY 1",
      "statements": [
        {
          "kind": "select",
          "span": {
            "start": 0,
            "end": 51
          },
          "substitutions": [
            {
              "index": 1,
              "span": {
                "start": 12,
                "end": 17
              },
              "original": "'abc'"
            }
          ],
          "preserved": [
            {
              "span": {
                "start": 29,
                "end": 31
              },
              "site": "type_modifier",
              "text": "50"
            },
            {
              "span": {
                "start": 50,
                "end": 51
              },
              "site": "order_by_item",
              "text": "1"
            }
          ],
          "unsupported": []
        }
      ]
    }
    "#);
}

#[test]
fn text_output_written_to_file_matches_stdout_rendering() {
    let dir = support::unique_temp_dir("sqlnorm_output_text");
    let rendered = output::render(OutputFormat::Text, &inputs()).unwrap();
    assert_eq!(
        rendered,
        "SELECT CAST($1 AS varchar(50)) FROM t ORDER BY 1\nCREATE TABLE t (a int)\n"
    );

    let path = dir.join("normalized.sql");
    output::write_output(&path, &rendered).unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), rendered);
}
