/// Return the identifier without surrounding double quotes, unescaping `""`.
pub fn unquote_identifier(ident: &str) -> String {
    ident
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map_or_else(|| ident.to_string(), |inner| inner.replace("\"\"", "\""))
}

/// Normalize an identifier for case-insensitive matching.
///
/// Trims whitespace, removes surrounding double quotes on a single identifier,
/// and lowercases the result.
pub fn normalize_identifier(ident: &str) -> String {
    unquote_identifier(ident.trim()).to_ascii_lowercase()
}

/// `PostgreSQL` keywords that can never be used as a bare column or table label.
///
/// Fully reserved keywords plus the type/function-name class (`LEFT`, `JOIN`,
/// `ILIKE`, …) that would otherwise be mistaken for aliases.
const RESERVED_KEYWORDS: &[&str] = &[
    "all",
    "analyse",
    "analyze",
    "and",
    "any",
    "array",
    "as",
    "asc",
    "asymmetric",
    "authorization",
    "binary",
    "both",
    "case",
    "cast",
    "check",
    "collate",
    "collation",
    "column",
    "concurrently",
    "constraint",
    "create",
    "cross",
    "current_catalog",
    "current_date",
    "current_role",
    "current_schema",
    "current_time",
    "current_timestamp",
    "current_user",
    "default",
    "deferrable",
    "desc",
    "distinct",
    "do",
    "else",
    "end",
    "except",
    "false",
    "fetch",
    "for",
    "foreign",
    "freeze",
    "from",
    "full",
    "grant",
    "group",
    "having",
    "ilike",
    "in",
    "initially",
    "inner",
    "intersect",
    "into",
    "is",
    "isnull",
    "join",
    "lateral",
    "leading",
    "left",
    "like",
    "limit",
    "localtime",
    "localtimestamp",
    "natural",
    "not",
    "notnull",
    "null",
    "offset",
    "on",
    "only",
    "or",
    "order",
    "outer",
    "overlaps",
    "placing",
    "primary",
    "references",
    "returning",
    "right",
    "select",
    "session_user",
    "similar",
    "some",
    "symmetric",
    "system_user",
    "table",
    "tablesample",
    "then",
    "to",
    "trailing",
    "true",
    "union",
    "unique",
    "user",
    "using",
    "variadic",
    "verbose",
    "when",
    "where",
    "window",
    "with",
];

/// True when `word` is a reserved keyword (case-insensitive).
pub fn is_reserved_keyword(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    RESERVED_KEYWORDS.binary_search(&lower.as_str()).is_ok()
}

/// True when `word` opens one of the multi-word SQL type names
/// (`double precision`, `character varying`, `timestamp with time zone`, …).
pub fn is_multiword_type_start(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "double" | "character" | "char" | "national" | "bit" | "timestamp" | "time" | "interval"
    )
}

/// Fields accepted after `INTERVAL` (`INTERVAL '1' DAY TO SECOND`).
pub fn is_interval_field(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "year" | "month" | "day" | "hour" | "minute" | "second"
    )
}

/// Collapse a role option keyword sequence into its canonical name.
///
/// Examples:
/// - `ENCRYPTED PASSWORD` -> `"password"`
/// - `VALID UNTIL` -> `"validuntil"`
/// - `CONNECTION LIMIT` -> `"connectionlimit"`
pub fn canonical_option_name(words: &[&str]) -> String {
    let significant: Vec<String> = words
        .iter()
        .map(|word| word.to_ascii_lowercase())
        .filter(|word| word != "encrypted" && word != "unencrypted")
        .collect();
    significant.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_keyword_table_is_sorted_for_binary_search() {
        let mut sorted = RESERVED_KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_KEYWORDS);
    }

    #[test]
    fn reserved_keywords_match_case_insensitively() {
        assert!(is_reserved_keyword("FROM"));
        assert!(is_reserved_keyword("Left"));
        assert!(!is_reserved_keyword("set"));
        assert!(!is_reserved_keyword("users"));
    }

    #[test]
    fn unquote_identifier_strips_quotes_and_unescapes() {
        assert_eq!(unquote_identifier(r#""my""col""#), r#"my"col"#);
        assert_eq!(unquote_identifier("plain"), "plain");
    }

    #[test]
    fn normalize_identifier_handles_quotes_and_case() {
        assert_eq!(normalize_identifier(r#""UID""#), "uid");
        assert_eq!(normalize_identifier("  Created_At "), "created_at");
    }

    #[test]
    fn canonical_option_name_drops_encryption_markers() {
        assert_eq!(canonical_option_name(&["ENCRYPTED", "PASSWORD"]), "password");
        assert_eq!(canonical_option_name(&["VALID", "UNTIL"]), "validuntil");
        assert_eq!(
            canonical_option_name(&["CONNECTION", "LIMIT"]),
            "connectionlimit"
        );
    }
}
