//! Built-in function names recognized per engine family.
//!
//! Expressions handed to the builders may only call functions listed here.
//! Names are stored lowercase and matched case-insensitively.

use std::collections::HashSet;

/// Aggregates and operator keywords every family recognizes.
pub const COMMON: &[&str] = &[
    "count", "sum", "avg", "min", "max", "and", "or", "between", "binary", "case",
    "div", "in", "is", "not", "null", "like", "rlike", "xor",
];

pub const DEFAULT: &[&str] = &[
    "abs", "acos", "array_agg", "ascii", "asin", "atan", "atan2", "avg", "bit_and",
    "bit_length", "bit_or", "cardinality", "cast", "ceil", "ceiling", "char",
    "char_length", "character_length", "coalesce", "concat", "concat_ws", "cos", "cosh",
    "cot", "count", "curdate", "current_date", "current_schema", "current_time",
    "current_timestamp", "current_user", "curtime", "database", "dateadd", "datediff",
    "day", "dayname", "dayofmonth", "dayofweek", "dayofyear", "decode", "degrees",
    "exp", "extract", "floor", "format", "formatdatetime", "greatest", "hash",
    "hextoraw", "hour", "identity", "ifnull", "insert", "instr", "isnull", "lcase",
    "left", "length", "locate", "log", "log10", "lower", "lpad", "ltrim", "max", "min",
    "minute", "mod", "month", "monthname", "now", "nullif", "nvl", "octet_length",
    "parsedatetime", "pi", "position", "power", "quarter", "radians", "rand",
    "random_uuid", "rawtohex", "regexp_like", "regexp_replace", "regexp_substr",
    "repeat", "replace", "right", "round", "rownum", "rpad", "rtrim", "second", "sign",
    "sin", "sinh", "soundex", "space", "sqrt", "stddev_pop", "stddev_samp", "substr",
    "substring", "sum", "tan", "tanh", "to_char", "to_date", "translate", "trim",
    "trunc", "truncate", "ucase", "upper", "user", "uuid", "var_pop", "var_samp",
    "week", "year",
];

pub const HANA: &[&str] = &[
    "abap_alphanum", "abap_numc", "abap_lower", "abap_upper", "abs", "acos", "add_days",
    "add_months", "add_months_last", "add_nano100", "add_seconds", "add_workdays",
    "add_years", "ascii", "asin", "atan", "atan2", "auto_corr", "bintohex", "bintonhex",
    "bintostr", "bitand", "bitcount", "bitnot", "bitor", "bitset", "bitunset", "bitxor",
    "cardinality", "cast", "ceil", "char", "coalesce", "concat", "concat_naz",
    "convert_currency", "convert_unit", "corr", "corr_spearman", "cos", "cosh", "cot",
    "cross_corr", "current_connection", "current_date", "current_identity_value",
    "current_mvcc_snapshot_timestamp", "current_object_schema", "current_schema",
    "current_time", "current_timestamp", "current_transaction_isolation_level",
    "current_update_statement_sequence", "current_update_transaction", "current_user",
    "current_utcdate", "current_utctime", "current_utctimestamp", "dayname", "dayofmonth",
    "dayofyear", "days_between", "dft", "encryption_root_keys_extract_keys",
    "encryption_root_keys_has_backup_password", "escape_double_quotes",
    "escape_single_quotes", "exp", "expression_macro", "extract", "first_value", "floor",
    "generate_password", "greatest", "grouping", "grouping_id", "hamming_distance",
    "hash_md5", "hash_sha256", "hextobin", "hour", "ifnull", "indexing_error_code",
    "indexing_error_message", "indexing_status", "initcap", "is_sql_injection_safe",
    "isoweek", "json_query", "json_table", "json_value", "language", "last_day", "last_value",
    "lcase", "least", "left", "length", "ln", "localtoutc", "locate", "locate_regexpr", "log",
    "lower", "lpad", "ltrim", "map", "median", "member_at", "mimetype", "minute", "mod", "month",
    "monthname", "months_between", "nano100_between", "nchar", "ndiv0", "next_day", "newuid",
    "normalize", "now", "nth_value", "nullif", "occurrences_regexpr", "plaintext", "power",
    "quarter", "rand", "rand_secure", "record_commit_timestamp", "record_id", "replace",
    "replace_regexpr", "result_cache_id", "result_cache_refresh_time", "right", "round",
    "rpad", "rtrim", "score", "second", "seconds_between", "series_disaggregate",
    "series_element_to_period", "series_generate", "series_period_to_element",
    "series_round", "session_context", "session_user", "sign", "sin", "sinh", "soundex",
    "sqrt", "stddev_pop", "stddev_samp", "string_agg", "strtobin", "subarray", "substr_after",
    "substr_before", "substring_regexpr", "substring", "sysuuid", "tan", "tanh",
    "to_alphanum", "to_bigint", "to_binary", "to_blob", "to_boolean", "to_clob", "to_date",
    "to_dats", "to_decimal", "to_double", "to_fixedchar", "to_int", "to_integer",
    "to_json_boolean", "to_nclob", "to_nvarchar", "to_real", "to_seconddate",
    "to_smalldecimal", "to_smallint", "to_time", "to_timestamp", "to_tinyint", "to_varchar",
    "trim", "trim_array", "ucase", "uminus", "unicode", "upper", "utctolocal", "var_pop",
    "var_samp", "week", "weekday", "width_bucket", "workdays_between", "xmlextract",
    "xmlextractvalue", "xmltable", "year", "years_between",
];

pub const DERBY: &[&str] = &[
    "abs", "absval", "acos", "asin", "atan", "atan2", "avg", "bigint", "cast", "ceil",
    "ceiling", "char", "coalesce", "cos", "cosh", "cot", "count", "current_date",
    "current_isolation", "current_role", "current_schema", "current_time",
    "current_timestamp", "current_user", "date", "day", "degrees", "double", "exp",
    "floor", "hour", "identity_val_local", "integer", "lcase", "length", "ln", "locate",
    "log", "log10", "long", "lower", "ltrim", "max", "min", "minute", "mod", "month",
    "nullif", "pi", "radians", "rand", "random", "rtrim", "second", "session_user",
    "sign", "sin", "sinh", "smallint", "sqrt", "substr", "sum", "tan", "tanh", "time",
    "timestamp", "trim", "ucase", "upper", "user", "varchar", "xmlexists", "xmlparse",
    "xmlquery", "xmlserialize", "year",
];

pub const POSTGRES: &[&str] = &[
    "abs", "acos", "age", "array_agg", "array_append", "array_length", "array_position",
    "array_to_string", "ascii", "asin", "atan", "atan2", "avg", "bit_and", "bit_length",
    "bit_or", "bool_and", "bool_or", "btrim", "cardinality", "cast", "cbrt", "ceil",
    "ceiling", "char_length", "character_length", "chr", "clock_timestamp", "coalesce",
    "concat", "concat_ws", "cos", "cosh", "cot", "count", "current_date",
    "current_schema", "current_time", "current_timestamp", "current_user", "currval",
    "date_part", "date_trunc", "decode", "degrees", "div", "encode", "every", "exp",
    "extract", "floor", "format", "gen_random_uuid", "generate_series", "greatest",
    "initcap", "json_agg", "json_build_object", "jsonb_agg", "jsonb_build_object",
    "justify_days", "lag", "lastval", "lead", "least", "left", "length", "ln",
    "localtime", "localtimestamp", "log", "lower", "lpad", "ltrim", "make_date",
    "make_interval", "make_timestamp", "max", "md5", "min", "mod", "nextval", "now",
    "nullif", "octet_length", "overlay", "pg_get_serial_sequence", "pi", "position",
    "power", "quote_ident", "quote_literal", "radians", "random", "rank",
    "regexp_match", "regexp_replace", "regexp_split_to_array", "repeat", "replace",
    "reverse", "right", "round", "row_number", "rpad", "rtrim", "session_user", "sign",
    "sin", "sinh", "split_part", "sqrt", "statement_timestamp", "stddev", "stddev_pop",
    "stddev_samp", "string_agg", "strpos", "substr", "substring", "sum", "tan", "tanh",
    "to_char", "to_date", "to_hex", "to_number", "to_timestamp", "translate", "trim",
    "trunc", "unnest", "upper", "variance",
];

pub const SQLITE: &[&str] = &[
    "abs", "avg", "changes", "char", "coalesce", "count", "date", "datetime", "glob",
    "group_concat", "hex", "ifnull", "iif", "instr", "json", "json_array",
    "json_extract", "json_object", "julianday", "last_insert_rowid", "length", "like",
    "likelihood", "lower", "ltrim", "max", "min", "nullif", "printf", "quote", "random",
    "randomblob", "replace", "round", "rtrim", "sign", "strftime", "string_agg",
    "substr", "substring", "sum", "time", "total", "total_changes", "trim", "typeof",
    "unhex", "unicode", "unixepoch", "upper", "zeroblob",
];

/// Immutable set of recognized function names owned by one dialect.
#[derive(Debug, Clone, Default)]
pub struct FunctionSet {
    names: HashSet<&'static str>,
}

impl FunctionSet {
    /// Builds a set from the engine list plus [`COMMON`].
    pub fn with_common(engine: &[&'static str]) -> Self {
        Self {
            names: COMMON.iter().chain(engine).copied().collect(),
        }
    }

    /// Case-insensitive membership check.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.to_ascii_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in lexicographic order.
    pub fn sorted(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.names.iter().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_lowercase() {
        for list in [COMMON, DEFAULT, HANA, DERBY, POSTGRES, SQLITE] {
            for name in list {
                assert_eq!(*name, name.to_ascii_lowercase(), "{name} is not lowercase");
            }
        }
    }

    #[test]
    fn test_membership_is_case_insensitive() {
        let set = FunctionSet::with_common(HANA);
        assert!(set.contains("CURRENT_IDENTITY_VALUE"));
        assert!(set.contains("Count"));
        assert!(set.contains("and"));
        assert!(!set.contains("pg_sleep"));
    }

    #[test]
    fn test_families_differ() {
        let postgres = FunctionSet::with_common(POSTGRES);
        let sqlite = FunctionSet::with_common(SQLITE);
        assert!(postgres.contains("nextval"));
        assert!(!sqlite.contains("nextval"));
        assert!(sqlite.contains("last_insert_rowid"));
        assert!(FunctionSet::with_common(HANA).len() > 200);
    }
}
