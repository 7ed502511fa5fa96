use std::collections::HashMap;

use colframe::{decode, respond, ErrorKind, QueryExecutor, Table};

use crate::people;

/// Serves canned tables keyed by statement text.
struct Canned {
    tables: HashMap<String, Table>,
}

impl QueryExecutor for Canned {
    type Error = String;

    fn execute(&self, sql: &str) -> Result<Table, String> {
        self.tables
            .get(sql)
            .cloned()
            .ok_or_else(|| format!("no such table in `{}`", sql))
    }
}

#[test]
fn respond_round_trips_the_result() {
    let mut tables = HashMap::new();
    tables.insert("select * from people".to_string(), people());
    let executor = Canned { tables };

    let bytes = respond(&executor, "select * from people").unwrap();
    assert_eq!(decode(&bytes).unwrap(), people());

    let err = respond(&executor, "select * from pets").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("pets"));
}

#[test]
fn closures_are_executors() {
    let executor = |sql: &str| -> Result<Table, std::io::Error> {
        assert_eq!(sql, "select count(*) from people");
        Ok(people().head(0))
    };
    let bytes = respond(&executor, "select count(*) from people").unwrap();
    let table = decode(&bytes).unwrap();
    assert_eq!(table.num_rows(), 0);
    assert_eq!(table.schema(), people().schema());
}
