#![cfg(feature = "sqlite")]

use std::collections::HashMap;

use portable_sql::prelude::*;
use tempfile::tempdir;

fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

fn open(prefix: &str) -> Result<SqliteConnection, PortableSqlError> {
    let provider = SqliteConnectionProvider::builder(unique_db_path(prefix)).build();
    let mut conn = provider.acquire()?;
    conn.execute_raw(
        "CREATE TABLE member (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL UNIQUE,
             active INTEGER NOT NULL DEFAULT 1,
             tags TEXT
         );",
    )?;
    Ok(conn)
}

fn member_meta() -> EntityMeta {
    EntityMeta::new("member")
        .column(
            ColumnMeta::new("id", "id", DeclaredType::Integer)
                .primary_key()
                .identity(),
        )
        .column(ColumnMeta::new("name", "name", DeclaredType::Text))
        .column(ColumnMeta::new("active", "active", DeclaredType::Boolean))
        .column(
            ColumnMeta::new("tags", "tags", DeclaredType::Array).element_type(DeclaredType::Text),
        )
}

fn row(pairs: &[(&str, RowValues)]) -> HashMap<String, RowValues> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn count_members(conn: &mut SqliteConnection) -> Result<usize, PortableSqlError> {
    let all = ConditionSelectCommand::new(
        DatabaseType::Sqlite,
        "member",
        &["id"],
        &AndScopeQueryClauseGroup::new(),
    );
    Ok(all.execute(conn, ())?.len())
}

#[test]
fn insert_reads_back_identity_key() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("identity")?;
    let registry = ValueTypeRegistry::new();
    let insert = AutoCommand::insert(
        DatabaseType::Sqlite,
        &member_meta(),
        &["name", "active"],
        &registry,
    )?
    .with_mapper(GeneratedKeyMapper);
    assert_eq!(insert.sql(), "insert into member (name, active) values (?, ?)");

    let first = insert.execute(
        &mut conn,
        &row(&[("name", RowValues::Text("ada".into())), ("active", RowValues::Bool(true))]),
    )?;
    let second = insert.execute(
        &mut conn,
        &row(&[("name", RowValues::Text("bob".into())), ("active", RowValues::Int(0))]),
    )?;
    assert_eq!(first, Some(RowValues::Int(1)));
    assert_eq!(second, Some(RowValues::Int(2)));
    Ok(())
}

#[test]
fn explicit_identity_and_array_values_are_bound() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("explicit")?;
    let registry = ValueTypeRegistry::new();
    let insert = AutoCommand::insert(
        DatabaseType::Sqlite,
        &member_meta(),
        &["id", "name", "tags"],
        &registry,
    )?;
    let inserted = insert.execute(
        &mut conn,
        &row(&[
            ("id", RowValues::Int(40)),
            ("name", RowValues::Text("cy".into())),
            (
                "tags",
                RowValues::Array(vec![RowValues::Text("a".into()), RowValues::Text("b".into())]),
            ),
        ]),
    )?;
    assert_eq!(inserted, 1);

    let condition = ComparisonClause::equal("id", RowValues::Int(40));
    let select = ConditionSelectCommand::new(DatabaseType::Sqlite, "member", &["tags"], &condition);
    let rs = select.execute(&mut conn, ())?;
    assert_eq!(rs.first_value(), Some(&RowValues::Text("[\"a\",\"b\"]".into())));
    Ok(())
}

#[test]
fn duplicate_insert_becomes_entity_already_exists() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("duplicate")?;
    let insert = AutoCommand::insert(
        DatabaseType::Sqlite,
        &member_meta(),
        &["name"],
        &ValueTypeRegistry::new(),
    )?
    .with_title("register member");
    let ada = row(&[("name", RowValues::Text("ada".into()))]);
    insert.execute(&mut conn, &ada)?;

    let err = insert.execute(&mut conn, &ada).unwrap_err();
    match err {
        PortableSqlError::EntityAlreadyExists { sql, params, source } => {
            assert_eq!(sql, "/* register member */ insert into member (name) values (?)");
            assert_eq!(params, vec![RowValues::Text("ada".into())]);
            assert_eq!(source.error_code, 2067);
        }
        other => panic!("expected EntityAlreadyExists, got {other:?}"),
    }
    Ok(())
}

#[test]
fn checked_update_and_delete_report_missing_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("checked")?;
    let registry = ValueTypeRegistry::new();
    let meta = member_meta();
    AutoCommand::insert(DatabaseType::Sqlite, &meta, &["name"], &registry)?
        .execute(&mut conn, &row(&[("name", RowValues::Text("ada".into()))]))?;

    let rename = AutoCommand::update(DatabaseType::Sqlite, &meta, &["name"], &registry)?
        .with_mapper(CheckedRowCountMapper);
    assert_eq!(rename.sql(), "update member set name = ? where id = ?");
    let updated = rename.execute(
        &mut conn,
        &row(&[("id", RowValues::Int(1)), ("name", RowValues::Text("ada l.".into()))]),
    )?;
    assert_eq!(updated, 1);

    let missing = rename
        .execute(
            &mut conn,
            &row(&[("id", RowValues::Int(99)), ("name", RowValues::Text("ghost".into()))]),
        )
        .unwrap_err();
    assert!(matches!(missing, PortableSqlError::EntityAlreadyDeleted { .. }));

    let delete = AutoCommand::delete(
        DatabaseType::Sqlite,
        &meta,
        &registry,
    )?.with_mapper(CheckedRowCountMapper);
    assert_eq!(delete.execute(&mut conn, &row(&[("id", RowValues::Int(1))]))?, 1);
    assert!(matches!(
        delete.execute(&mut conn, &row(&[("id", RowValues::Int(1))])),
        Err(PortableSqlError::EntityAlreadyDeleted { .. })
    ));
    assert_eq!(count_members(&mut conn)?, 0);
    Ok(())
}

#[test]
fn missing_property_is_a_parameter_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("missing")?;
    let insert = AutoCommand::insert(
        DatabaseType::Sqlite,
        &member_meta(),
        &["name", "active"],
        &ValueTypeRegistry::new(),
    )?;
    let err = insert
        .execute(&mut conn, &row(&[("name", RowValues::Text("ada".into()))]))
        .unwrap_err();
    assert!(matches!(err, PortableSqlError::ParameterError(_)));

    let err = insert
        .execute(
            &mut conn,
            &row(&[
                ("name", RowValues::Text("ada".into())),
                ("active", RowValues::Text("maybe".into())),
            ]),
        )
        .unwrap_err();
    assert!(matches!(err, PortableSqlError::ParameterError(_)));
    assert_eq!(count_members(&mut conn)?, 0);
    Ok(())
}

#[test]
fn batch_insert_returns_one_count_per_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("batch")?;
    let registry = ValueTypeRegistry::new();
    let batch = BatchAutoCommand::insert(
        DatabaseType::Sqlite,
        &member_meta(),
        &["id", "name"],
        &registry,
    )?;
    let rows: Vec<HashMap<String, RowValues>> = (1..=4)
        .map(|i| {
            row(&[
                ("id", RowValues::Int(i)),
                ("name", RowValues::Text(format!("member-{i}"))),
            ])
        })
        .collect();
    let counts = batch.execute(&mut conn, rows.as_slice())?;
    assert_eq!(counts, vec![1, 1, 1, 1]);
    assert_eq!(count_members(&mut conn)?, 4);

    let deactivate = BatchAutoCommand::update(
        DatabaseType::Sqlite,
        &member_meta(),
        &["active"],
        &registry,
    )?;
    let targets = vec![
        row(&[("id", RowValues::Int(2)), ("active", RowValues::Bool(false))]),
        row(&[("id", RowValues::Int(99)), ("active", RowValues::Bool(false))]),
        row(&[("id", RowValues::Int(3)), ("active", RowValues::Bool(false))]),
    ];
    assert_eq!(deactivate.execute(&mut conn, targets.as_slice())?, vec![1, 0, 1]);

    let inactive = ComparisonClause::equal("active", RowValues::Int(0));
    let select = ConditionSelectCommand::new(DatabaseType::Sqlite, "member", &["id"], &inactive);
    assert_eq!(select.execute(&mut conn, ())?.len(), 2);
    Ok(())
}

#[test]
fn batch_duplicate_becomes_entity_already_exists() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("batch_duplicate")?;
    let registry = ValueTypeRegistry::new();
    AutoCommand::insert(DatabaseType::Sqlite, &member_meta(), &["name"], &registry)?
        .execute(&mut conn, &row(&[("name", RowValues::Text("ada".into()))]))?;

    let batch = BatchAutoCommand::insert(
        DatabaseType::Sqlite,
        &member_meta(),
        &["id", "name"],
        &registry,
    )?
    .with_title("import members");
    let rows = vec![
        row(&[("id", RowValues::Int(2)), ("name", RowValues::Text("bob".into()))]),
        row(&[("id", RowValues::Int(3)), ("name", RowValues::Text("ada".into()))]),
    ];
    let err = batch.execute(&mut conn, rows.as_slice()).unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(
        err.sql(),
        Some("/* import members */ insert into member (id, name) values (?, ?)")
    );
    match err {
        PortableSqlError::EntityAlreadyExists { params, source, .. } => {
            assert_eq!(
                params,
                vec![
                    RowValues::Int(2),
                    RowValues::Text("bob".into()),
                    RowValues::Int(3),
                    RowValues::Text("ada".into()),
                ]
            );
            assert_eq!(source.error_code, 2067);
        }
        other => panic!("expected EntityAlreadyExists, got {other:?}"),
    }
    Ok(())
}

#[test]
fn batch_rows_must_supply_every_property() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open("batch_missing")?;
    let batch = BatchAutoCommand::insert(
        DatabaseType::Sqlite,
        &member_meta(),
        &["id", "name"],
        &ValueTypeRegistry::new(),
    )?;
    let rows = vec![
        row(&[("id", RowValues::Int(1)), ("name", RowValues::Text("a".into()))]),
        row(&[("id", RowValues::Int(2))]),
    ];
    assert!(matches!(
        batch.execute(&mut conn, rows.as_slice()),
        Err(PortableSqlError::ParameterError(_))
    ));
    assert_eq!(count_members(&mut conn)?, 0);
    Ok(())
}
