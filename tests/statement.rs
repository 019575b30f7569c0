#[cfg(test)]
mod tests {
    use rowkit::{
        ColumnDef, Entity, Error, GeneratedKey, GenericSqlWriter, KeyGeneration, Result, SqlWriter,
        TableDef, Value, generate_delete, generate_insert, generate_update, is_configuration_error,
        is_validation_error,
    };
    use uuid::Uuid;

    /// Declared by hand, the field names differ from the column names.
    struct Account {
        id: Value,
        name: String,
        email: Option<String>,
    }

    impl Entity for Account {
        fn table_def() -> TableDef {
            TableDef::new("users")
                .column(
                    ColumnDef::new("Id")
                        .with_name("id")
                        .primary_key(KeyGeneration::GeneratedIdentifier),
                )
                .column(ColumnDef::new("Name").with_name("name"))
                .column(ColumnDef::new("Email").with_name("email"))
        }
        fn field(&self, field: &str) -> Option<Value> {
            match field {
                "Id" => Some(self.id.clone()),
                "Name" => Some(self.name.clone().into()),
                "Email" => Some(self.email.clone().into()),
                _ => None,
            }
        }
        fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
            match field {
                "Id" => self.id = value,
                _ => return Err(Error::msg(format!("Cannot assign `{}`", field))),
            }
            Ok(())
        }
    }

    #[test]
    fn insert_generates_the_key() {
        let mut account = Account {
            id: Value::Null,
            name: "Ann".into(),
            email: Some("a@x.com".into()),
        };
        let statement = generate_insert(&mut account).expect("Could not build the insert");
        assert_eq!(
            statement.sql,
            "INSERT INTO users (id, name, email) VALUES (@Id, @Name, @Email)"
        );
        assert_eq!(
            statement.params.names().collect::<Vec<_>>(),
            ["Id", "Name", "Email"]
        );
        let Value::Uuid(Some(id)) = account.id else {
            panic!("Expected a generated uuid, found {:?}", account.id);
        };
        assert!(!id.is_nil());
        assert_eq!(statement.params.get("Id"), Some(&account.id));
        assert_eq!(
            statement.generated,
            Some(GeneratedKey {
                field: "Id".into(),
                value: account.id.clone(),
            })
        );
        assert_eq!(
            statement.params.get("Email"),
            Some(&Value::Varchar(Some("a@x.com".into())))
        );

        // Writing it again keeps the key
        let statement = generate_insert(&mut account).unwrap();
        assert_eq!(account.id, Value::Uuid(Some(id)));
        assert_eq!(statement.params.get("Id"), Some(&Value::Uuid(Some(id))));
        assert_eq!(statement.generated, None);
    }

    #[test]
    fn insert_keeps_an_assigned_key() {
        let existing = Uuid::new_v4();
        let mut account = Account {
            id: Value::Uuid(Some(existing)),
            name: "Ann".into(),
            email: None,
        };
        let statement = generate_insert(&mut account).unwrap();
        assert_eq!(statement.params.get("Id"), Some(&Value::Uuid(Some(existing))));
        assert_eq!(statement.params.get("Email"), Some(&Value::Varchar(None)));
        assert_eq!(statement.generated, None);
        assert_eq!(account.id, Value::Uuid(Some(existing)));
    }

    #[test]
    fn insert_generates_text_keys() {
        let mut account = Account {
            id: Value::Varchar(Some(String::new())),
            name: "Ann".into(),
            email: None,
        };
        generate_insert(&mut account).unwrap();
        let Value::Varchar(Some(id)) = &account.id else {
            panic!("Expected a text key, found {:?}", account.id);
        };
        assert!(Uuid::parse_str(id).is_ok(), "{}", id);
    }

    #[test]
    fn insert_rejects_keys_without_room_for_an_identifier() {
        let mut account = Account {
            id: Value::Int64(Some(0)),
            name: "Ann".into(),
            email: None,
        };
        let error = generate_insert(&mut account).unwrap_err();
        assert!(is_validation_error(&error), "{:#}", error);
        assert_eq!(account.id, Value::Int64(Some(0)));
    }

    #[test]
    fn update_sets_values_and_matches_keys() {
        let account = Account {
            id: Value::Int64(Some(5)),
            name: "Ann2".into(),
            email: Some("a@x.com".into()),
        };
        let statement = generate_update(&account).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE users SET name=@Name, email=@Email WHERE id=@Id"
        );
        assert_eq!(
            statement.params.to_string(),
            "{Name: 'Ann2', Email: 'a@x.com', Id: 5}"
        );
        assert_eq!(statement.generated, None);
    }

    #[test]
    fn delete_matches_keys() {
        let account = Account {
            id: Value::Int64(Some(5)),
            name: "Ann2".into(),
            email: None,
        };
        let statement = generate_delete(&account).unwrap();
        assert_eq!(statement.sql, "DELETE FROM users WHERE id=@Id");
        assert_eq!(statement.params.len(), 1);
        assert_eq!(statement.params.get("Id"), Some(&Value::Int64(Some(5))));
    }

    #[test]
    fn auto_increment_is_left_out() {
        #[derive(Entity)]
        #[rowkit(table = "line_items")]
        struct LineItem {
            #[rowkit(primary_key, auto_increment)]
            id: i64,
            #[rowkit(primary_key)]
            order_id: i64,
            quantity: u16,
            #[rowkit(name = "note_text")]
            note: Option<String>,
        }
        let mut item = LineItem {
            id: 7,
            order_id: 3,
            quantity: 2,
            note: None,
        };
        let writer = GenericSqlWriter::new();
        let statement = writer.write_insert(&mut item).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO line_items (order_id, quantity, note_text) VALUES (@order_id, @quantity, @note)"
        );
        assert_eq!(statement.params.get("id"), None);
        assert_eq!(item.id, 7);

        let statement = writer.write_update(&item).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE line_items SET quantity=@quantity, note_text=@note WHERE id=@id AND order_id=@order_id"
        );
        assert_eq!(
            statement.params.names().collect::<Vec<_>>(),
            ["quantity", "note", "id", "order_id"]
        );

        let statement = writer.write_delete(&item).unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM line_items WHERE id=@id AND order_id=@order_id"
        );
    }

    #[test]
    fn nothing_to_write() {
        #[derive(Entity)]
        struct OnlyGenerated {
            #[rowkit(primary_key, auto_increment)]
            id: i32,
        }
        #[derive(Entity)]
        struct Unkeyed {
            label: String,
        }
        let error = generate_insert(&mut OnlyGenerated { id: 0 }).unwrap_err();
        assert!(is_validation_error(&error));
        assert_eq!(error.to_string(), "No columns found to insert");

        let error = generate_update(&OnlyGenerated { id: 1 }).unwrap_err();
        assert_eq!(error.to_string(), "No columns found to update");

        let unkeyed = Unkeyed {
            label: "plain".into(),
        };
        let error = generate_update(&unkeyed).unwrap_err();
        assert_eq!(error.to_string(), "No primary key defined for update");
        let error = generate_delete(&unkeyed).unwrap_err();
        assert!(is_validation_error(&error));
        assert_eq!(error.to_string(), "No primary key defined for delete");
        assert_eq!(Unkeyed::metadata().unwrap().name, "unkeyed");
    }

    #[test]
    fn undeclared_field() {
        struct Broken;
        impl Entity for Broken {
            fn table_def() -> TableDef {
                TableDef::new("broken").column(
                    ColumnDef::new("missing").primary_key(KeyGeneration::ExternallySupplied),
                )
            }
            fn field(&self, _field: &str) -> Option<Value> {
                None
            }
            fn set_field(&mut self, field: &str, _value: Value) -> Result<()> {
                Err(Error::msg(format!("Cannot assign `{}`", field)))
            }
        }
        let error = generate_delete(&Broken).unwrap_err();
        assert!(is_configuration_error(&error), "{:#}", error);
        assert!(error.to_string().contains("`missing`"));
    }

    #[test]
    fn derived_field_access() {
        #[derive(Entity, Debug, Default)]
        struct Profile {
            #[rowkit(primary_key, generated)]
            r#id: Uuid,
            _nickname: String,
            age: Option<u8>,
            #[rowkit(skip)]
            cache: Vec<String>,
        }
        let mut profile = Profile::default();
        let table = Profile::metadata().unwrap();
        assert_eq!(table.name, "profile");
        assert_eq!(
            table
                .columns
                .iter()
                .map(|c| (c.field.as_ref(), c.name.as_ref()))
                .collect::<Vec<_>>(),
            [("id", "id"), ("_nickname", "nickname"), ("age", "age")]
        );
        assert_eq!(profile.field("age"), Some(Value::UInt8(None)));
        assert_eq!(profile.field("cache"), None);
        profile
            .set_field("_nickname", Value::Varchar(Some("neo".into())))
            .unwrap();
        profile.set_field("age", Value::Int64(Some(30))).unwrap();
        assert_eq!(profile._nickname, "neo");
        assert_eq!(profile.age, Some(30));
        assert!(profile.set_field("age", Value::Int64(Some(300))).is_err());
        assert!(profile.set_field("cache", Value::Null).is_err());
        assert!(profile.cache.is_empty());

        let statement = generate_insert(&mut profile).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO profile (id, nickname, age) VALUES (@id, @_nickname, @age)"
        );
        assert!(!profile.id.is_nil());
    }
}
