#[cfg(test)]
mod tests {
    use rowkit::{
        ColumnDef, ConfigurationError, Entity, Error, KeyGeneration, Result, TableDef, Value,
        is_configuration_error,
    };
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    static DECLARED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Entity for Counted {
        fn table_def() -> TableDef {
            DECLARED.fetch_add(1, Ordering::Relaxed);
            TableDef::new("counted")
                .column(ColumnDef::new("id").primary_key(KeyGeneration::AutoIncrement))
                .column(ColumnDef::new("label"))
        }
        fn field(&self, _field: &str) -> Option<Value> {
            None
        }
        fn set_field(&mut self, field: &str, _value: Value) -> Result<()> {
            Err(Error::msg(format!("Cannot assign `{}`", field)))
        }
    }

    macro_rules! broken_entity {
        ($name:ident, $table:expr) => {
            struct $name;
            impl Entity for $name {
                fn table_def() -> TableDef {
                    $table
                }
                fn field(&self, _field: &str) -> Option<Value> {
                    None
                }
                fn set_field(&mut self, field: &str, _value: Value) -> Result<()> {
                    Err(Error::msg(format!("Cannot assign `{}`", field)))
                }
            }
        };
    }

    #[test]
    fn resolved_once() {
        let first = Counted::metadata().expect("Metadata must resolve");
        let second = Counted::metadata().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DECLARED.load(Ordering::Relaxed), 1);
        assert_eq!(first.name, "counted");
        assert_eq!(first.primary_key_defs().count(), 1);
        assert_eq!(
            first.value_defs().map(|c| c.name.as_ref()).collect::<Vec<_>>(),
            ["label"]
        );
        assert!(first.columns[0].is_auto_increment());
        assert!(!first.columns[0].is_generated());
        assert_eq!(first.column_by_field("label").map(|c| c.primary_key), Some(false));
    }

    #[test]
    fn missing_table_name() {
        broken_entity!(Nameless, TableDef::new(" ").column(ColumnDef::new("id")));
        let error = Nameless::metadata().unwrap_err();
        assert!(is_configuration_error(&error));
        assert!(error.to_string().contains("table name"), "{}", error);
        // Still broken the second time
        assert!(is_configuration_error(&Nameless::metadata().unwrap_err()));
    }

    #[test]
    fn missing_columns() {
        broken_entity!(Empty, TableDef::new("empty"));
        let error = Empty::metadata().unwrap_err();
        let Some(error) = error.downcast_ref::<ConfigurationError>() else {
            panic!("Expected a configuration error, found {:#}", error);
        };
        assert!(
            error
                .message
                .ends_with("(table `empty`) does not declare any column"),
            "{}",
            error
        );
    }

    #[test]
    fn invalid_declarations() {
        broken_entity!(
            Twice,
            TableDef::new("twice")
                .column(ColumnDef::new("a"))
                .column(ColumnDef::new("a").with_name("b"))
        );
        broken_entity!(
            TwoGenerated,
            TableDef::new("two_generated")
                .column(ColumnDef::new("a").primary_key(KeyGeneration::AutoIncrement))
                .column(ColumnDef::new("b").primary_key(KeyGeneration::GeneratedIdentifier))
        );
        broken_entity!(
            Unnamed,
            TableDef::new("unnamed").column(ColumnDef::new("a").with_name(""))
        );
        let error = Twice::metadata().unwrap_err();
        assert!(error.to_string().contains("more than once"), "{}", error);
        let error = TwoGenerated::metadata().unwrap_err();
        assert!(error.to_string().contains("more than one generated"), "{}", error);
        let error = Unnamed::metadata().unwrap_err();
        assert!(error.to_string().contains("without a name"), "{}", error);
    }

    #[test]
    fn key_generation_defaults() {
        let column = ColumnDef::new("code").primary_key(KeyGeneration::None);
        assert_eq!(column.key_generation, KeyGeneration::ExternallySupplied);
        assert_eq!(column.name, "code");
        let column = ColumnDef::new("Code").with_name("code");
        assert!(!column.primary_key);
        assert_eq!(column.key_generation, KeyGeneration::None);
        assert_eq!(column.field, "Code");
    }
}
