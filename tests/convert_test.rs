use chrono::NaiveDate;
use infra_kit::{InfraError, ModelConverter};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};

mod customer {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub email: String,
        pub nickname: Option<String>,
        pub created_at: DateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Customer {
    id: i64,
    name: String,
    email: String,
    #[serde(default)]
    nickname: Option<String>,
    created_at: chrono::NaiveDateTime,
}

const CUSTOMERS: ModelConverter<customer::Model, Customer> = ModelConverter::new();

fn row(id: i64, name: &str) -> customer::Model {
    customer::Model {
        id,
        name: name.to_string(),
        email: format!("{name}@example.com"),
        nickname: None,
        created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap(),
    }
}

#[test]
fn test_entity_model_round_trips_through_domain() {
    let model = row(1, "alice");
    let domain = CUSTOMERS.to_domain(&model).unwrap();
    assert_eq!(domain.name, "alice");
    assert_eq!(domain.created_at, model.created_at);

    let back = CUSTOMERS.to_model(&domain).unwrap();
    assert_eq!(back, model);
}

#[test]
fn test_batch_conversion_keeps_order() {
    let models = vec![row(1, "alice"), row(2, "bob"), row(3, "carol")];
    let domains = CUSTOMERS.to_domains(&models).unwrap();
    let names: Vec<&str> = domains.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["alice", "bob", "carol"]);

    assert!(CUSTOMERS.to_models(&[]).unwrap().is_empty());
}

#[test]
fn test_lookup_results() {
    let missing = CUSTOMERS
        .to_domain_with_error(Err(DbErr::RecordNotFound("customers".to_string())))
        .unwrap();
    assert!(missing.is_none());

    let found = CUSTOMERS
        .to_domain_with_error(Ok(row(7, "dave")))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, 7);

    let err = CUSTOMERS
        .to_domain_with_error(Err(DbErr::Custom("connection reset".to_string())))
        .unwrap_err();
    assert!(matches!(err, InfraError::DatabaseError(_)));

    assert_eq!(CUSTOMERS.to_domain_opt(Some(row(8, "erin"))).unwrap().unwrap().id, 8);
}

#[test]
fn test_update_existing_model() {
    let mut model = row(1, "alice");
    let mut domain = CUSTOMERS.to_domain(&model).unwrap();
    domain.email = "alice@corp.example".to_string();
    domain.nickname = Some("al".to_string());

    CUSTOMERS.to_model_from(&domain, &mut model).unwrap();
    assert_eq!(model.email, "alice@corp.example");
    assert_eq!(model.nickname.as_deref(), Some("al"));

    let mut stale = CUSTOMERS.to_domain(&row(1, "alice")).unwrap();
    CUSTOMERS.to_domain_from(&model, &mut stale).unwrap();
    assert_eq!(stale, domain);
}

#[test]
fn test_patch_skips_empty_domain_fields() {
    let mut model = row(1, "alice");
    model.nickname = Some("al".to_string());

    let patch = Customer {
        id: 1,
        name: String::new(),
        email: "new@example.com".to_string(),
        nickname: None,
        created_at: model.created_at,
    };
    CUSTOMERS.patch_model_from(&patch, &mut model).unwrap();

    assert_eq!(model.name, "alice");
    assert_eq!(model.email, "new@example.com");
    assert_eq!(model.nickname.as_deref(), Some("al"));
}

#[test]
fn test_maps_use_column_names() {
    let map = CUSTOMERS.model_to_map(&row(1, "alice")).unwrap();
    assert_eq!(map["name"], "alice");
    assert_eq!(map["nickname"], serde_json::Value::Null);
    assert_eq!(map.len(), 5);

    let domain = CUSTOMERS.to_domain(&row(2, "bob")).unwrap();
    let map = CUSTOMERS.domain_to_map(&domain).unwrap();
    assert_eq!(map["email"], "bob@example.com");
}
