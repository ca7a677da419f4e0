use super::*;
use crate::error::SchemaError;
use ntest::timeout;
use pretty_assertions::assert_eq;
use sqlmap_types::{record, Kind, Reflect, Value};
use std::sync::Arc;
use std::thread;

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Audit {
        pub created_by: String,
        pub name: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Address {
        #[sql = "city,virtual_column"]
        pub city: String,
        pub zip: Option<u32>,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Customer {
        #[sql = "ID,primary_key"]
        pub id: i64,
        #[sql = "Name"]
        pub name: String,
        #[embed]
        pub audit: Audit,
        pub address: Option<Address>,
        #[skip]
        pub scratch: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Node {
        pub value: i32,
        pub next: Option<Box<Node>>,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Named {
        pub id: i64,
        #[embed]
        #[sql = "meta"]
        pub audit: Audit,
    }
}

fn paths(schema: &TypeSchema) -> Vec<String> {
    schema.properties().map(|f| f.path().to_string()).collect()
}

#[test]
fn test_properties_follow_declaration_order() {
    let schema = build_schema(&Customer::type_info()).unwrap();
    assert_eq!(
        paths(&schema),
        vec!["ID", "Name", "created_by", "name", "address"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_outer_field_shadows_embedded_field() {
    let schema = build_schema(&Customer::type_info()).unwrap();
    let name = schema.lookup("Name").unwrap();
    assert_eq!(name.depth(), 0);
    // `Audit::name` is hoisted as `name`, which differs from the tagged `Name`.
    let hoisted = schema.lookup("name").unwrap();
    assert_eq!(hoisted.depth(), 1);
    assert_eq!(hoisted.index(), &[2, 1]);
}

#[test]
fn test_shadowed_embedded_field_is_not_a_property() {
    record! {
        #[derive(Debug, Clone, Default)]
        struct Shadowing {
            pub name: String,
            #[embed]
            pub audit: Audit,
        }
    }

    let schema = build_schema(&Shadowing::type_info()).unwrap();
    assert_eq!(schema.lookup("name").unwrap().depth(), 0);
    assert_eq!(
        paths(&schema),
        vec!["name".to_string(), "created_by".to_string()]
    );
}

#[test]
fn test_nullability_propagates_to_children() {
    let schema = build_schema(&Customer::type_info()).unwrap();
    let address = schema.lookup("address").unwrap();
    assert!(address.is_nullable());
    let city = schema.lookup("address.city").unwrap();
    assert!(city.is_nullable());
    assert_eq!(city.parent(), Some(address.id()));
    assert!(!schema.lookup("ID").unwrap().is_nullable());
}

#[test]
fn test_hidden_fields_are_skipped() {
    let schema = build_schema(&Customer::type_info()).unwrap();
    assert!(schema.lookup("scratch").is_none());
}

#[test]
fn test_self_reference_is_not_expanded() {
    let schema = build_schema(&Node::type_info()).unwrap();
    let next = schema.lookup("next").unwrap();
    assert!(next.is_recursive());
    assert!(next.children().is_empty());
    assert_eq!(schema.fields().len(), 2);
}

#[test]
fn test_named_embed_prefixes_children() {
    let schema = build_schema(&Named::type_info()).unwrap();
    assert!(!schema.lookup("meta").unwrap().is_embedded());
    assert!(schema.lookup("meta.created_by").is_some());
    assert_eq!(paths(&schema), vec!["id".to_string(), "meta".to_string()]);
}

#[test]
fn test_non_record_root_is_rejected() {
    let err = build_schema(&i64::type_info()).unwrap_err();
    assert!(matches!(err, SchemaError::NotARecord { kind: Kind::Int, .. }));
}

#[test]
fn test_slot_mut_materializes_optional_parent() {
    let schema = build_schema(&Customer::type_info()).unwrap();
    let mut value = Customer::type_info().zero_value();
    let city = schema.lookup("address.city").unwrap().id();
    *schema.slot_mut(&mut value, city).unwrap() = Value::String("Ipoh".into());
    let customer = Customer::from_value(value).unwrap();
    assert_eq!(customer.address.unwrap().city, "Ipoh");
}

#[test]
fn test_build_is_deterministic() {
    let first = build_schema(&Customer::type_info()).unwrap();
    let second = build_schema(&Customer::type_info()).unwrap();
    let all = |s: &TypeSchema| s.fields().iter().map(|f| f.path().to_string()).collect::<Vec<_>>();
    assert_eq!(all(&first), all(&second));
    assert_eq!(paths(&first), paths(&second));
}

#[test]
fn test_cache_rejects_small_capacity() {
    assert_eq!(
        SchemaCache::new(1).unwrap_err(),
        SchemaError::InvalidCapacity { capacity: 1 }
    );
    assert!(SchemaCache::new(2).is_ok());
}

#[test]
fn test_cache_hit_returns_same_schema() {
    let cache = SchemaCache::new(4).unwrap();
    let a = cache.get_or_build::<Customer>().unwrap();
    let b = cache.get_or_build::<Customer>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_evicts_first_inserted() {
    let cache = SchemaCache::new(2).unwrap();
    cache.get_or_build::<Customer>().unwrap();
    cache.get_or_build::<Address>().unwrap();
    // A read does not promote.
    cache.get_or_build::<Customer>().unwrap();
    cache.get_or_build::<Audit>().unwrap();

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(std::any::TypeId::of::<Customer>()));
    assert!(cache.contains(std::any::TypeId::of::<Address>()));
    assert!(cache.contains(std::any::TypeId::of::<Audit>()));
}

#[test]
#[timeout(10000)]
fn test_concurrent_builders_converge() {
    let cache = Arc::new(SchemaCache::new(8).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                if i % 2 == 0 {
                    cache.get_or_build::<Customer>().map(|s| s.property_count())
                } else {
                    cache.get_or_build::<Node>().map(|s| s.property_count())
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
    assert_eq!(cache.len(), 2);
    cache.clear();
    assert!(cache.is_empty());
}
