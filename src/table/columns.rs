//! Column set for the reconciled objects table

use super::field::{Field, SortKey, SortType};
use crate::models::DiscoveredObject;

/// Columns: name, kind, namespace, status and latest condition message
pub fn reconciled_object_fields() -> Vec<Field<DiscoveredObject>> {
    vec![
        Field::named("Name", "name").sort_type(SortType::String),
        Field::computed("Type", |o: &DiscoveredObject| o.kind().to_string())
            .sort_type(SortType::String)
            .sort_value(|o: &DiscoveredObject| SortKey::from(o.kind())),
        Field::named("Namespace", "namespace").sort_type(SortType::String),
        Field::named("Status", "status").sort_type(SortType::String),
        Field::computed("Message", |o: &DiscoveredObject| {
            o.latest_message().to_string()
        }),
    ]
}
