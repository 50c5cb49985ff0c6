// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema-introspection responses drawn as graphs.

use serde_json::Value;

use crate::model::ResultObject;

/// Give schema predicates and type fields natural ids so they deduplicate.
///
/// Each `schema[]` entry gets `uid` and `name` set to its `predicate`; each
/// `types[].fields[]` entry gets `uid` set to its `name`. Entries missing
/// those keys are left alone.
pub fn normalize_schema_response(mut response: ResultObject) -> ResultObject {
    if let Some(Value::Array(predicates)) = response.get_mut("schema") {
        for entry in predicates.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(predicate) = entry.get("predicate").cloned() {
                entry.insert("uid".into(), predicate.clone());
                entry.insert("name".into(), predicate);
            }
        }
    }
    if let Some(Value::Array(types)) = response.get_mut("types") {
        for ty in types.iter_mut().filter_map(Value::as_object_mut) {
            let Some(Value::Array(fields)) = ty.get_mut("fields") else {
                continue;
            };
            for field in fields.iter_mut().filter_map(Value::as_object_mut) {
                if let Some(name) = field.get("name").cloned() {
                    field.insert("uid".into(), name);
                }
            }
        }
    }
    response
}
