use crate::domains::Domain;
use crate::error::{PortalError, Result};
use crate::pipeline::filter::{self, parse_date, Predicates};
use crate::pipeline::render::render_list;
use crate::pipeline::{Filterable, Record, Renderable, Store};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

pub fn get_required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| PortalError::BadParams(format!("missing {key}")))
}

pub fn get_opt_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub fn get_str_list(params: &Value, key: &str) -> Result<Vec<String>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| PortalError::BadParams(format!("{key} must be a list of strings")))
            })
            .collect(),
        Some(_) => Err(PortalError::BadParams(format!("{key} must be a list of strings"))),
    }
}

pub fn get_object<'a>(params: &'a Value, key: &str) -> Result<&'a Value> {
    match params.get(key) {
        Some(v) if v.is_object() => Ok(v),
        _ => Err(PortalError::BadParams(format!("missing object {key}"))),
    }
}

/// The reference day for date filters: `params.today` when given,
/// otherwise the local calendar date.
pub fn today(params: &Value) -> Result<NaiveDate> {
    match get_opt_str(params, "today") {
        Some(raw) => parse_date(raw),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn to_value<T: Serialize + ?Sized>(v: &T) -> Result<Value> {
    serde_json::to_value(v).map_err(|e| PortalError::Io(format!("encode response: {e}")))
}

/// Filters a store with the request's predicates and renders the result.
pub fn list_store<R>(domain: Domain, store: &Store<R>, params: &Value) -> Result<Value>
where
    R: Record + Filterable + Renderable,
{
    let predicates = Predicates::from_params(params)?;
    let today = today(params)?;
    let view = filter::apply(store.records(), &predicates, today);
    tracing::debug!(
        domain = domain.as_str(),
        total = store.len(),
        shown = view.len(),
        "list view"
    );
    to_value(&render_list(
        domain.as_str(),
        domain.noun(),
        &view,
        store.len(),
        store.generation(),
    ))
}

pub fn get_record<R: Record + Renderable>(store: &Store<R>, params: &Value) -> Result<Value> {
    let id = get_required_str(params, "id")?;
    Ok(store.find(id)?.render_item())
}

pub fn delete_record<R: Record>(store: &mut Store<R>, params: &Value) -> Result<R> {
    let id = get_required_str(params, "id")?;
    store.remove(id)
}
