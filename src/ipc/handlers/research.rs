use crate::domains::Domain;
use crate::error::Result;
use crate::ipc::effects::{self, Effect};
use crate::ipc::error::respond;
use crate::ipc::handlers::start_export;
use crate::ipc::helpers::{delete_record, get_object, get_record, list_store, to_value};
use crate::ipc::types::{AppState, Request};
use crate::notify::Outbox;
use crate::pipeline::render::title_case;
use crate::pipeline::{Filterable, Record, Renderable, Store};
use serde_json::{json, Value};

const RESEARCH: [Domain; 4] = [
    Domain::Publications,
    Domain::Projects,
    Domain::Awards,
    Domain::Collaborations,
];

/// list/get/delete share one shape across the four research stores.
fn read_or_delete<R>(
    domain: Domain,
    store: &mut Store<R>,
    outbox: &mut Outbox,
    op: &str,
    params: &Value,
) -> Option<Result<Value>>
where
    R: Record + Filterable + Renderable,
{
    let result = match op {
        "list" => list_store(domain, store, params),
        "get" => get_record(store, params),
        "delete" => delete_record(store, params).map(|removed| {
            outbox.success(format!("{} deleted successfully", title_case(R::KIND)));
            json!({ "deleted": removed.id() })
        }),
        _ => return None,
    };
    Some(result)
}

fn dispatch(state: &mut AppState, domain: Domain, op: &str, params: &Value) -> Option<Result<Value>> {
    match op {
        "create" => {
            let fields = match get_object(params, "fields") {
                Ok(f) => f.clone(),
                Err(e) => return Some(Err(e)),
            };
            return Some(effects::begin(state, Effect::CreateRecord { domain, fields }));
        }
        "export" => return Some(start_export(state, domain, params)),
        _ => {}
    }
    let portal = &mut state.portal;
    let outbox = &mut state.outbox;
    match domain {
        Domain::Publications => read_or_delete(domain, &mut portal.publications, outbox, op, params),
        Domain::Projects => read_or_delete(domain, &mut portal.projects, outbox, op, params),
        Domain::Awards => read_or_delete(domain, &mut portal.awards, outbox, op, params),
        Domain::Collaborations => {
            read_or_delete(domain, &mut portal.collaborations, outbox, op, params)
        }
        _ => None,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if req.method == "research.stats" {
        return Some(respond(&req.id, to_value(&state.portal.research_summary())));
    }
    let (prefix, op) = req.method.split_once('.')?;
    let domain = RESEARCH.into_iter().find(|d| d.as_str() == prefix)?;
    let result = dispatch(state, domain, op, &req.params)?;
    Some(respond(&req.id, result))
}
