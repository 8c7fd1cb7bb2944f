use crate::{handlers, AppState};
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub const ENTRY_PATH: &str = "/api/entry";
pub const EXPORT_PATH: &str = "/api/entry/export";
pub const IMPORT_PATH: &str = "/api/entry/import";
pub const HEALTH_PATH: &str = "/api/health";

/// One method + path binding.
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub handler: MethodRouter<Arc<AppState>>,
}

/// The static route table of the API.
pub fn route_list() -> Vec<Route> {
    vec![
        Route { name: "CreateContact", path: ENTRY_PATH, handler: post(handlers::create_entry) },
        Route { name: "GetContact", path: ENTRY_PATH, handler: get(handlers::get_entries) },
        Route { name: "UpdateContact", path: ENTRY_PATH, handler: put(handlers::update_entry) },
        Route { name: "DeleteContact", path: ENTRY_PATH, handler: delete(handlers::delete_entry) },
        Route { name: "ExportContacts", path: EXPORT_PATH, handler: get(handlers::export_entries) },
        Route { name: "ImportContacts", path: IMPORT_PATH, handler: post(handlers::import_entries) },
        Route { name: "Health", path: HEALTH_PATH, handler: get(handlers::health) },
    ]
}

/// Builds the application router from the route table.
///
/// Every route is wrapped in the same logging decorator. Bindings that share a
/// path are merged, and a method nobody registered on a known path falls
/// through to the same 404 as an unknown path.
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let mut paths: BTreeMap<&'static str, MethodRouter<Arc<AppState>>> = BTreeMap::new();
    for route in route_list() {
        let name = route.name;
        let logged = route
            .handler
            .layer(middleware::from_fn(move |req: Request, next: Next| log_request(name, req, next)));
        let merged = match paths.remove(route.path) {
            Some(existing) => existing.merge(logged),
            None => MethodRouter::new().fallback(handlers::not_found).merge(logged),
        };
        paths.insert(route.path, merged);
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    paths
        .into_iter()
        .fold(Router::new(), |app, (path, handler)| app.route(path, handler))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Logs the route name, outcome and latency of each request.
async fn log_request(name: &'static str, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        route = name,
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled."
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn route_names_are_unique() {
        let routes = route_list();
        let names: HashSet<_> = routes.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), routes.len());
    }

    #[test]
    fn entry_path_carries_the_four_crud_bindings() {
        let crud = route_list().into_iter().filter(|r| r.path == ENTRY_PATH).count();
        assert_eq!(crud, 4);
    }
}
