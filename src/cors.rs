use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Method, Status};
use rocket::response::{self, Responder};
use rocket::route::{Handler, Outcome, Route};
use rocket::serde::json::Json;
use rocket::{Data, Request, Response};

use crate::error::{AppError, ErrorBody};

/// Adds the permissive origin header to every response, catchers included.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
    }
}

/// Fixed answer to a CORS preflight. Each handler declares its own methods.
pub struct Preflight {
    methods: &'static str,
    headers: &'static str,
}

impl Preflight {
    pub const fn new(methods: &'static str) -> Self {
        Self {
            methods,
            headers: "Content-Type",
        }
    }

    pub const fn with_headers(methods: &'static str, headers: &'static str) -> Self {
        Self { methods, headers }
    }
}

impl<'r> Responder<'r, 'static> for Preflight {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .status(Status::Ok)
            .raw_header("Access-Control-Allow-Origin", "*")
            .raw_header("Access-Control-Allow-Methods", self.methods)
            .raw_header("Access-Control-Allow-Headers", self.headers)
            .raw_header("Access-Control-Max-Age", "86400")
            .ok()
    }
}

#[derive(Clone)]
struct MethodNotAllowed;

#[rocket::async_trait]
impl Handler for MethodNotAllowed {
    async fn handle<'r>(&self, req: &'r Request<'_>, _: Data<'r>) -> Outcome<'r> {
        Outcome::from(req, AppError::MethodNotAllowed)
    }
}

const ROUTABLE_METHODS: [Method; 5] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Delete,
    Method::Patch,
];

/// 405 routes for every method a handler does not serve at its base path.
pub fn method_not_allowed(allowed: &[Method]) -> Vec<Route> {
    ROUTABLE_METHODS
        .iter()
        .filter(|method| !allowed.contains(*method))
        .map(|method| Route::new(*method, "/", MethodNotAllowed))
        .collect()
}

#[catch(default)]
pub fn json_catcher(status: Status, _: &Request<'_>) -> response::status::Custom<Json<ErrorBody>> {
    let reason = status.reason().unwrap_or("Request failed");
    response::status::Custom(status, Json(ErrorBody::new(reason)))
}
