pub mod appresult;
pub mod auth;
pub mod chats;
pub mod db;
pub mod index;
pub mod ledger;
pub mod posts;
pub mod profiles;
pub mod res;
pub mod session;
pub mod smiles;
pub mod users;
pub mod wallet;

use std::ops::Deref;

use axum::{extract::FromRef, response::{Html, IntoResponse}};
use serde_json::Value;
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
    fn get_obj_field(&self, field: &str) -> AppResult<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(anyhow::anyhow!("expected {field} in {self}"))?
            .as_str()
            .ok_or(anyhow::anyhow!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> AppResult<&Value> {
        self.get(field)
            .ok_or(anyhow::anyhow!("expected {field} in {self}").into())
    }
}

pub struct Markdown<T>(pub T);

impl<T> IntoResponse for Markdown<T>
where
    T: Deref<Target = str>
{
    fn into_response(self) -> axum::response::Response {
        let parser = pulldown_cmark::Parser::new(&self.0);

        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, parser);
        Html(html_output).into_response()
    }
}
