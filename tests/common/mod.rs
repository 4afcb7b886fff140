#![allow(dead_code)]

use model_cast::{Model, PropertyInfo, PropertyKind, Schema, Value};
use std::ops::{Deref, DerefMut};

pub const BOOK_ONE: &str = include_str!("../fixtures/book_one.json");

pub fn book_one_json() -> serde_json::Value {
    serde_json::from_str(BOOK_ONE).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page(Model);

impl Schema for Page {
    const NAME: &'static str = "Page";

    fn declare() -> Vec<PropertyInfo> {
        vec![
            PropertyInfo::new("page", PropertyKind::Int, 0),
            PropertyInfo::new("chapter", PropertyKind::Text, Value::Null),
        ]
    }

    fn from_model(model: Model) -> Self {
        Self(model)
    }

    fn as_model(&self) -> &Model {
        &self.0
    }

    fn as_model_mut(&mut self) -> &mut Model {
        &mut self.0
    }
}

impl Page {
    pub fn page(&self) -> Option<i64> {
        self.0["page"].as_int()
    }

    pub fn chapter(&self) -> Option<&str> {
        self.0["chapter"].as_text()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book(Model);

impl Schema for Book {
    const NAME: &'static str = "Book";

    fn declare() -> Vec<PropertyInfo> {
        vec![
            PropertyInfo::new("id", PropertyKind::Int, 0),
            PropertyInfo::new("name", PropertyKind::Text, Value::Null),
            PropertyInfo::new("stockLevel", PropertyKind::Int, 0),
            PropertyInfo::new("pages", PropertyKind::models::<Page>(), Value::Null),
            PropertyInfo::new("currentPage", PropertyKind::model::<Page>(), Value::Null),
            PropertyInfo::new("createdAt", PropertyKind::DateTime, Value::Null),
        ]
    }

    fn from_model(model: Model) -> Self {
        Self(model)
    }

    fn as_model(&self) -> &Model {
        &self.0
    }

    fn as_model_mut(&mut self) -> &mut Model {
        &mut self.0
    }
}

impl Book {
    pub fn id(&self) -> Option<i64> {
        self.0["id"].as_int()
    }

    pub fn name(&self) -> Option<&str> {
        self.0["name"].as_text()
    }

    pub fn stock_level(&self) -> Option<i64> {
        self.0["stockLevel"].as_int()
    }

    pub fn pages(&self) -> Vec<Page> {
        self.0["pages"]
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_model)
            .filter_map(|model| model.clone().into_typed())
            .collect()
    }

    pub fn current_page(&self) -> Option<Page> {
        self.0["currentPage"]
            .as_model()
            .and_then(|model| model.clone().into_typed())
    }
}

impl Deref for Book {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.0
    }
}

impl DerefMut for Book {
    fn deref_mut(&mut self) -> &mut Model {
        &mut self.0
    }
}

/// A product whose raw input usually carries more than it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct Product(Model);

impl Schema for Product {
    const NAME: &'static str = "Product";

    fn declare() -> Vec<PropertyInfo> {
        vec![
            PropertyInfo::new("id", PropertyKind::Text, Value::Null),
            PropertyInfo::new("name", PropertyKind::Text, Value::Null),
            PropertyInfo::new("price", PropertyKind::Float, 0.0),
            PropertyInfo::new("inStock", PropertyKind::Bool, false),
        ]
    }

    fn from_model(model: Model) -> Self {
        Self(model)
    }

    fn as_model(&self) -> &Model {
        &self.0
    }

    fn as_model_mut(&mut self) -> &mut Model {
        &mut self.0
    }
}

impl Product {
    pub fn id(&self) -> Option<&str> {
        self.0["id"].as_text()
    }

    /// Not declared, so it always reads as absent.
    pub fn description(&self) -> Option<&str> {
        self.0["description"].as_text()
    }
}
