//! Success envelopes. Every body carries `success`; errors are built by
//! `Error::into_response`.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DataMessage<T> {
    pub data: T,
    pub message: &'static str,
}

/// Wrap a struct whose fields become top-level keys next to `success`.
pub fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        body,
    })
}

pub fn data<T: Serialize>(data: T) -> Json<Success<Data<T>>> {
    success(Data { data })
}

pub fn listing<T: Serialize>(data: Vec<T>) -> Json<Success<Listing<T>>> {
    let count = data.len();
    success(Listing { data, count })
}

pub fn message(message: &'static str) -> Json<Success<Message>> {
    success(Message { message })
}

pub fn data_with_message<T: Serialize>(
    data: T,
    message: &'static str,
) -> Json<Success<DataMessage<T>>> {
    success(DataMessage { data, message })
}
