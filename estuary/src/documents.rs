//! Document operations and search

use crate::dispatch::{Dispatcher, OnFailure, OnSuccess};
use crate::error::{Error, Result};
use crate::request::{DeleteParam, GetParam, IndexParam, SearchParam, UpdateParam};
use crate::response::error::check_server_error;
use crate::response::{
    DeleteResponse, GetResponse, IndexResponse, SearchResponse, UpdateResponse, WriteResponse,
};
use crate::transport::{Method, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Store, fetch, update, delete and search documents.
///
/// Documents are any `Serialize` value on the way in and any
/// `DeserializeOwned` type on the way out. Operations have the same three
/// forms as [`crate::IndicesClient`].
#[derive(Clone)]
pub struct DocumentsClient {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
}

impl DocumentsClient {
    pub fn new(transport: Arc<dyn Transport>, dispatcher: Dispatcher) -> Self {
        Self {
            transport,
            dispatcher,
        }
    }

    // index

    pub async fn index<D: Serialize + ?Sized>(
        &self,
        param: &IndexParam,
        document: &D,
    ) -> Result<IndexResponse> {
        let body = serde_json::to_value(document)?;
        index_document(self.transport.clone(), param.path(), body).await
    }

    pub fn index_with<D, S, E>(
        &self,
        param: &IndexParam,
        document: &D,
        on_success: S,
        on_failure: E,
    ) where
        D: Serialize + ?Sized,
        S: FnOnce(IndexResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        match serde_json::to_value(document) {
            Ok(body) => self.dispatcher.spawn(
                index_document(self.transport.clone(), param.path(), body),
                on_success,
                on_failure,
            ),
            Err(e) => on_failure(e.into()),
        }
    }

    pub fn index_blocking<D: Serialize + ?Sized>(
        &self,
        param: &IndexParam,
        document: &D,
    ) -> Result<IndexResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| {
            self.index_with(param, document, ok, err)
        })
    }

    // get

    pub async fn get(&self, param: &GetParam) -> Result<GetResponse> {
        get_document(self.transport.clone(), param.path()).await
    }

    pub fn get_with<S, E>(&self, param: &GetParam, on_success: S, on_failure: E)
    where
        S: FnOnce(GetResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.dispatcher.spawn(
            get_document(self.transport.clone(), param.path()),
            on_success,
            on_failure,
        );
    }

    pub fn get_blocking(&self, param: &GetParam) -> Result<GetResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| self.get_with(param, ok, err))
    }

    // update

    /// Merge `partial` into the stored document
    pub async fn update<D: Serialize + ?Sized>(
        &self,
        param: &UpdateParam,
        partial: &D,
    ) -> Result<UpdateResponse> {
        let body = json!({"doc": serde_json::to_value(partial)?});
        update_document(self.transport.clone(), param.path(), body).await
    }

    pub fn update_with<D, S, E>(
        &self,
        param: &UpdateParam,
        partial: &D,
        on_success: S,
        on_failure: E,
    ) where
        D: Serialize + ?Sized,
        S: FnOnce(UpdateResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        match serde_json::to_value(partial) {
            Ok(doc) => self.dispatcher.spawn(
                update_document(self.transport.clone(), param.path(), json!({"doc": doc})),
                on_success,
                on_failure,
            ),
            Err(e) => on_failure(e.into()),
        }
    }

    pub fn update_blocking<D: Serialize + ?Sized>(
        &self,
        param: &UpdateParam,
        partial: &D,
    ) -> Result<UpdateResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| {
            self.update_with(param, partial, ok, err)
        })
    }

    // delete

    pub async fn delete_document(&self, param: &DeleteParam) -> Result<DeleteResponse> {
        delete_document(self.transport.clone(), param.path()).await
    }

    pub fn delete_document_with<S, E>(&self, param: &DeleteParam, on_success: S, on_failure: E)
    where
        S: FnOnce(DeleteResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.dispatcher.spawn(
            delete_document(self.transport.clone(), param.path()),
            on_success,
            on_failure,
        );
    }

    pub fn delete_document_blocking(&self, param: &DeleteParam) -> Result<DeleteResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| {
            self.delete_document_with(param, ok, err)
        })
    }

    // search

    pub async fn search<T>(&self, param: &SearchParam) -> Result<SearchResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        search(self.transport.clone(), param.path(), param.to_json()).await
    }

    pub fn search_with<T, S, E>(&self, param: &SearchParam, on_success: S, on_failure: E)
    where
        T: DeserializeOwned + Send + 'static,
        S: FnOnce(SearchResponse<T>) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.dispatcher.spawn(
            search(self.transport.clone(), param.path(), param.to_json()),
            on_success,
            on_failure,
        );
    }

    pub fn search_blocking<T>(&self, param: &SearchParam) -> Result<SearchResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| self.search_with(param, ok, err))
    }
}

async fn index_document(
    transport: Arc<dyn Transport>,
    path: Result<String>,
    body: Value,
) -> Result<IndexResponse> {
    let path = path?;
    debug!(%path, "indexing document");
    let response = transport.send(&path, Method::Post, Some(body)).await?;
    check_server_error(&response)?;
    WriteResponse::from_json(&response)
}

async fn get_document(
    transport: Arc<dyn Transport>,
    path: Result<String>,
) -> Result<GetResponse> {
    let path = path?;
    let response = transport.send(&path, Method::Get, None).await?;
    check_server_error(&response)?;
    let parsed = GetResponse::from_json(&response)?;
    if !parsed.found {
        return Err(Error::NotFound(format!("document {}", path)));
    }
    Ok(parsed)
}

async fn update_document(
    transport: Arc<dyn Transport>,
    path: Result<String>,
    body: Value,
) -> Result<UpdateResponse> {
    let path = path?;
    debug!(%path, "updating document");
    let response = transport.send(&path, Method::Post, Some(body)).await?;
    check_server_error(&response)?;
    not_found_as_error(&path, WriteResponse::from_json(&response)?)
}

async fn delete_document(
    transport: Arc<dyn Transport>,
    path: Result<String>,
) -> Result<DeleteResponse> {
    let path = path?;
    debug!(%path, "deleting document");
    let response = transport.send(&path, Method::Delete, None).await?;
    check_server_error(&response)?;
    not_found_as_error(&path, WriteResponse::from_json(&response)?)
}

async fn search<T: DeserializeOwned>(
    transport: Arc<dyn Transport>,
    path: Result<String>,
    body: Value,
) -> Result<SearchResponse<T>> {
    let path = path?;
    let response = transport.send(&path, Method::Get, Some(body)).await?;
    check_server_error(&response)?;
    SearchResponse::from_json(&response)
}

fn not_found_as_error(path: &str, response: WriteResponse) -> Result<WriteResponse> {
    if response.is_not_found() {
        return Err(Error::NotFound(format!("document {}", path)));
    }
    Ok(response)
}
