//! Index management operations

use crate::dispatch::{Dispatcher, OnFailure, OnSuccess};
use crate::error::{Error, Result};
use crate::request::{encode_path, CreateIndexParam, PutMappingParam};
use crate::response::error::check_server_error;
use crate::response::{
    CreateIndexResponse, CreateIndexSuccessResponse, DeleteIndexResponse, GetIndexResponse,
    PutMappingResponse,
};
use crate::transport::{Method, Transport};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Create, inspect, map and delete indices.
///
/// Each operation comes in three forms: `op(..).await`,
/// `op_with(.., on_success, on_failure)` and `op_blocking(..)`.
#[derive(Clone)]
pub struct IndicesClient {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
}

impl IndicesClient {
    pub fn new(transport: Arc<dyn Transport>, dispatcher: Dispatcher) -> Self {
        Self {
            transport,
            dispatcher,
        }
    }

    // create

    pub async fn create(
        &self,
        index: &str,
        param: &CreateIndexParam,
    ) -> Result<CreateIndexSuccessResponse> {
        create_index(self.transport.clone(), index.to_string(), param.to_json()).await
    }

    pub fn create_with<S, E>(
        &self,
        index: &str,
        param: &CreateIndexParam,
        on_success: S,
        on_failure: E,
    ) where
        S: FnOnce(CreateIndexSuccessResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.dispatcher.spawn(
            create_index(self.transport.clone(), index.to_string(), param.to_json()),
            on_success,
            on_failure,
        );
    }

    pub fn create_blocking(
        &self,
        index: &str,
        param: &CreateIndexParam,
    ) -> Result<CreateIndexSuccessResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| {
            self.create_with(index, param, ok, err)
        })
    }

    // get

    pub async fn get(&self, index: &str) -> Result<GetIndexResponse> {
        get_index(self.transport.clone(), index.to_string()).await
    }

    pub fn get_with<S, E>(&self, index: &str, on_success: S, on_failure: E)
    where
        S: FnOnce(GetIndexResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.dispatcher.spawn(
            get_index(self.transport.clone(), index.to_string()),
            on_success,
            on_failure,
        );
    }

    pub fn get_blocking(&self, index: &str) -> Result<GetIndexResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| self.get_with(index, ok, err))
    }

    // put mapping

    pub async fn put_mapping(
        &self,
        index: &str,
        param: &PutMappingParam,
    ) -> Result<PutMappingResponse> {
        put_mapping(self.transport.clone(), index.to_string(), param.to_json()).await
    }

    pub fn put_mapping_with<S, E>(
        &self,
        index: &str,
        param: &PutMappingParam,
        on_success: S,
        on_failure: E,
    ) where
        S: FnOnce(PutMappingResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.dispatcher.spawn(
            put_mapping(self.transport.clone(), index.to_string(), param.to_json()),
            on_success,
            on_failure,
        );
    }

    pub fn put_mapping_blocking(
        &self,
        index: &str,
        param: &PutMappingParam,
    ) -> Result<PutMappingResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| {
            self.put_mapping_with(index, param, ok, err)
        })
    }

    // delete

    pub async fn delete_index(&self, index: &str) -> Result<DeleteIndexResponse> {
        delete_index(self.transport.clone(), index.to_string()).await
    }

    pub fn delete_index_with<S, E>(&self, index: &str, on_success: S, on_failure: E)
    where
        S: FnOnce(DeleteIndexResponse) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.dispatcher.spawn(
            delete_index(self.transport.clone(), index.to_string()),
            on_success,
            on_failure,
        );
    }

    pub fn delete_index_blocking(&self, index: &str) -> Result<DeleteIndexResponse> {
        Dispatcher::wait(|ok: OnSuccess<_>, err: OnFailure| {
            self.delete_index_with(index, ok, err)
        })
    }
}

async fn create_index(
    transport: Arc<dyn Transport>,
    index: String,
    body: Value,
) -> Result<CreateIndexSuccessResponse> {
    debug!(%index, "creating index");
    let path = encode_path(&[index.as_str()])?;
    let response = transport.send(&path, Method::Put, Some(body)).await?;
    CreateIndexResponse::from_json(&response).into_result()
}

async fn get_index(transport: Arc<dyn Transport>, index: String) -> Result<GetIndexResponse> {
    let path = encode_path(&[index.as_str()])?;
    let response = transport.send(&path, Method::Get, None).await?;
    check_server_error(&response)?;
    GetIndexResponse::from_json(&index, &response)
}

async fn put_mapping(
    transport: Arc<dyn Transport>,
    index: String,
    body: Value,
) -> Result<PutMappingResponse> {
    debug!(%index, "updating mapping");
    let path = encode_path(&[index.as_str(), "_mapping", "_doc"])?;
    let response = transport.send(&path, Method::Put, Some(body)).await?;
    check_server_error(&response)?;
    Ok(serde_json::from_value(response)?)
}

async fn delete_index(
    transport: Arc<dyn Transport>,
    index: String,
) -> Result<DeleteIndexResponse> {
    debug!(%index, "deleting index");
    let path = encode_path(&[index.as_str()])?;
    let response = transport.send(&path, Method::Delete, None).await?;
    check_server_error(&response)?;
    Ok(serde_json::from_value(response)?)
}
