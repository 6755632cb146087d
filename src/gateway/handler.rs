use axum::{
    Json,
    extract::{
        Form, Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{FormRejection, QueryRejection},
    },
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::model::{TypeTag, UpdateRow, VocabularyEntry};
use crate::reconcile::parse_queries;
use crate::store::ReferenceStore;
use crate::terminology::TerminologyClient;

/// Multipart field carrying the correction file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct ReconcileParams {
    pub queries: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateParams {
    pub type_param: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub status: &'static str,
    pub updated_rows: Vec<UpdateRow>,
}

/// `GET /api/reconcile`: the manifest, or a reconciliation when `queries` is given.
#[instrument(skip(state, params))]
pub async fn reconcile_get_handler<S, T>(
    State(state): State<HandlerState<S, T>>,
    params: Result<Query<ReconcileParams>, QueryRejection>,
) -> Result<Response, GatewayError>
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    let Query(params) = params.map_err(|e| GatewayError::MalformedInput(e.body_text()))?;

    match params.queries {
        None => {
            debug!("Serving manifest");
            Ok(Json(state.manifest.as_ref().clone()).into_response())
        }
        Some(raw) => run_reconcile(&state, &raw).await,
    }
}

/// `POST /api/reconcile` with a form-encoded `queries` field.
#[instrument(skip(state, form))]
pub async fn reconcile_post_handler<S, T>(
    State(state): State<HandlerState<S, T>>,
    form: Result<Form<ReconcileParams>, FormRejection>,
) -> Result<Response, GatewayError>
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    let Form(params) = form.map_err(|e| GatewayError::MalformedInput(e.body_text()))?;
    let raw = params
        .queries
        .ok_or_else(|| GatewayError::MalformedInput("missing 'queries' field".to_string()))?;

    run_reconcile(&state, &raw).await
}

async fn run_reconcile<S, T>(
    state: &HandlerState<S, T>,
    raw: &str,
) -> Result<Response, GatewayError>
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    let batch = parse_queries(raw)?;
    let results = state.reconciler.reconcile(batch).await;
    Ok(Json(results).into_response())
}

/// `POST /api/fetch-update-reconciled-data?type_param=<type id>`.
///
/// The type is resolved before the upload is read, so an unsupported type is
/// rejected without touching the body.
#[instrument(skip(state, params, multipart))]
pub async fn update_handler<S, T>(
    State(state): State<HandlerState<S, T>>,
    params: Result<Query<UpdateParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UpdateResponse>, GatewayError>
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    let Query(params) = params.map_err(|e| GatewayError::MalformedInput(e.body_text()))?;
    let type_id = params
        .type_param
        .ok_or_else(|| GatewayError::MalformedInput("missing 'type_param' parameter".to_string()))?;
    if TypeTag::from_id(&type_id).is_none() {
        return Err(GatewayError::UnsupportedType(type_id));
    }

    let mut multipart = multipart.map_err(|e| GatewayError::MalformedInput(e.body_text()))?;
    let file = read_upload(&mut multipart).await?;
    debug!(type_id = %type_id, bytes = file.len(), "Correction file received");

    let updated_rows = state.updater.apply_file(&file, &type_id).await?;
    info!(type_id = %type_id, rows = updated_rows.len(), "Corrections applied");

    Ok(Json(UpdateResponse {
        status: "success",
        updated_rows,
    }))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, GatewayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::MalformedInput(e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| GatewayError::MalformedInput(e.body_text()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(GatewayError::MalformedInput(format!(
        "missing '{UPLOAD_FIELD}' field"
    )))
}

/// `GET /api/view/{*id}`: an HTML card for a vocabulary entity.
#[instrument(skip(state))]
pub async fn view_handler<S, T>(
    State(state): State<HandlerState<S, T>>,
    Path(id): Path<String>,
) -> Result<Html<String>, GatewayError>
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    let entity_id = format!("/{}", id.trim_start_matches('/'));
    let not_found = || GatewayError::NotFound(format!("no entity '{entity_id}'"));

    let (tag, row_id) = TypeTag::parse_entity_id(&entity_id).ok_or_else(not_found)?;
    let entries = match tag {
        TypeTag::Ethnicity => state.store.ethnicities().await,
        TypeTag::SexualOrientation => state.store.sexual_orientations().await,
        TypeTag::Diagnosis => return Err(not_found()),
    }
    .map_err(|e| GatewayError::Internal(e.to_string()))?;

    let entry = entries
        .into_iter()
        .find(|entry| entry.id == row_id)
        .ok_or_else(not_found)?;

    Ok(Html(render_card(tag, &entity_id, &entry)))
}

fn render_card(tag: TypeTag, entity_id: &str, entry: &VocabularyEntry) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html><head><meta charset=\"utf-8\"><title>{label}</title></head>\n",
            "<body style=\"font-family: sans-serif; margin: 8px\">\n",
            "<h3 style=\"margin: 0 0 4px 0\">{label}</h3>\n",
            "<div style=\"color: #555\">{type_name}</div>\n",
            "<code style=\"font-size: small\">{id}</code>\n",
            "</body></html>\n"
        ),
        label = escape_html(&entry.label),
        type_name = escape_html(tag.name()),
        id = escape_html(entity_id),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
