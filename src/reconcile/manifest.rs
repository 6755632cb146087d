use serde::Serialize;

use crate::constants::{API_PREFIX, PREVIEW_HEIGHT, PREVIEW_WIDTH, PROTOCOL_VERSIONS, SERVICE_NAME};
use crate::model::{TypeRef, TypeTag};

#[derive(Debug, Clone, Serialize)]
pub struct ViewSpec {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewSpec {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Service description returned by `GET /api/reconcile`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub versions: Vec<&'static str>,
    pub name: &'static str,
    pub identifier_space: String,
    pub schema_space: String,
    pub view: ViewSpec,
    pub preview: PreviewSpec,
    pub default_types: Vec<TypeRef>,
}

impl Manifest {
    /// Builds the manifest with every URL rooted at `public_url`.
    pub fn new(public_url: &str) -> Self {
        let base = public_url.trim_end_matches('/');
        let space = format!("{base}{API_PREFIX}/reconcile");
        let view_url = format!("{base}{API_PREFIX}/view/{{{{id}}}}");

        Self {
            versions: PROTOCOL_VERSIONS.to_vec(),
            name: SERVICE_NAME,
            identifier_space: space.clone(),
            schema_space: space,
            view: ViewSpec {
                url: view_url.clone(),
            },
            preview: PreviewSpec {
                url: view_url,
                width: PREVIEW_WIDTH,
                height: PREVIEW_HEIGHT,
            },
            default_types: TypeTag::ALL.iter().map(|tag| tag.type_ref()).collect(),
        }
    }
}
