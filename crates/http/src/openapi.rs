//! OpenAPI document assembled from the fragments each module contributes

use serde_json::{json, Value};

use bookshelf_kernel::ModuleRegistry;

pub const API_TITLE: &str = "Bookshelf API";
pub const API_VERSION: &str = "1.0.0";

/// Public path a module-relative route is served under
pub fn module_path(module_name: &str, path: &str) -> String {
    match path {
        "" | "/" => format!("/api/{}", module_name),
        _ => format!("/api/{}{}", module_name, path),
    }
}

/// Build the merged OpenAPI document for every registered module
pub fn document(registry: &ModuleRegistry) -> Value {
    let mut openapi_spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "version": API_VERSION,
            "description": "In-memory book catalogue API"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    // Shared response envelope, referenced by module fragments
    openapi_spec["components"]["schemas"]["Envelope"] = json!({
        "type": "object",
        "properties": {
            "status": {
                "type": "string",
                "enum": ["success", "fail", "error"]
            },
            "message": {
                "type": "string"
            },
            "data": {
                "type": "object"
            }
        },
        "required": ["status"]
    });

    openapi_spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(Value::as_object) {
            for (path, path_item) in paths {
                openapi_spec["paths"][module_path(module.name(), path)] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

/// Typed view of the merged document, as served to Swagger UI
pub fn typed_document(registry: &ModuleRegistry) -> utoipa::openapi::OpenApi {
    serde_json::from_value(document(registry)).unwrap_or_else(|error| {
        tracing::warn!(%error, "merged OpenAPI document is not valid; serving an empty one");
        utoipa::openapi::OpenApiBuilder::new()
            .info(
                utoipa::openapi::InfoBuilder::new()
                    .title(API_TITLE)
                    .version(API_VERSION)
                    .build(),
            )
            .build()
    })
}
