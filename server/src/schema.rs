//! Field schema, help text, and example payloads for the token endpoint

use serde::Serialize;

#[derive(Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct EndpointHelp {
    pub synopsis: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSchema],
    pub examples: Vec<serde_json::Value>,
}

pub const TOKEN_FIELDS: &[FieldSchema] = &[
    FieldSchema {
        name: "id",
        kind: "int",
        description: "Project ID to create a project access token for",
    },
    FieldSchema {
        name: "name",
        kind: "string",
        description: "The name of the project access token",
    },
    FieldSchema {
        name: "scopes",
        kind: "comma_string_slice",
        description: "List of scopes",
    },
    FieldSchema {
        name: "expires_at",
        kind: "time",
        description: "The token expires at midnight UTC on that date",
    },
    FieldSchema {
        name: "access_level",
        kind: "int",
        description: "Access level of the project access token",
    },
];

const SYNOPSIS: &str = "Generate a project access token for a given project with token name, scopes.";

const DESCRIPTION: &str = "Generates a project access token. Supply the id of the project to \
generate a token for, a name, which is used as the token's name in GitLab, and the scopes \
for the generated token.";

/// Help document served on `GET /token`
pub fn token_help() -> EndpointHelp {
    EndpointHelp {
        synopsis: SYNOPSIS,
        description: DESCRIPTION,
        fields: TOKEN_FIELDS,
        examples: vec![serde_json::json!({
            "id": 1,
            "name": "MyProjectAccessToken",
            "scopes": ["read_api", "read_repository"],
        })],
    }
}
