//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        version = "0.1.0",
        description = "User management over MongoDB with Argon2-hashed passwords",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/users", api = domain_users::ApiDoc)
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_paths_are_nested_under_users() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/users"));
        assert!(paths.iter().any(|p| p.as_str() == "/users/{uid}"));
    }
}
