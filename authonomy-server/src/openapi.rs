use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const APPLICATIONS_TAG: &str = "Applications API";
pub(crate) const PROVIDERS_TAG: &str = "Auth Providers API";
pub(crate) const POLICIES_TAG: &str = "Policies API";
pub(crate) const CREDENTIALS_TAG: &str = "Credentials API";
pub(crate) const ACCESS_TAG: &str = "Access API";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health::health_check,
        crate::api::health::ready_check,
        crate::api::applications::list_applications,
        crate::api::applications::create_application,
        crate::api::applications::get_application,
        crate::api::auth_providers::list_providers,
        crate::api::auth_providers::link_provider,
        crate::api::policies::list_policies,
        crate::api::policies::create_policy,
        crate::api::policies::attach_policy,
        crate::api::credentials::issue_credential,
        crate::api::access::get_access_token,
        crate::api::access::validate_access,
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = APPLICATIONS_TAG, description = "Relying application registration"),
        (name = PROVIDERS_TAG, description = "Social login providers of applications"),
        (name = POLICIES_TAG, description = "Policy schemas and application policies"),
        (name = CREDENTIALS_TAG, description = "Credential issuance to end users"),
        (name = ACCESS_TAG, description = "Bearer access tokens and role checks"),
    ),
    info(
        title = "Authonomy API",
        description = "Credential based authorization service",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
