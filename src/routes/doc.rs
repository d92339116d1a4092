use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{InviteRegisterRequest, InviteRequest, LoginRequest, LoginResponse, RegisterRequest},
        permissions::{CreateTemplateRequest, TemplateList, UpdatePermissionsRequest, UserPermissionsResponse},
        segments::{CreateSegmentRequest, RepositionSegmentRequest, SegmentList, UpdateSegmentRequest},
        shows::{CreateShowRequest, ShowList, ShowWithSegments, UpdateShowRequest},
    },
    models::{
        ArchivedAuditLog, AuditLog, Emission, Guest, InviteToken, Presenter, Role, RoleTemplate,
        Segment, Show, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        audit, auth, emissions, guests, health, params, permissions, presenters, roles, segments,
        setup, shows,
    },
    services::{
        audit_service::{ArchivedAuditLogList, AuditLogList},
        role_service::RoleList,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::invite,
        auth::register_via_invite,
        permissions::get_user_permissions,
        permissions::update_user_permissions,
        permissions::initialize_user_permissions,
        permissions::create_template,
        permissions::list_templates,
        permissions::get_template,
        permissions::delete_template,
        permissions::apply_template,
        roles::create_role,
        roles::list_roles,
        roles::get_role,
        roles::delete_role,
        roles::assign_roles,
        roles::unassign_roles,
        roles::user_roles,
        emissions::list_emissions,
        emissions::get_emission,
        emissions::create_emission,
        emissions::update_emission,
        emissions::delete_emission,
        shows::create_show,
        shows::list_shows,
        shows::get_show,
        shows::update_show,
        shows::delete_show,
        shows::list_show_segments,
        shows::add_presenter,
        shows::remove_presenter,
        segments::create_segment,
        segments::update_segment,
        segments::reposition_segment,
        segments::delete_segment,
        segments::attach_guest,
        segments::detach_guest,
        presenters::list_presenters,
        presenters::get_presenter,
        presenters::create_presenter,
        presenters::update_presenter,
        presenters::delete_presenter,
        guests::list_guests,
        guests::get_guest,
        guests::create_guest,
        guests::update_guest,
        guests::delete_guest,
        audit::list_audit_logs,
        audit::list_archived,
        audit::archive_audit_log,
        setup::check_admin,
        setup::create_admin
    ),
    components(
        schemas(
            User,
            Role,
            RoleTemplate,
            Presenter,
            Guest,
            Emission,
            Show,
            Segment,
            AuditLog,
            ArchivedAuditLog,
            InviteToken,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            InviteRequest,
            InviteRegisterRequest,
            UserPermissionsResponse,
            UpdatePermissionsRequest,
            CreateTemplateRequest,
            TemplateList,
            CreateSegmentRequest,
            UpdateSegmentRequest,
            RepositionSegmentRequest,
            SegmentList,
            CreateShowRequest,
            UpdateShowRequest,
            ShowList,
            ShowWithSegments,
            RoleList,
            AuditLogList,
            ArchivedAuditLogList,
            roles::CreateRoleRequest,
            roles::RoleIdsRequest,
            emissions::CreateEmissionRequest,
            emissions::UpdateEmissionRequest,
            emissions::EmissionList,
            presenters::CreatePresenterRequest,
            presenters::UpdatePresenterRequest,
            presenters::PresenterList,
            guests::CreateGuestRequest,
            guests::UpdateGuestRequest,
            guests::GuestList,
            setup::CreateAdminRequest,
            setup::AdminStatus,
            health::HealthData,
            params::Pagination,
            params::ShowListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<UserPermissionsResponse>,
            ApiResponse<RoleList>,
            ApiResponse<ShowWithSegments>,
            ApiResponse<SegmentList>,
            ApiResponse<AuditLogList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication and invites"),
        (name = "Permissions", description = "Per-user capability flags and templates"),
        (name = "Roles", description = "Role CRUD and user-role links"),
        (name = "Emissions", description = "Show series"),
        (name = "Shows", description = "Individual broadcasts"),
        (name = "Segments", description = "Ordered segments within a show"),
        (name = "Presenters", description = "Presenter profiles"),
        (name = "Guests", description = "Guest directory"),
        (name = "Audit", description = "Audit trail and archive"),
        (name = "Setup", description = "Admin bootstrap"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
