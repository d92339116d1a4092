pub mod archived_audit_logs;
pub mod audit_logs;
pub mod emissions;
pub mod guests;
pub mod invite_tokens;
pub mod presenters;
pub mod role_templates;
pub mod roles;
pub mod segment_guests;
pub mod segments;
pub mod show_presenters;
pub mod shows;
pub mod user_permissions;
pub mod user_roles;
pub mod users;

pub use archived_audit_logs::Entity as ArchivedAuditLogs;
pub use audit_logs::Entity as AuditLogs;
pub use emissions::Entity as Emissions;
pub use guests::Entity as Guests;
pub use invite_tokens::Entity as InviteTokens;
pub use presenters::Entity as Presenters;
pub use role_templates::Entity as RoleTemplates;
pub use roles::Entity as Roles;
pub use segment_guests::Entity as SegmentGuests;
pub use segments::Entity as Segments;
pub use show_presenters::Entity as ShowPresenters;
pub use shows::Entity as Shows;
pub use user_permissions::Entity as UserPermissions;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
