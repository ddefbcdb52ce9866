use crate::analytics::{AnalysisType, service::AnalysisResult};
use crate::api::{
    advance::CreateAdvance,
    attendance::CreateAttendance,
    invoice::{CreateInvoice, InvoiceListResponse, MessagePreview},
    payroll::{CreateSalary, PaginatedSalaryResponse, PreviewRequest, ReportResponse},
};
use crate::auth::handlers::LoginResponse;
use crate::billing::{
    grouping::{GroupedItem, RawItem},
    summary::{InvoiceStatus, InvoiceSummary, InvoiceTotals},
};
use crate::model::{
    advance::{Advance, AdvanceStatus},
    attendance::{AttendanceRecord, AttendanceStatus},
    deduction_rules::{DeductionMode, DeductionRules},
    invoice::{Invoice, InvoiceItem, InvoiceKind},
    role::Role,
    salary::SalaryRecord,
    user::User,
};
use crate::models::{CreateUserReq, LoginReqDto};
use crate::payroll::settlement::{Adjustments, AttendanceSummary, SalaryReport};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
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
    info(
        title = "Studio Back Office API",
        version = "0.1.0",
        description = r#"
## Studio back office

Payroll, attendance, advances, invoicing and analytics for a photography studio.

- **Payroll**: month settlement from attendance, deduction rules and pending advances
- **Attendance**: one immutable record per employee per day
- **Invoices**: regular and wedding invoices, grouped lines, balances, WhatsApp delivery
- **Analytics**: periodically refreshed AI analyses of the month's figures

All `/api` endpoints expect a JWT bearer token from `/auth/login`.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::user::create_user,
        crate::api::user::list_users,

        crate::api::attendance::create_attendance,
        crate::api::attendance::month_attendance,

        crate::api::advance::create_advance,
        crate::api::advance::list_advances,
        crate::api::advance::cancel_advance,

        crate::api::payroll::salary_report,
        crate::api::payroll::preview_settlement,
        crate::api::payroll::create_salary,
        crate::api::payroll::get_salary,
        crate::api::payroll::list_salaries,

        crate::api::settings::get_deduction_rules,
        crate::api::settings::update_deduction_rules,

        crate::api::invoice::create_invoice,
        crate::api::invoice::list_invoices,
        crate::api::invoice::get_invoice,
        crate::api::invoice::update_invoice,
        crate::api::invoice::send_invoice_message,

        crate::api::analytics::latest_analysis,
        crate::api::analytics::refresh_analysis
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            CreateUserReq,
            User,
            Role,
            AttendanceRecord,
            AttendanceStatus,
            CreateAttendance,
            Advance,
            AdvanceStatus,
            CreateAdvance,
            DeductionRules,
            DeductionMode,
            SalaryRecord,
            SalaryReport,
            AttendanceSummary,
            Adjustments,
            ReportResponse,
            PreviewRequest,
            CreateSalary,
            PaginatedSalaryResponse,
            Invoice,
            InvoiceItem,
            InvoiceKind,
            RawItem,
            GroupedItem,
            InvoiceTotals,
            InvoiceStatus,
            InvoiceSummary,
            CreateInvoice,
            InvoiceListResponse,
            MessagePreview,
            AnalysisType,
            AnalysisResult
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Users", description = "Staff administration"),
        (name = "Attendance", description = "Daily attendance records"),
        (name = "Advances", description = "Salary advances"),
        (name = "Payroll", description = "Salary settlement"),
        (name = "Settings", description = "Deduction rules"),
        (name = "Invoices", description = "Regular and wedding invoices"),
        (name = "Analytics", description = "AI-assisted analyses"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_payroll_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/payroll/report"));
        assert!(doc.paths.paths.contains_key("/api/invoices/{invoice_id}/whatsapp"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
